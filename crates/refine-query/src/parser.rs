//! Query parser.
//!
//! Parses a token stream into a query tree using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! query    → group
//! group    → operand (OPERATOR operand)*
//! operand  → keyword | "(" group ")"
//! keyword  → (TERM | PHRASE) FIELDS? OPTIONS?
//! ```
//!
//! Operators have no relative precedence: every operator inside one group must be the same,
//! and mixing them requires parentheses. A group with a single operand is that operand.

use std::collections::BTreeMap;

use crate::{
    ast::{BooleanQuery, Keyword, Operator, QueryNode},
    error::{ParseError, QueryError},
    lexer::{Token, tokenize_with_positions},
};

/// Recursive descent parser for query trees.
struct Parser {
    /// Token stream to parse, with byte offsets.
    tokens: Vec<(Token, usize)>,
    /// Current position in token stream.
    position: usize,
    /// Byte length of the input, reported for errors at end of input.
    input_len: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<(Token, usize)>, input_len: usize) -> Self {
        Self {
            tokens,
            position: 0,
            input_len,
        }
    }

    /// Parses the token stream into a query tree.
    fn parse(mut self) -> Result<Option<QueryNode>, ParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let node = self.parse_group()?;

        if let Some(token) = self.peek() {
            return Err(ParseError::new(
                format!("unexpected token: {token:?}"),
                Some(self.offset()),
            ));
        }

        Ok(Some(node))
    }

    /// Parses: group → operand (OPERATOR operand)*
    fn parse_group(&mut self) -> Result<QueryNode, ParseError> {
        let first = self.parse_operand()?;

        let mut operator: Option<Operator> = None;
        let mut children = vec![first];

        while let Some(Token::Operator(word)) = self.peek().cloned() {
            let at = self.offset();
            let parsed: Operator = word
                .parse()
                .map_err(|e| ParseError::new(format!("{e}"), Some(at)))?;

            match operator {
                None => operator = Some(parsed),
                Some(existing) if existing == parsed => {}
                Some(existing) => {
                    return Err(ParseError::new(
                        format!("mixed operators {existing} and {parsed} in one group"),
                        Some(at),
                    ));
                }
            }

            self.advance(); // consume operator
            children.push(self.parse_operand()?);
        }

        match operator {
            None => Ok(children.remove(0)),
            Some(op) => Ok(BooleanQuery::new(op, children).into()),
        }
    }

    /// Parses: operand → keyword | "(" group ")"
    fn parse_operand(&mut self) -> Result<QueryNode, ParseError> {
        let at = self.offset();
        match self.peek().cloned() {
            Some(Token::Term(text)) | Some(Token::Phrase(text)) => {
                self.advance();
                Ok(self.parse_keyword_suffix(text).into())
            }
            Some(Token::LParen) => {
                self.advance(); // consume (
                let inner = self.parse_group()?;
                if !matches!(self.peek(), Some(Token::RParen)) {
                    return Err(ParseError::new(
                        "expected closing parenthesis",
                        Some(self.offset()),
                    ));
                }
                self.advance(); // consume )
                Ok(inner)
            }
            Some(Token::RParen) => Err(ParseError::new("unexpected closing parenthesis", Some(at))),
            Some(Token::Operator(word)) => Err(ParseError::new(
                format!("unexpected operator {word} (needs expression before it)"),
                Some(at),
            )),
            Some(Token::Fields(_)) | Some(Token::Options(_)) => Err(ParseError::new(
                "field or option list must follow a term",
                Some(at),
            )),
            None => Err(ParseError::new("unexpected end of query", Some(at))),
        }
    }

    /// Applies optional field and option lists following a term.
    fn parse_keyword_suffix(&mut self, text: String) -> Keyword {
        let mut fields = Vec::new();
        if let Some(Token::Fields(list)) = self.peek().cloned() {
            self.advance();
            fields = list;
        }

        let mut options = BTreeMap::new();
        if let Some(Token::Options(list)) = self.peek().cloned() {
            self.advance();
            options.extend(list);
        }

        options
            .into_iter()
            .fold(Keyword::new(text, fields), |k, (key, value)| {
                k.with_option(key, value)
            })
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(token, _)| token)
    }

    /// Returns the byte offset of the current token, or the input length at the end.
    fn offset(&self) -> usize {
        self.tokens
            .get(self.position)
            .map_or(self.input_len, |(_, pos)| *pos)
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Parses a query string into a tree.
///
/// Returns `Ok(None)` for empty queries, `Ok(Some(node))` for valid queries,
/// or `Err(QueryError)` for invalid syntax.
pub fn parse(input: &str) -> Result<Option<QueryNode>, QueryError> {
    let tokens = tokenize_with_positions(input).map_err(QueryError::from)?;
    Parser::new(tokens, input.len())
        .parse()
        .map_err(|e| QueryError::from(e).with_query(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{EXPLODED_OPTION, MESH_HEADINGS_FIELD};

    fn kw(s: &str, fields: &[&str]) -> QueryNode {
        QueryNode::keyword(s, fields.iter().copied())
    }

    fn node(op: Operator, children: Vec<QueryNode>) -> QueryNode {
        QueryNode::boolean(op, children)
    }

    #[test]
    fn empty_query() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("   ").unwrap(), None);
    }

    #[test]
    fn single_keyword() {
        assert_eq!(parse("cancer").unwrap(), Some(kw("cancer", &[])));
    }

    #[test]
    fn keyword_with_fields() {
        assert_eq!(
            parse("cancer[title,text]").unwrap(),
            Some(kw("cancer", &["title", "text"]))
        );
    }

    #[test]
    fn keyword_with_options() {
        let expected: QueryNode = Keyword::new("Neoplasms", [MESH_HEADINGS_FIELD])
            .with_option(EXPLODED_OPTION, true)
            .into();
        assert_eq!(
            parse("Neoplasms[mesh_headings]{exploded=true}").unwrap(),
            Some(expected)
        );
    }

    #[test]
    fn flat_group() {
        assert_eq!(
            parse("a AND b AND c").unwrap(),
            Some(node(Operator::And, vec![kw("a", &[]), kw("b", &[]), kw("c", &[])]))
        );
    }

    #[test]
    fn nested_groups() {
        assert_eq!(
            parse("(cancer[title] AND (breast ADJ1 tumor))").unwrap(),
            Some(node(
                Operator::And,
                vec![
                    kw("cancer", &["title"]),
                    node(Operator::Adj(1), vec![kw("breast", &[]), kw("tumor", &[])]),
                ]
            ))
        );
    }

    #[test]
    fn bare_adj_defaults_to_distance_one() {
        assert_eq!(
            parse("breast adj tumor").unwrap(),
            Some(node(Operator::Adj(1), vec![kw("breast", &[]), kw("tumor", &[])]))
        );
    }

    #[test]
    fn redundant_parentheses_collapse() {
        assert_eq!(parse("((cancer))").unwrap(), Some(kw("cancer", &[])));
    }

    #[test]
    fn mixed_operators_error() {
        let err = parse("a AND b OR c").unwrap_err();
        assert!(err.message().contains("mixed operators"));
        assert_eq!(err.position(), Some(8));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn zero_adjacency_distance_error() {
        let err = parse("a ADJ0 b").unwrap_err();
        assert!(err.message().contains("adjacency distance"));
    }

    #[test]
    fn missing_close_paren() {
        let err = parse("(a OR b").unwrap_err();
        assert!(err.message().contains("closing parenthesis"));
        assert_eq!(err.position(), Some(7));
    }

    #[test]
    fn unexpected_close_paren() {
        let err = parse("a)").unwrap_err();
        assert!(err.message().contains("unexpected token"));
    }

    #[test]
    fn leading_operator() {
        let err = parse("OR cancer").unwrap_err();
        assert!(err.message().contains("unexpected operator"));
    }

    #[test]
    fn trailing_operator() {
        let err = parse("cancer AND").unwrap_err();
        assert!(err.message().contains("unexpected end"));
    }

    #[test]
    fn adjacent_terms_need_operator() {
        let err = parse("breast cancer").unwrap_err();
        assert!(err.message().contains("unexpected token"));
    }

    #[test]
    fn round_trips_canonical_form() {
        let inputs = [
            "(cancer[title] AND (breast ADJ1 tumor))",
            "(\"Breast Neoplasms\"[mesh_headings]{exploded=false} OR (tumor[title,text] NOT benign))",
            "((a ADJ3 b) OR (c AND d) OR e)",
            "\"and\"[title]",
        ];
        for input in inputs {
            let parsed = parse(input).unwrap().unwrap();
            assert_eq!(parsed.to_query_string(), input);
            assert_eq!(parse(&parsed.to_query_string()).unwrap(), Some(parsed));
        }
    }
}
