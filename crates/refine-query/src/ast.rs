//! Query abstract syntax tree.
//!
//! Boolean search strategies are trees of keyword leaves and operator nodes. Nodes are
//! immutable and reference counted: a rewrite builds a new node that shares every untouched
//! subtree with the original, so no rewrite can ever observe another tree's changes.

use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

use serde::{Serialize, Serializer};

use crate::error::OperatorError;

/// Field tag for the title of a document.
pub const TITLE_FIELD: &str = "title";

/// Field tag for the abstract (body text) of a document.
pub const ABSTRACT_FIELD: &str = "text";

/// Field tag for MeSH headings.
pub const MESH_HEADINGS_FIELD: &str = "mesh_headings";

/// Keyword option controlling MeSH explosion.
pub const EXPLODED_OPTION: &str = "exploded";

/// A Boolean or proximity operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// All children must match.
    And,
    /// At least one child must match.
    Or,
    /// The first child must match and the rest must not.
    Not,
    /// Children must appear within the given number of words of each other.
    Adj(u32),
}

impl Operator {
    /// Returns the lowercase symbol used in signatures (`and`, `or`, `not`, `adjN`).
    pub fn symbol(&self) -> String {
        match self {
            Self::And => "and".to_string(),
            Self::Or => "or".to_string(),
            Self::Not => "not".to_string(),
            Self::Adj(distance) => format!("adj{distance}"),
        }
    }

    /// Returns the logical inversion (`and` ↔ `or`), or `None` for other operators.
    pub fn inverted(&self) -> Option<Self> {
        match self {
            Self::And => Some(Self::Or),
            Self::Or => Some(Self::And),
            Self::Not | Self::Adj(_) => None,
        }
    }

    /// Returns the word distance of an adjacency operator.
    pub fn distance(&self) -> Option<u32> {
        match self {
            Self::Adj(distance) => Some(*distance),
            _ => None,
        }
    }
}

impl FromStr for Operator {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "and" => return Ok(Self::And),
            "or" => return Ok(Self::Or),
            "not" => return Ok(Self::Not),
            "adj" => return Ok(Self::Adj(1)),
            _ => {}
        }

        let Some(suffix) = lower.strip_prefix("adj") else {
            return Err(OperatorError::Unknown {
                operator: s.to_string(),
            });
        };

        match suffix.parse::<u32>() {
            Ok(distance) if distance >= 1 => Ok(Self::Adj(distance)),
            _ => Err(OperatorError::InvalidDistance {
                operator: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol().to_ascii_uppercase())
    }
}

impl Serialize for Operator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.symbol())
    }
}

/// A keyword leaf: a query string restricted to fields, with options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Keyword {
    /// The text searched for.
    query_string: String,
    /// Field tags, in the order they were written.
    fields: Vec<String>,
    /// Boolean options such as MeSH explosion.
    options: BTreeMap<String, bool>,
}

impl Keyword {
    /// Creates a keyword with the given fields and no options.
    pub fn new<I, S>(query_string: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            query_string: query_string.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            options: BTreeMap::new(),
        }
    }

    /// Returns the query string.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Returns the field tags.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Returns true if the keyword is tagged with `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Returns the option map.
    pub fn options(&self) -> &BTreeMap<String, bool> {
        &self.options
    }

    /// Returns a single option value.
    pub fn option(&self, key: &str) -> Option<bool> {
        self.options.get(key).copied()
    }

    /// Returns a copy of this keyword with different fields.
    #[must_use]
    pub fn with_fields(&self, fields: Vec<String>) -> Self {
        Self {
            fields,
            ..self.clone()
        }
    }

    /// Returns a copy of this keyword with an option set.
    #[must_use]
    pub fn with_option(&self, key: impl Into<String>, value: bool) -> Self {
        let mut options = self.options.clone();
        options.insert(key.into(), value);
        Self {
            options,
            ..self.clone()
        }
    }
}

/// An operator node with ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BooleanQuery {
    /// The operator joining the children.
    operator: Operator,
    /// Child nodes in order.
    children: Vec<QueryNode>,
}

impl BooleanQuery {
    /// Creates an operator node.
    pub fn new(operator: Operator, children: Vec<QueryNode>) -> Self {
        Self { operator, children }
    }

    /// Returns the operator.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Returns the children.
    pub fn children(&self) -> &[QueryNode] {
        &self.children
    }

    /// Returns a copy of this node with a different operator. Children are shared.
    #[must_use]
    pub fn with_operator(&self, operator: Operator) -> Self {
        Self {
            operator,
            children: self.children.clone(),
        }
    }

    /// Returns a copy of this node with child `index` replaced. Other children are shared.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn with_child(&self, index: usize, child: QueryNode) -> Self {
        let mut children = self.children.clone();
        children[index] = child;
        Self {
            operator: self.operator,
            children,
        }
    }
}

/// A node of a Boolean query tree.
///
/// Cloning is cheap: it bumps a reference count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNode {
    /// A keyword leaf.
    Keyword(Arc<Keyword>),
    /// An operator node.
    Boolean(Arc<BooleanQuery>),
}

impl From<Keyword> for QueryNode {
    fn from(keyword: Keyword) -> Self {
        Self::Keyword(Arc::new(keyword))
    }
}

impl From<BooleanQuery> for QueryNode {
    fn from(query: BooleanQuery) -> Self {
        Self::Boolean(Arc::new(query))
    }
}

impl Serialize for QueryNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Keyword(k) => Keyword::serialize(k, serializer),
            Self::Boolean(b) => BooleanQuery::serialize(b, serializer),
        }
    }
}

impl QueryNode {
    /// Creates a keyword leaf.
    pub fn keyword<I, S>(query_string: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Keyword::new(query_string, fields).into()
    }

    /// Creates an operator node.
    pub fn boolean(operator: Operator, children: Vec<Self>) -> Self {
        BooleanQuery::new(operator, children).into()
    }

    /// Returns the keyword if this is a leaf.
    pub fn as_keyword(&self) -> Option<&Keyword> {
        match self {
            Self::Keyword(k) => Some(k),
            Self::Boolean(_) => None,
        }
    }

    /// Returns the operator node if this is not a leaf.
    pub fn as_boolean(&self) -> Option<&BooleanQuery> {
        match self {
            Self::Boolean(b) => Some(b),
            Self::Keyword(_) => None,
        }
    }

    /// Returns every operator node, depth-first pre-order, starting with `self`.
    pub fn boolean_queries(&self) -> Vec<&BooleanQuery> {
        let mut out = Vec::new();
        self.collect_boolean_queries(&mut out);
        out
    }

    /// Accumulates operator nodes for [`Self::boolean_queries`].
    fn collect_boolean_queries<'a>(&'a self, out: &mut Vec<&'a BooleanQuery>) {
        if let Self::Boolean(b) = self {
            out.push(b);
            for child in b.children() {
                child.collect_boolean_queries(out);
            }
        }
    }

    /// Returns every keyword leaf in document order.
    pub fn keywords(&self) -> Vec<&Keyword> {
        let mut out = Vec::new();
        self.collect_keywords(&mut out);
        out
    }

    /// Accumulates keyword leaves for [`Self::keywords`].
    fn collect_keywords<'a>(&'a self, out: &mut Vec<&'a Keyword>) {
        match self {
            Self::Keyword(k) => out.push(k),
            Self::Boolean(b) => {
                for child in b.children() {
                    child.collect_keywords(out);
                }
            }
        }
    }

    /// Returns the depth of the tree. A single keyword has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Keyword(_) => 1,
            Self::Boolean(b) => 1 + b.children().iter().map(Self::depth).max().unwrap_or(0),
        }
    }

    /// Formats the tree structure with the given indentation level.
    fn fmt_tree(&self, out: &mut String, indent: usize) {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Keyword(k) => {
                out.push_str(&format!("{prefix}Keyword({:?})", k.query_string));
                if !k.fields.is_empty() {
                    out.push_str(&format!(" fields={:?}", k.fields));
                }
                for (key, value) in &k.options {
                    out.push_str(&format!(" {key}={value}"));
                }
                out.push('\n');
            }
            Self::Boolean(b) => {
                out.push_str(&format!("{prefix}{}\n", b.operator));
                for child in &b.children {
                    child.fmt_tree(out, indent + 1);
                }
            }
        }
    }

    /// Renders the tree as an indented outline, one node per line.
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        self.fmt_tree(&mut out, 0);
        out
    }

    /// Formats the node in the canonical query syntax.
    ///
    /// This produces output like: `(cancer[title] AND (breast ADJ1 tumor))`
    pub fn to_query_string(&self) -> String {
        match self {
            Self::Keyword(k) => {
                let mut s = quote_term(&k.query_string);
                if !k.fields.is_empty() {
                    s.push_str(&format!("[{}]", k.fields.join(",")));
                }
                if !k.options.is_empty() {
                    let opts: Vec<String> =
                        k.options.iter().map(|(key, v)| format!("{key}={v}")).collect();
                    s.push_str(&format!("{{{}}}", opts.join(",")));
                }
                s
            }
            Self::Boolean(b) => {
                let parts: Vec<String> = b.children.iter().map(Self::to_query_string).collect();
                format!("({})", parts.join(&format!(" {} ", b.operator)))
            }
        }
    }
}

/// Returns true if a bare word is read as an operator (`and`, `or`, `not`, `adj`, `adjN`).
pub fn is_operator_word(word: &str) -> bool {
    let lower = word.to_ascii_lowercase();
    match lower.strip_prefix("adj") {
        Some(digits) => digits.chars().all(|c| c.is_ascii_digit()),
        None => matches!(lower.as_str(), "and" | "or" | "not"),
    }
}

/// Quotes a term if it would not survive re-lexing as a bare word.
fn quote_term(term: &str) -> String {
    let needs_quotes = term.is_empty()
        || term
            .chars()
            .any(|c| c.is_whitespace() || "()[]{}\",=".contains(c))
        || is_operator_word(term);
    if needs_quotes {
        let escaped = term.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        term.to_string()
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(s: &str, fields: &[&str]) -> QueryNode {
        QueryNode::keyword(s, fields.iter().copied())
    }

    #[test]
    fn operator_parses_adjacency_distance() {
        assert_eq!("adj".parse::<Operator>().unwrap(), Operator::Adj(1));
        assert_eq!("ADJ3".parse::<Operator>().unwrap(), Operator::Adj(3));
        assert_eq!("and".parse::<Operator>().unwrap(), Operator::And);
    }

    #[test]
    fn operator_rejects_non_numeric_suffix() {
        let err = "adjx".parse::<Operator>().unwrap_err();
        assert!(matches!(err, OperatorError::InvalidDistance { .. }));
        let err = "adj0".parse::<Operator>().unwrap_err();
        assert!(matches!(err, OperatorError::InvalidDistance { .. }));
        let err = "near".parse::<Operator>().unwrap_err();
        assert!(matches!(err, OperatorError::Unknown { .. }));
    }

    #[test]
    fn with_child_shares_untouched_subtrees() {
        let left = kw("cancer", &["title"]);
        let right = QueryNode::boolean(
            Operator::Adj(1),
            vec![kw("breast", &[]), kw("tumor", &[])],
        );
        let root = BooleanQuery::new(Operator::And, vec![left, right]);

        let changed = root.with_child(0, kw("neoplasm", &["title"]));

        let (QueryNode::Boolean(a), QueryNode::Boolean(b)) =
            (&root.children()[1], &changed.children()[1])
        else {
            panic!("expected operator nodes");
        };
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(root.children()[0], kw("cancer", &["title"]));
    }

    #[test]
    fn with_option_leaves_original_untouched() {
        let original =
            Keyword::new("Neoplasms", [MESH_HEADINGS_FIELD]).with_option(EXPLODED_OPTION, true);
        let flipped = original.with_option(EXPLODED_OPTION, false);
        assert_eq!(original.option(EXPLODED_OPTION), Some(true));
        assert_eq!(flipped.option(EXPLODED_OPTION), Some(false));
    }

    #[test]
    fn quotes_and_backslashes_in_terms_are_escaped() {
        let node = kw(r#"say "hi" \ now"#, &["title"]);
        assert_eq!(node.to_query_string(), r#""say \"hi\" \\ now"[title]"#);
        assert_eq!(crate::parse(&node.to_query_string()).unwrap(), Some(node));
    }

    #[test]
    fn boolean_queries_are_preorder() {
        let q = QueryNode::boolean(
            Operator::And,
            vec![
                QueryNode::boolean(Operator::Or, vec![kw("a", &[]), kw("b", &[])]),
                QueryNode::boolean(Operator::Adj(2), vec![kw("c", &[]), kw("d", &[])]),
            ],
        );
        let ops: Vec<String> = q.boolean_queries().iter().map(|b| b.operator().symbol()).collect();
        assert_eq!(ops, vec!["and", "or", "adj2"]);
        let words: Vec<&str> = q.keywords().iter().map(|k| k.query_string()).collect();
        assert_eq!(words, vec!["a", "b", "c", "d"]);
        assert_eq!(q.depth(), 3);
    }

    #[test]
    fn query_string_format() {
        let q = QueryNode::boolean(
            Operator::And,
            vec![
                kw("cancer", &["title"]),
                QueryNode::boolean(Operator::Adj(1), vec![kw("breast", &[]), kw("tumor", &[])]),
            ],
        );
        assert_eq!(q.to_query_string(), "(cancer[title] AND (breast ADJ1 tumor))");
    }

    #[test]
    fn query_string_quotes_phrases_and_options() {
        let k: QueryNode = Keyword::new("Breast Neoplasms", [MESH_HEADINGS_FIELD])
            .with_option(EXPLODED_OPTION, true)
            .into();
        assert_eq!(k.to_query_string(), "\"Breast Neoplasms\"[mesh_headings]{exploded=true}");
    }

    #[test]
    fn query_string_quotes_operator_like_terms() {
        assert_eq!(kw("or", &[]).to_query_string(), "\"or\"");
        assert_eq!(kw("adjuvant", &[]).to_query_string(), "adjuvant");
    }

    #[test]
    fn serializes_to_json() {
        let q = QueryNode::boolean(Operator::And, vec![kw("cancer", &["title"]), kw("tumor", &[])]);
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["operator"], "and");
        assert_eq!(json["children"][0]["query_string"], "cancer");
        assert_eq!(json["children"][0]["fields"][0], "title");
    }
}
