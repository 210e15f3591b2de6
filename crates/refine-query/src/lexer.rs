//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of tokens for the parser.

use std::{iter::Peekable, str::Chars};

use crate::{ast::is_operator_word, error::LexError};

/// A token in the query language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A bare word (search term).
    Term(String),

    /// A quoted phrase (the quotes are stripped, content preserved).
    Phrase(String),

    /// An operator keyword (`AND`, `OR`, `NOT`, `ADJ`, `ADJn`), as written.
    Operator(String),

    /// Left parenthesis.
    LParen,

    /// Right parenthesis.
    RParen,

    /// Field list (e.g., "[title,text]" produces Fields(["title", "text"])).
    Fields(Vec<String>),

    /// Option list (e.g., "{exploded=true}" produces Options([("exploded", true)])).
    Options(Vec<(String, bool)>),
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Creates an error at a specific position.
    fn error_at(&self, message: impl Into<String>, position: usize) -> LexError {
        LexError::new(message, position, self.input)
    }

    /// Tokenizes the entire input, returning each token with its starting byte offset.
    fn tokenize(mut self) -> Result<Vec<(Token, usize)>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            let start = self.position;
            match self.next_token()? {
                Some(token) => tokens.push((token, start)),
                None => break,
            }
        }

        Ok(tokens)
    }

    /// Returns the next token, or None if at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let Some(&ch) = self.chars.peek() else {
            return Ok(None);
        };

        match ch {
            '"' => self.read_phrase(),
            '(' => {
                self.advance();
                Ok(Some(Token::LParen))
            }
            ')' => {
                self.advance();
                Ok(Some(Token::RParen))
            }
            '[' => self.read_fields(),
            '{' => self.read_options(),
            ']' | '}' => Err(self.error_at(format!("unexpected '{ch}'"), self.position)),
            _ => Ok(self.read_term_or_operator()),
        }
    }

    /// Reads a quoted phrase. A backslash takes the next character literally.
    fn read_phrase(&mut self) -> Result<Option<Token>, LexError> {
        let start_pos = self.position;
        self.advance(); // consume opening quote

        let mut content = String::new();

        loop {
            match self.chars.peek() {
                Some(&'"') => {
                    self.advance();
                    return Ok(Some(Token::Phrase(content)));
                }
                Some(&'\\') => {
                    self.advance();
                    let Some(&ch) = self.chars.peek() else {
                        return Err(self.error_at("unclosed quote", start_pos));
                    };
                    content.push(ch);
                    self.advance();
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => return Err(self.error_at("unclosed quote", start_pos)),
            }
        }
    }

    /// Reads the raw text between a bracket and its closing delimiter.
    fn read_delimited(&mut self, close: char, what: &str) -> Result<String, LexError> {
        let start_pos = self.position;
        self.advance(); // consume opening bracket

        let mut content = String::new();
        loop {
            match self.chars.peek() {
                Some(&ch) if ch == close => {
                    self.advance();
                    return Ok(content);
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => return Err(self.error_at(format!("unclosed {what}"), start_pos)),
            }
        }
    }

    /// Reads a field list such as `[title,text]`.
    fn read_fields(&mut self) -> Result<Option<Token>, LexError> {
        let start_pos = self.position;
        let content = self.read_delimited(']', "field list")?;

        let mut fields = Vec::new();
        for field in content.split(',') {
            let field = field.trim();
            if field.is_empty() {
                return Err(self.error_at("empty field name", start_pos));
            }
            fields.push(field.to_string());
        }

        Ok(Some(Token::Fields(fields)))
    }

    /// Reads an option list such as `{exploded=true}`.
    fn read_options(&mut self) -> Result<Option<Token>, LexError> {
        let start_pos = self.position;
        let content = self.read_delimited('}', "option list")?;

        let mut options = Vec::new();
        for entry in content.split(',') {
            let Some((key, value)) = entry.split_once('=') else {
                return Err(self.error_at(
                    format!("expected key=value in option list, found '{}'", entry.trim()),
                    start_pos,
                ));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(self.error_at("empty option name", start_pos));
            }
            let value = match value.trim().to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                other => {
                    return Err(self.error_at(
                        format!("invalid option value for '{key}': {other}"),
                        start_pos,
                    ));
                }
            };
            options.push((key.to_string(), value));
        }

        Ok(Some(Token::Options(options)))
    }

    /// Reads a term or an operator keyword.
    fn read_term_or_operator(&mut self) -> Option<Token> {
        let mut word = String::new();

        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || "()[]{}\"".contains(ch) {
                break;
            }
            word.push(ch);
            self.advance();
        }

        if word.is_empty() {
            return None;
        }

        if is_operator_word(&word) {
            return Some(Token::Operator(word));
        }

        Some(Token::Term(word))
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Tokenizes a query string, keeping the byte offset of each token.
pub(crate) fn tokenize_with_positions(input: &str) -> Result<Vec<(Token, usize)>, LexError> {
    Lexer::new(input).tokenize()
}

/// Convenience function to tokenize a query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Ok(tokenize_with_positions(input)?
        .into_iter()
        .map(|(token, _)| token)
        .collect())
}
