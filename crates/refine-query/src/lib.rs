//! Boolean query trees for search strategy refinement.
//!
//! This crate provides the immutable query tree consumed and produced by every rewrite,
//! together with a compact text notation for writing trees by hand:
//!
//! - **Keywords**: `cancer` or `"breast cancer"` - text to search for
//! - **Fields**: `cancer[title,text]` - restrict a keyword to fields
//! - **Options**: `Neoplasms[mesh_headings]{exploded=true}` - keyword flags
//! - **Operators**: `AND`, `OR`, `NOT`, `ADJ3` - join operands
//! - **Grouping**: `(a AND b) OR c` - required when operators differ
//!
//! # Example
//!
//! ```
//! use refine_query::parse;
//!
//! let query = parse("cancer[title] AND (breast ADJ1 tumor)").unwrap().unwrap();
//! assert_eq!(query.to_query_string(), "(cancer[title] AND (breast ADJ1 tumor))");
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{
    ABSTRACT_FIELD, BooleanQuery, EXPLODED_OPTION, Keyword, MESH_HEADINGS_FIELD, Operator,
    QueryNode, TITLE_FIELD, is_operator_word,
};
pub use error::{LexError, OperatorError, ParseError, QueryError, QueryErrorKind};
pub use lexer::{Token, tokenize};
pub use parser::parse;
