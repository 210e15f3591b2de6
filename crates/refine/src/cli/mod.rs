//! CLI support for the `refine` binary.

pub mod args;
pub mod commands;
pub mod context;
pub mod output;
