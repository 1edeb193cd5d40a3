//! DDL front end: normalization, tokenizing and entity extraction.

mod columns;
mod lexer;
mod normalize;
mod relationships;
mod tables;
mod types;

pub use normalize::normalize;
pub use relationships::{AssumeOneToMany, CardinalityRule, extract_relationships};
pub use tables::extract_tables;
