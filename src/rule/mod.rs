//! Rule parsing, combination and evaluation module
//!
//! This module handles rule strings like `(age > 30) AND (department = 'Sales')`:
//! building them into trees, AND-folding several of them together, and
//! evaluating a tree against a record of field values.

mod ast;
pub mod cache;
mod combiner;
mod evaluator;
pub mod parser;
pub mod wire;


pub use ast::*;
pub use cache::*;
pub use combiner::*;
pub use evaluator::*;
pub use parser::*;
pub use wire::{NodeKind, WireNode};
