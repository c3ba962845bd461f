//! Static semantic analysis for Mini-PL programs.
//!
//! The parser hands over a [`SyntaxTree`](ast::SyntaxTree); [`semantic::check`]
//! walks it once and returns every rule violation it finds, together with the
//! resolved type of each expression.

pub mod ast;
pub mod semantic;

pub use ast::{NodeId, SyntaxTree, TreeBuilder, TreeError};
pub use semantic::{check, check_with_options, Analysis};
