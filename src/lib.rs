//! LR(1) parser generator: builds a shift/reduce table from a context-free
//! grammar and parses token streams into concrete syntax trees.

pub mod grammar;
pub mod parser;
pub mod tree;
mod bnf;
mod error;

pub use error::{Error, Result};
pub use grammar::{Grammar, Production, Symbol};
pub use parser::{Action, Conflict, ParseTable, Scanner, TokenSource, Tokens};
pub use tree::{Node, NodeId, SyntaxTree};

pub fn build(mut grammar: Grammar) -> Result<ParseTable> {
  grammar.build_table()
}
