use thiserror::Error;
use crate::grammar::Symbol;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  /// A production refers to a nonterminal that has no rules.
  #[error("rule `{rule}` references undefined nonterminal `{symbol}`")]
  InvalidGrammar {
    rule: String,
    symbol: String,
  },

  #[error("start symbol `{0}` has no rules")]
  UndefinedStart(String),

  /// No action for `token` in `state`.
  #[error("parse error in state {state} at {token}")]
  Parse {
    state: usize,
    token: Symbol,
  },
}
