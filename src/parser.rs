use crate::bnf::Bnf;

mod bitset;
mod engine;
mod sets;
mod state;
mod table;
mod token;

pub use table::{Action, Conflict, ParseTable};
pub use token::{Scanner, TokenSource, Tokens};
pub(crate) use sets::Sets;

pub(crate) fn gen_table(
  bnf: &Bnf,
  sets: &Sets,
) -> ParseTable {
  let states = state::gen_states(bnf, sets);
  ParseTable::new(bnf, &states)
}
