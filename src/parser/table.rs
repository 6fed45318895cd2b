use std::fmt::{self, Display, Formatter};
use indexmap::IndexMap;
use log::warn;
use crate::bnf::{self, Bnf, TermId};
use crate::grammar::{Grammar, Symbol};
use super::state::State;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  Shift(usize),
  Goto(usize),
  Reduce {
    arity: usize,
    name: String,
  },
  /// Reduces everything on the stack to the start symbol.
  Accept,
}

impl Display for Action {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Action::Shift(state) => write!(f, "shift {}", state),
      Action::Goto(state) => write!(f, "goto {}", state),
      Action::Reduce { arity, name } => write!(f, "reduce {} {}", arity, name),
      Action::Accept => write!(f, "accept"),
    }
  }
}

/// Two actions competed for the same slot; `kept` was written last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
  pub state: usize,
  pub symbol: Symbol,
  pub kept: Action,
  pub discarded: Action,
}

#[derive(Debug, Clone)]
pub struct ParseTable {
  pub(super) start: String,
  pub(super) states: Vec<IndexMap<Symbol, Action>>,
  pub(super) conflicts: Vec<Conflict>,
}

impl ParseTable {
  /// Fills each state with its reductions, then its transitions, so that a
  /// shift replaces a reduction on the same symbol.
  pub(crate) fn new(
    bnf: &Bnf,
    states: &[State],
  ) -> Self {
    let start = bnf.nonterm_name(bnf.start).to_owned();
    let mut conflicts = vec![];
    let mut table = Vec::with_capacity(states.len());

    for (ix, state) in states.iter().enumerate() {
      let mut actions = IndexMap::new();

      for (item, lookaheads) in &state.items {
        let prod = bnf.prod(item.prod);
        if item.dot < prod.symbols.len() {
          continue;
        }
        let name = bnf.nonterm_name(prod.nonterm_id);
        for t in lookaheads.iter() {
          let symbol = bnf.term_symbol(TermId(t as u32)).clone();
          set_action(&mut actions, &mut conflicts, ix, symbol, Action::Reduce {
            arity: item.dot,
            name: name.to_owned(),
          });
        }
      }

      for (&symbol, &target) in &state.transitions {
        let (symbol, action) = match symbol {
          bnf::Symbol::Term(id) => {
            (bnf.term_symbol(id).clone(), Action::Shift(target))
          }
          bnf::Symbol::Nonterm(id) => {
            let name = bnf.nonterm_name(id).to_owned();
            (Symbol::NonTerminal(name), Action::Goto(target))
          }
        };
        set_action(&mut actions, &mut conflicts, ix, symbol, action);
      }

      for action in actions.values_mut() {
        if matches!(action, Action::Reduce { name, .. } if *name == start) {
          *action = Action::Accept;
        }
      }

      table.push(actions);
    }

    let accepts = table.iter().flat_map(|actions| actions.values())
      .any(|action| *action == Action::Accept);
    if !accepts {
      warn!("no accepting state for `{}`: its reduction lost every conflict", start);
    }

    ParseTable {
      start,
      states: table,
      conflicts,
    }
  }

  pub fn start(&self) -> &str {
    &self.start
  }

  pub fn is_augmented(&self) -> bool {
    self.start == Grammar::AUGMENTED_START
  }

  pub fn len(&self) -> usize {
    self.states.len()
  }

  pub fn is_empty(&self) -> bool {
    self.states.is_empty()
  }

  pub fn states(&self) -> &[IndexMap<Symbol, Action>] {
    &self.states
  }

  pub fn action(&self, state: usize, symbol: &Symbol) -> Option<&Action> {
    self.states.get(state)?.get(symbol)
  }

  /// Slots that were written more than once with different actions.
  pub fn conflicts(&self) -> &[Conflict] {
    &self.conflicts
  }
}

fn set_action(
  actions: &mut IndexMap<Symbol, Action>,
  conflicts: &mut Vec<Conflict>,
  state: usize,
  symbol: Symbol,
  action: Action,
) {
  if let Some(old) = actions.insert(symbol.clone(), action.clone()) {
    if old != action {
      warn!("conflict in state {} on {}: `{}` replaces `{}`",
        state, symbol, action, old);
      conflicts.push(Conflict {
        state,
        symbol,
        kept: action,
        discarded: old,
      });
    }
  }
}

/// One line per state: `index: symbol action, ...`.
impl Display for ParseTable {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    for (ix, actions) in self.states.iter().enumerate() {
      write!(f, "{}:", ix)?;
      for (i, (symbol, action)) in actions.iter().enumerate() {
        let sep = if i == 0 { "" } else { "," };
        write!(f, "{} {} {}", sep, symbol, action)?;
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::{grammar, nonterm, term};
  use pretty_assertions::assert_eq;

  fn sum() -> Grammar {
    grammar("sum", "S", &[
      ("S", vec![nonterm("A")]),
      ("A", vec![nonterm("A"), term("+"), nonterm("B")]),
      ("A", vec![term("a")]),
      ("B", vec![term("b")]),
    ])
  }

  fn accepts(table: &ParseTable) -> usize {
    table.states()
      .iter()
      .flat_map(|actions| actions.values())
      .filter(|action| **action == Action::Accept)
      .count()
  }

  #[test]
  fn sum_table() {
    let table = sum().build_table().unwrap();

    insta::assert_snapshot!(table.to_string(), @r###"
    0: A goto 1, "a" shift 2
    1: $ accept, "+" shift 3
    2: $ reduce 1 A, "+" reduce 1 A
    3: B goto 4, "b" shift 5
    4: $ reduce 3 A, "+" reduce 3 A
    5: $ reduce 1 B, "+" reduce 1 B
    "###);
    assert!(table.conflicts().is_empty());
    assert!(!table.is_augmented());
  }

  #[test]
  fn lookup() {
    let table = sum().build_table().unwrap();

    assert_eq!(table.len(), 6);
    assert_eq!(table.action(0, &term("a")), Some(&Action::Shift(2)));
    assert_eq!(table.action(0, &nonterm("A")), Some(&Action::Goto(1)));
    assert_eq!(table.action(4, &term("+")),
      Some(&Action::Reduce { arity: 3, name: "A".to_owned() }));
    assert_eq!(table.action(0, &term("b")), None);
    assert_eq!(table.action(17, &term("a")), None);
  }

  #[test]
  fn single_accept() {
    assert_eq!(accepts(&sum().build_table().unwrap()), 1);

    let mut recursive = grammar("list", "L", &[
      ("L", vec![nonterm("L"), term(",")]),
      ("L", vec![term("x")]),
    ]);
    let table = recursive.build_table().unwrap();
    assert!(table.is_augmented());
    assert_eq!(accepts(&table), 1);
    assert_eq!(table.action(1, &Symbol::EndOfInput), Some(&Action::Accept));
  }

  #[test]
  fn shift_wins_shift_reduce() {
    let mut dangling = grammar("if", "S", &[
      ("S", vec![term("i"), nonterm("S")]),
      ("S", vec![term("i"), nonterm("S"), term("e"), nonterm("S")]),
      ("S", vec![term("x")]),
    ]);
    let table = dangling.build_table().unwrap();

    assert!(!table.conflicts().is_empty());
    for conflict in table.conflicts() {
      assert_eq!(conflict.symbol, term("e"));
      assert!(matches!(conflict.kept, Action::Shift(_)));
      assert!(matches!(conflict.discarded, Action::Reduce { arity: 2, .. }));
      assert_eq!(table.action(conflict.state, &term("e")), Some(&conflict.kept));
    }
  }

  #[test]
  fn later_reduce_wins_reduce_reduce() {
    let mut g = grammar("rr", "S", &[
      ("S", vec![nonterm("A")]),
      ("S", vec![nonterm("B")]),
      ("A", vec![term("x")]),
      ("B", vec![term("x")]),
    ]);
    let table = g.build_table().unwrap();

    assert_eq!(table.conflicts(), &[Conflict {
      state: 3,
      symbol: Symbol::EndOfInput,
      kept: Action::Reduce { arity: 1, name: "B".to_owned() },
      discarded: Action::Reduce { arity: 1, name: "A".to_owned() },
    }]);
  }

  #[test]
  fn start_reduction_can_lose_a_conflict() {
    let mut g = grammar("trailing", "S", &[
      ("S", vec![nonterm("S"), nonterm("B")]),
      ("S", vec![term("x")]),
      ("B", vec![]),
    ]);
    let table = g.build_table().unwrap();

    assert_eq!(accepts(&table), 0);
    assert_eq!(table.conflicts(), &[Conflict {
      state: 1,
      symbol: Symbol::EndOfInput,
      kept: Action::Reduce { arity: 0, name: "B".to_owned() },
      discarded: Action::Reduce { arity: 1, name: "".to_owned() },
    }]);
  }
}
