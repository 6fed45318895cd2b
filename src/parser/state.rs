use std::collections::VecDeque;
use indexmap::{IndexMap, IndexSet};
use indexmap::map::Entry;
use log::debug;
use crate::bnf::*;
use super::bitset::BitSet;
use super::sets::{compute_first_for_symbols, Sets};

/// Items that share a core, grouped with their lookaheads.
pub(crate) type ItemSet = IndexMap<Lr0Item, BitSet>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Lr0Item {
  pub(crate) prod: ProdId,
  pub(crate) dot: usize,
}

#[derive(Debug)]
pub(crate) struct State {
  /// closure of the kernel, kernel items first
  pub(crate) items: ItemSet,
  /// symbol -> index of target state
  pub(crate) transitions: IndexMap<Symbol, usize>,
}

/// LR(1) kernel items, sorted
type StateKey = Vec<(Lr0Item, BitSet)>;

/// Builds the canonical LR(1) automaton. States are numbered in the order
/// they are discovered; state 0 is the initial state.
pub(crate) fn gen_states(
  bnf: &Bnf,
  sets: &Sets,
) -> Vec<State> {
  let mut initial = ItemSet::new();
  for &prod in &bnf.nonterms[bnf.start.0 as usize].prods {
    initial.insert(Lr0Item { prod, dot: 0 },
      BitSet::from_bit(bnf.num_terms(), END.0 as usize));
  }

  let mut keys = IndexSet::new();
  keys.insert(state_key(&initial));
  let mut queue = VecDeque::from([initial]);
  let mut states = vec![];
  let mut reused = 0;

  // every new key is queued, so a state's index is also its key's index
  while let Some(kernel) = queue.pop_front() {
    let items = closure(bnf, sets, kernel);

    let mut transitions = IndexMap::new();
    for (symbol, target) in gen_transitions(bnf, &items) {
      let (ix, inserted) = keys.insert_full(state_key(&target));
      if inserted {
        queue.push_back(target);
      } else {
        reused += 1;
      }
      transitions.insert(symbol, ix);
    }

    states.push(State {
      items,
      transitions,
    });
  }

  debug!("{} states, {} transitions into existing states", states.len(), reused);

  states
}

fn state_key(kernel: &ItemSet) -> StateKey {
  let mut key = kernel.iter()
    .map(|(&item, lookaheads)| (item, lookaheads.clone()))
    .collect::<Vec<_>>();
  key.sort_unstable_by_key(|&(item, _)| item);
  key
}

/// For each `[A -> α . B β, a]`, adds `[B -> . γ, b]` for every `b` in
/// FIRST(β a), until no lookahead set grows.
fn closure(
  bnf: &Bnf,
  sets: &Sets,
  mut items: ItemSet,
) -> ItemSet {
  let mut buf = BitSet::new(bnf.num_terms());

  loop {
    let mut changed = false;
    let mut i = 0;
    while let Some((&item, lookaheads)) = items.get_index(i) {
      i += 1;
      let symbols = &bnf.prod(item.prod).symbols;
      let nonterm = match symbols.get(item.dot) {
        Some(&Symbol::Nonterm(id)) => id,
        _ => continue,
      };

      buf.clear();
      compute_first_for_symbols(&mut buf, &sets.first, &sets.nullable,
        &symbols[item.dot + 1..], Some(lookaheads));

      for &prod in &bnf.nonterms[nonterm.0 as usize].prods {
        changed |= match items.entry(Lr0Item { prod, dot: 0 }) {
          Entry::Occupied(mut e) => e.get_mut().union_with(&buf),
          Entry::Vacant(e) => {
            e.insert(buf.clone());
            true
          }
        };
      }
    }

    if !changed {
      break items;
    }
  }
}

/// Groups the items by the symbol after the dot, in order of first
/// appearance, and advances each group past it.
fn gen_transitions(
  bnf: &Bnf,
  items: &ItemSet,
) -> IndexMap<Symbol, ItemSet> {
  let mut transitions = IndexMap::<Symbol, ItemSet>::new();
  for (item, lookaheads) in items {
    if let Some(&symbol) = bnf.prod(item.prod).symbols.get(item.dot) {
      transitions.entry(symbol)
        .or_default()
        .insert(Lr0Item { prod: item.prod, dot: item.dot + 1 },
          lookaheads.clone());
    }
  }
  transitions
}
