use crate::bnf::*;
use super::bitset::BitSet;

/// Nullable, FIRST and FOLLOW sets of a grammar. Terminal sets are indexed by
/// `TermId`, everything else by `NontermId`.
#[derive(Debug, Clone)]
pub(crate) struct Sets {
  pub(crate) nullable: Vec<bool>,
  pub(crate) first: Vec<BitSet>,
  pub(crate) follow: Vec<BitSet>,
  /// FOLLOW sets of terminals
  pub(crate) term_follow: Vec<BitSet>,
}

impl Sets {
  pub(crate) fn new(bnf: &Bnf) -> Self {
    let nullable = gen_nullable(bnf);
    let first = gen_first(bnf, &nullable);
    let (follow, term_follow) = gen_follow(bnf, &nullable, &first);
    Sets {
      nullable,
      first,
      follow,
      term_follow,
    }
  }
}

pub(super) fn gen_nullable(
  bnf: &Bnf,
) -> Vec<bool> {
  let mut nullable = vec![false; bnf.nonterms.len()];

  loop {
    let mut changed = false;
    for prod in &bnf.prods {
      if prod.symbols.iter().all(|sym| is_nullable(&nullable, sym)) {
        let nt_ix = prod.nonterm_id.0 as usize;
        changed |= !nullable[nt_ix];
        nullable[nt_ix] = true;
      }
    }
    if !changed {
      break;
    }
  }

  nullable
}

fn is_nullable(nullable: &[bool], sym: &Symbol) -> bool {
  match sym {
    Symbol::Term(_) => false,
    Symbol::Nonterm(id) => nullable[id.0 as usize],
  }
}

/// A left-recursive alternative adds nothing to its own nonterminal until some
/// other alternative does, so the fixpoint needs no recursion guard.
pub(super) fn gen_first(
  bnf: &Bnf,
  nullable: &[bool],
) -> Vec<BitSet> {
  let mut buf = BitSet::new(bnf.num_terms());
  let mut first = vec![buf.clone(); bnf.nonterms.len()];

  loop {
    let mut changed = false;
    for prod in &bnf.prods {
      buf.clear();
      compute_first_for_symbols(&mut buf, &first, nullable, &prod.symbols,
        None);
      changed |= first[prod.nonterm_id.0 as usize].union_with(&buf);
    }
    if !changed {
      break;
    }
  }

  first
}

/// Each occurrence of a symbol is followed by FIRST of the rest of its
/// production, plus FOLLOW of the production's nonterminal when the rest is
/// nullable.
pub(super) fn gen_follow(
  bnf: &Bnf,
  nullable: &[bool],
  first: &[BitSet],
) -> (Vec<BitSet>, Vec<BitSet>) {
  let mut buf = BitSet::new(bnf.num_terms());
  let mut follow = vec![buf.clone(); bnf.nonterms.len()];
  let mut term_follow = vec![buf.clone(); bnf.num_terms()];

  follow[bnf.start.0 as usize].insert(END.0 as usize);

  loop {
    let mut changed = false;
    for prod in &bnf.prods {
      for (i, sym) in prod.symbols.iter().enumerate() {
        buf.clear();
        compute_first_for_symbols(&mut buf, first, nullable,
          &prod.symbols[i + 1..], Some(&follow[prod.nonterm_id.0 as usize]));
        changed |= match sym {
          Symbol::Term(id) => term_follow[id.0 as usize].union_with(&buf),
          Symbol::Nonterm(id) => follow[id.0 as usize].union_with(&buf),
        };
      }
    }
    if !changed {
      break;
    }
  }

  (follow, term_follow)
}

/// FIRST of `symbols`, followed by `lookaheads` if all of `symbols` are
/// nullable.
pub(super) fn compute_first_for_symbols(
  result: &mut BitSet,
  first: &[BitSet],
  nullable: &[bool],
  symbols: &[Symbol],
  lookaheads: Option<&BitSet>,
) {
  for sym in symbols {
    match sym {
      Symbol::Term(id) => {
        result.insert(id.0 as usize);
        return;
      }
      Symbol::Nonterm(id) => {
        result.union_with(&first[id.0 as usize]);
        if !nullable[id.0 as usize] {
          return;
        }
      }
    }
  }

  if let Some(lookaheads) = lookaheads {
    result.union_with(lookaheads);
  }
}
