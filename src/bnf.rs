use std::collections::HashMap;
use indexmap::IndexSet;
use crate::grammar::{self, Grammar};

/// Grammar with every symbol replaced by a dense id.
#[derive(Debug, Clone)]
pub(crate) struct Bnf {
  /// `EndOfInput` followed by the terminals in order of appearance.
  terms: IndexSet<grammar::Symbol>,
  nonterm_ids: HashMap<String, NontermId>,
  pub(crate) nonterms: Vec<Nonterm>,
  pub(crate) prods: Vec<Production>,
  pub(crate) start: NontermId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Symbol {
  Term(TermId),
  Nonterm(NontermId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct TermId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NontermId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct ProdId(pub(crate) u32);

pub(crate) const END: TermId = TermId(0);

#[derive(Debug, Clone, Default)]
pub(crate) struct Nonterm {
  pub(crate) name: String,
  /// empty for nonterminals that are referenced but never defined
  pub(crate) prods: Vec<ProdId>,
}

#[derive(Debug, Clone)]
pub(crate) struct Production {
  pub(crate) nonterm_id: NontermId,
  /// `Empty` symbols are dropped
  pub(crate) symbols: Vec<Symbol>,
}

impl Bnf {
  pub(crate) fn num_terms(&self) -> usize {
    self.terms.len()
  }

  pub(crate) fn terms(&self) -> impl Iterator<Item = &grammar::Symbol> {
    self.terms.iter()
  }

  pub(crate) fn term_id(&self, sym: &grammar::Symbol) -> Option<TermId> {
    self.terms.get_index_of(sym).map(|i| TermId(i as u32))
  }

  pub(crate) fn term_symbol(&self, id: TermId) -> &grammar::Symbol {
    &self.terms[id.0 as usize]
  }

  pub(crate) fn nonterm_id(&self, name: &str) -> Option<NontermId> {
    self.nonterm_ids.get(name).copied()
  }

  pub(crate) fn nonterm_name(&self, id: NontermId) -> &str {
    &self.nonterms[id.0 as usize].name
  }

  pub(crate) fn prod(&self, id: ProdId) -> &Production {
    &self.prods[id.0 as usize]
  }
}

impl From<&Grammar> for Bnf {
  fn from(grammar: &Grammar) -> Bnf {
    let mut terms = IndexSet::new();
    terms.insert(grammar::Symbol::EndOfInput);

    let mut nonterm_ids = HashMap::new();
    let mut nonterms = vec![];
    for name in grammar.rules().keys() {
      intern_nonterm(&mut nonterms, &mut nonterm_ids, name);
    }
    let start = intern_nonterm(&mut nonterms, &mut nonterm_ids, grammar.start());

    let mut prods = vec![];
    for (name, alts) in grammar.rules() {
      let nonterm_id = nonterm_ids[name];
      for alt in alts {
        let mut symbols = Vec::with_capacity(alt.len());
        for sym in alt {
          match sym {
            grammar::Symbol::Terminal(_) | grammar::Symbol::EndOfInput => {
              let (i, _) = terms.insert_full(sym.clone());
              symbols.push(Symbol::Term(TermId(i as u32)));
            }
            grammar::Symbol::NonTerminal(name) => {
              let id = intern_nonterm(&mut nonterms, &mut nonterm_ids, name);
              symbols.push(Symbol::Nonterm(id));
            }
            grammar::Symbol::Empty => {}
          }
        }

        let prod_id = ProdId(prods.len() as u32);
        prods.push(Production {
          nonterm_id,
          symbols,
        });
        nonterms[nonterm_id.0 as usize].prods.push(prod_id);
      }
    }

    Bnf {
      terms,
      nonterm_ids,
      nonterms,
      prods,
      start,
    }
  }
}

fn intern_nonterm(
  nonterms: &mut Vec<Nonterm>,
  nonterm_ids: &mut HashMap<String, NontermId>,
  name: &str,
) -> NontermId {
  if let Some(&id) = nonterm_ids.get(name) {
    return id;
  }

  let id = NontermId(nonterms.len() as u32);
  nonterm_ids.insert(name.to_owned(), id);
  nonterms.push(Nonterm {
    name: name.to_owned(),
    prods: vec![],
  });
  id
}
