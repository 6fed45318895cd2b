use std::cell::OnceCell;
use std::fmt::{self, Display, Formatter};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use crate::bnf::{Bnf, TermId};
use crate::error::{Error, Result};
use crate::parser::{self, ParseTable, Sets};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
  Terminal(String),
  NonTerminal(String),
  EndOfInput,
  Empty,
}

impl Symbol {
  pub fn is_terminal(&self) -> bool {
    matches!(self, Symbol::Terminal(_))
  }

  pub fn is_nonterminal(&self) -> bool {
    matches!(self, Symbol::NonTerminal(_))
  }
}

impl Display for Symbol {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Symbol::Terminal(lit) => write!(f, "{:?}", lit),
      Symbol::NonTerminal(name) => write!(f, "{}", name),
      Symbol::EndOfInput => write!(f, "$"),
      Symbol::Empty => write!(f, "ε"),
    }
  }
}

/// One alternative of a rule. An empty production derives the empty string.
pub type Production = Vec<Symbol>;

#[derive(Debug, Clone)]
pub struct Grammar {
  name: String,
  start: String,
  rules: IndexMap<String, Vec<Production>>,
  analysis: OnceCell<Analysis>,
}

#[derive(Debug, Clone)]
struct Analysis {
  bnf: Bnf,
  sets: Sets,
}

impl Grammar {
  /// Name of the nonterminal `augment` introduces.
  pub const AUGMENTED_START: &'static str = "";

  pub fn new(
    name: impl Into<String>,
    start: impl Into<String>,
  ) -> Self {
    Grammar {
      name: name.into(),
      start: start.into(),
      rules: IndexMap::new(),
      analysis: OnceCell::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn start(&self) -> &str {
    &self.start
  }

  pub fn rules(&self) -> &IndexMap<String, Vec<Production>> {
    &self.rules
  }

  pub fn alternatives(&self, name: &str) -> Option<&[Production]> {
    self.rules.get(name).map(|alts| alts.as_slice())
  }

  pub fn add_rule(
    &mut self,
    name: impl Into<String>,
    production: Production,
  ) {
    self.rules.entry(name.into()).or_default().push(production);
    self.analysis.take();
  }

  /// Checks that every nonterminal referenced by a production has rules.
  /// The first dangling reference, in rule order, is reported.
  pub fn validate(&self) -> Result<()> {
    for (rule, alts) in &self.rules {
      for sym in alts.iter().flatten() {
        if let Symbol::NonTerminal(name) = sym {
          if !self.rules.contains_key(name) {
            return Err(Error::InvalidGrammar {
              rule: rule.clone(),
              symbol: name.clone(),
            });
          }
        }
      }
    }
    Ok(())
  }

  pub fn is_valid(&self) -> bool {
    self.validate().is_ok()
  }

  /// Introduces `"" -> start` when the start symbol occurs on some right-hand
  /// side. Returns whether the grammar was rewritten.
  pub fn augment(&mut self) -> bool {
    let start = Symbol::NonTerminal(self.start.clone());
    let in_rhs = self.rules.values()
      .flatten()
      .any(|prod| prod.contains(&start));
    if !in_rhs {
      return false;
    }

    let old = std::mem::replace(
      &mut self.start, Self::AUGMENTED_START.to_owned());
    self.add_rule(Self::AUGMENTED_START, vec![Symbol::NonTerminal(old)]);
    true
  }

  pub fn is_augmented(&self) -> bool {
    self.start == Self::AUGMENTED_START
  }

  fn analysis(&self) -> &Analysis {
    self.analysis.get_or_init(|| {
      let bnf = Bnf::from(self);
      let sets = Sets::new(&bnf);
      Analysis { bnf, sets }
    })
  }

  /// FIRST set of `symbol`. Contains [`Symbol::Empty`] iff the symbol can
  /// derive the empty string.
  pub fn first(&self, symbol: &Symbol) -> IndexSet<Symbol> {
    let name = match symbol {
      Symbol::NonTerminal(name) => name,
      _ => return IndexSet::from([symbol.clone()]),
    };

    let Analysis { bnf, sets } = self.analysis();
    let mut set = IndexSet::new();
    if let Some(id) = bnf.nonterm_id(name) {
      let ix = id.0 as usize;
      set.extend(sets.first[ix].iter().map(|t| term_symbol(bnf, t)));
      if sets.nullable[ix] {
        set.insert(Symbol::Empty);
      }
    }
    set
  }

  /// FOLLOW set of `symbol`. The start symbol is always followed by
  /// [`Symbol::EndOfInput`].
  pub fn follow(&self, symbol: &Symbol) -> IndexSet<Symbol> {
    let Analysis { bnf, sets } = self.analysis();
    let follow = match symbol {
      Symbol::NonTerminal(name) => bnf.nonterm_id(name)
        .map(|id| &sets.follow[id.0 as usize]),
      Symbol::Terminal(_) | Symbol::EndOfInput => bnf.term_id(symbol)
        .map(|id| &sets.term_follow[id.0 as usize]),
      Symbol::Empty => None,
    };

    follow
      .map(|set| set.iter().map(|t| term_symbol(bnf, t)).collect())
      .unwrap_or_default()
  }

  /// FIRST sets of every nonterminal.
  pub fn firsts(&self) -> IndexMap<Symbol, IndexSet<Symbol>> {
    self.nonterminals()
      .map(|sym| {
        let set = self.first(&sym);
        (sym, set)
      })
      .collect()
  }

  /// FOLLOW sets of every nonterminal, then of every terminal.
  pub fn follows(&self) -> IndexMap<Symbol, IndexSet<Symbol>> {
    let bnf = &self.analysis().bnf;
    let terms = bnf.terms().filter(|sym| sym.is_terminal()).cloned();
    self.nonterminals()
      .chain(terms)
      .map(|sym| {
        let set = self.follow(&sym);
        (sym, set)
      })
      .collect()
  }

  fn nonterminals(&self) -> impl Iterator<Item = Symbol> + '_ {
    self.analysis().bnf.nonterms
      .iter()
      .map(|nt| Symbol::NonTerminal(nt.name.clone()))
  }

  /// Validates and augments the grammar, then builds its LR(1) table.
  pub fn build_table(&mut self) -> Result<ParseTable> {
    self.validate()?;
    if !self.rules.contains_key(&self.start) {
      return Err(Error::UndefinedStart(self.start.clone()));
    }
    self.augment();

    debug!("building table for grammar `{}` ({} rules)",
      self.name, self.rules.len());

    let Analysis { bnf, sets } = self.analysis();
    Ok(parser::gen_table(bnf, sets))
  }
}

fn term_symbol(bnf: &Bnf, t: usize) -> Symbol {
  bnf.term_symbol(TermId(t as u32)).clone()
}

pub fn term(
  lit: impl Into<String>,
) -> Symbol {
  Symbol::Terminal(lit.into())
}

pub fn nonterm(
  name: impl Into<String>,
) -> Symbol {
  Symbol::NonTerminal(name.into())
}

/// Builds a grammar from `(name, production)` pairs. Repeated names add
/// alternatives in order.
pub fn grammar(
  name: &str,
  start: &str,
  rules: &[(&str, Production)],
) -> Grammar {
  let mut grammar = Grammar::new(name, start);
  for (name, prod) in rules {
    grammar.add_rule(*name, prod.clone());
  }
  grammar
}
