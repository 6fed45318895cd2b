use log::trace;
use crate::error::{Error, Result};
use crate::grammar::Symbol;
use crate::tree::{NodeId, SyntaxTree, TreeBuilder};
use super::table::{Action, ParseTable};
use super::token::{Scanner, TokenSource};

/// A value on the parse stack with the state entered after pushing it. State
/// 0 sits below the first frame.
struct Frame {
  node: NodeId,
  state: usize,
}

impl ParseTable {
  /// Runs the shift-reduce automaton over `tokens`. Fails at the first token
  /// for which the current state has no action.
  ///
  /// A table whose conflicts overwrote its accepting reduction can cycle
  /// through reductions without reading input. Between two shifts a
  /// conflict-free table reduces at most once per nonterminal for each stack
  /// position, so running past that bound fails on the current token.
  pub fn parse(&self, mut tokens: impl TokenSource) -> Result<SyntaxTree> {
    let mut tree = TreeBuilder::default();
    let mut stack: Vec<Frame> = vec![];
    let mut token = tokens.next_token();
    let mut reductions = 0;
    let mut budget = self.reduction_budget(0);

    loop {
      let state = top(&stack);
      trace!("state {}, token {}", state, token);

      let action = match self.action(state, &token) {
        Some(action) => action,
        None => return Err(Error::Parse { state, token }),
      };

      match action {
        Action::Shift(next) => {
          let literal = match token {
            Symbol::Terminal(ref literal) => literal.clone(),
            _ => return Err(Error::Parse { state, token }),
          };
          stack.push(Frame {
            node: tree.leaf(literal),
            state: *next,
          });
          token = tokens.next_token();
          reductions = 0;
          budget = self.reduction_budget(stack.len());
        }

        Action::Reduce { arity, name } => {
          reductions += 1;
          if stack.len() < *arity || reductions > budget {
            return Err(Error::Parse { state, token });
          }
          let node = tree.interior(name.clone());
          for frame in stack.drain(stack.len() - arity..).rev() {
            tree.add_child(node, frame.node);
          }

          let exposed = top(&stack);
          match self.action(exposed, &Symbol::NonTerminal(name.clone())) {
            Some(&Action::Goto(next)) => stack.push(Frame {
              node,
              state: next,
            }),
            _ => return Err(Error::Parse { state: exposed, token }),
          }
        }

        Action::Accept => {
          trace!("accept");
          let root = if self.is_augmented() {
            match (stack.pop(), stack.is_empty()) {
              (Some(frame), true) => frame.node,
              _ => return Err(Error::Parse { state, token }),
            }
          } else {
            let node = tree.interior(self.start.clone());
            for frame in stack.drain(..).rev() {
              tree.add_child(node, frame.node);
            }
            node
          };
          return Ok(tree.finish(root));
        }

        Action::Goto(_) => return Err(Error::Parse { state, token }),
      }
    }
  }

  /// Parses `input` with one terminal per character.
  pub fn parse_str(&self, input: &str) -> Result<SyntaxTree> {
    self.parse(Scanner::new(input))
  }

  fn reduction_budget(&self, depth: usize) -> usize {
    (depth + 1).saturating_mul(self.states.len())
  }
}

fn top(stack: &[Frame]) -> usize {
  stack.last().map_or(0, |frame| frame.state)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::grammar::{grammar, nonterm, term, Grammar};
  use crate::parser::Tokens;
  use indexmap::IndexMap;
  use pretty_assertions::assert_eq;

  fn sum() -> ParseTable {
    grammar("sum", "S", &[
      ("S", vec![nonterm("A")]),
      ("A", vec![nonterm("A"), term("+"), nonterm("B")]),
      ("A", vec![term("a")]),
      ("B", vec![term("b")]),
    ]).build_table().unwrap()
  }

  #[test]
  fn left_associative_sum() {
    let tree = sum().parse_str("a+b+b").unwrap();

    insta::assert_snapshot!(tree.to_sexpr(),
      @r###"(S (A (A (A "a") "+" (B "b")) "+" (B "b")))"###);
    assert_eq!(tree.leaves(), vec!["a", "+", "b", "+", "b"]);
  }

  #[test]
  fn incomplete_input() {
    assert_eq!(sum().parse_str("a+").err(), Some(Error::Parse {
      state: 3,
      token: Symbol::EndOfInput,
    }));
  }

  #[test]
  fn unexpected_token() {
    assert_eq!(sum().parse_str("a+c").err(), Some(Error::Parse {
      state: 3,
      token: term("c"),
    }));
    assert_eq!(sum().parse_str("").err(), Some(Error::Parse {
      state: 0,
      token: Symbol::EndOfInput,
    }));
  }

  #[test]
  fn whitespace_skipping_scanner() {
    let table = sum();
    let tree = table.parse(Scanner::new("a+ b\n+b").skip_whitespace(true)).unwrap();

    assert_eq!(tree.to_sexpr(), table.parse_str("a+b+b").unwrap().to_sexpr());
  }

  #[test]
  fn augmented_root_is_user_start() {
    let mut g = grammar("parens", "S", &[
      ("S", vec![term("("), nonterm("S"), term(")")]),
      ("S", vec![term("x")]),
    ]);
    let table = g.build_table().unwrap();
    assert_eq!(g.start(), Grammar::AUGMENTED_START);

    let tree = table.parse_str("((x))").unwrap();

    assert_eq!(tree.to_sexpr(), r#"(S "(" (S "(" (S "x") ")") ")")"#);
    assert!(tree.root().parent().is_none());
    assert!(table.parse_str("((x)").is_err());
  }

  #[test]
  fn empty_productions() {
    let table = grammar("list", "L", &[
      ("L", vec![nonterm("L"), term("a")]),
      ("L", vec![]),
    ]).build_table().unwrap();

    assert_eq!(table.parse_str("").unwrap().to_sexpr(), "(L)");
    assert_eq!(table.parse_str("aa").unwrap().to_sexpr(),
      r#"(L (L (L) "a") "a")"#);
  }

  #[test]
  fn multi_character_terminals() {
    let table = grammar("let", "S", &[
      ("S", vec![term("let"), term("ident"), term("="), nonterm("E")]),
      ("E", vec![term("num")]),
      ("E", vec![term("ident")]),
    ]).build_table().unwrap();

    let tokens = Tokens::new(["let", "ident", "=", "num"].map(term));
    let tree = table.parse(tokens).unwrap();

    assert_eq!(tree.to_sexpr(), r#"(S "let" "ident" "=" (E "num"))"#);
  }

  #[test]
  fn nonterminal_tokens_are_rejected() {
    let table = sum();
    let tokens = Tokens::new(vec![nonterm("A")]);

    assert_eq!(table.parse(tokens).err(), Some(Error::Parse {
      state: 0,
      token: nonterm("A"),
    }));
  }

  #[test]
  fn reduction_cycle_fails_instead_of_looping() {
    let table = grammar("trailing", "S", &[
      ("S", vec![nonterm("S"), nonterm("B")]),
      ("S", vec![term("x")]),
      ("B", vec![]),
    ]).build_table().unwrap();

    assert!(matches!(table.parse_str("x"),
      Err(Error::Parse { token: Symbol::EndOfInput, .. })));
  }

  #[test]
  fn long_reduction_runs_are_allowed() {
    let table = grammar("right", "L", &[
      ("L", vec![term("x"), nonterm("L")]),
      ("L", vec![term("x")]),
    ]).build_table().unwrap();
    let input = "x".repeat(50);
    assert!(input.len() > table.len());

    let tree = table.parse_str(&input).unwrap();

    assert_eq!(tree.leaves().concat(), input);
    assert_eq!(tree.to_sexpr().matches("(L ").count(), 50);
  }

  #[test]
  fn missing_goto_reports_lookahead() {
    let mut state = IndexMap::new();
    state.insert(term("a"), Action::Reduce { arity: 0, name: "X".to_owned() });
    let table = ParseTable {
      start: "S".to_owned(),
      states: vec![state],
      conflicts: vec![],
    };

    assert_eq!(table.parse_str("a").err(), Some(Error::Parse {
      state: 0,
      token: term("a"),
    }));
  }
}
