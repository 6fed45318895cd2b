use std::iter::Fuse;
use std::str::Chars;
use crate::grammar::Symbol;

/// Forward-only supply of terminals for the parser. Once the input is
/// exhausted every call returns [`Symbol::EndOfInput`].
pub trait TokenSource {
  fn next_token(&mut self) -> Symbol;
}

impl<T: TokenSource + ?Sized> TokenSource for &mut T {
  fn next_token(&mut self) -> Symbol {
    (**self).next_token()
  }
}

/// One terminal per input character.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
  chars: Chars<'a>,
  skip_whitespace: bool,
}

impl<'a> Scanner<'a> {
  pub fn new(input: &'a str) -> Self {
    Scanner {
      chars: input.chars(),
      skip_whitespace: false,
    }
  }

  /// Drop whitespace characters instead of producing terminals for them.
  pub fn skip_whitespace(mut self, skip: bool) -> Self {
    self.skip_whitespace = skip;
    self
  }
}

impl TokenSource for Scanner<'_> {
  fn next_token(&mut self) -> Symbol {
    let skip = self.skip_whitespace;
    match self.chars.find(|c| !(skip && c.is_whitespace())) {
      Some(c) => Symbol::Terminal(c.to_string()),
      None => Symbol::EndOfInput,
    }
  }
}

/// Adapts an iterator of terminals produced by some other tokenizer.
#[derive(Debug, Clone)]
pub struct Tokens<I> {
  iter: Fuse<I>,
}

impl<I: Iterator<Item = Symbol>> Tokens<I> {
  pub fn new(tokens: impl IntoIterator<IntoIter = I>) -> Self {
    Tokens {
      iter: tokens.into_iter().fuse(),
    }
  }
}

impl<I: Iterator<Item = Symbol>> TokenSource for Tokens<I> {
  fn next_token(&mut self) -> Symbol {
    self.iter.next().unwrap_or(Symbol::EndOfInput)
  }
}
