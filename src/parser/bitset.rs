use std::fmt::{self, Debug, Formatter};

type BitBlock = u64;

const BLOCK_NBITS: usize = std::mem::size_of::<BitBlock>() * 8;

/// Fixed-capacity set of small integers, used for terminal sets indexed by
/// terminal id.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct BitSet {
  slice: Box<[BitBlock]>,
}

impl BitSet {
  pub fn new(num_bits: usize) -> Self {
    let len = (num_bits + BLOCK_NBITS - 1) / BLOCK_NBITS;
    Self {
      slice: vec![0; len].into_boxed_slice(),
    }
  }

  pub fn from_bit(num_bits: usize, bit: usize) -> Self {
    let mut s = Self::new(num_bits);
    s.insert(bit);
    s
  }

  pub fn clear(&mut self) {
    for x in self.slice.iter_mut() {
      *x = 0;
    }
  }

  pub fn insert(&mut self, bit: usize) {
    self.slice[bit / BLOCK_NBITS] |= (1 as BitBlock) << (bit % BLOCK_NBITS);
  }

  /// Returns whether the set has changed.
  pub fn union_with(&mut self, other: &BitSet) -> bool {
    let mut changed = false;
    for (x, y) in self.slice.iter_mut().zip(other.slice.iter()) {
      let old = *x;
      *x |= *y;
      changed |= old != *x;
    }
    changed
  }

  pub fn iter(&self) -> Iter {
    Iter {
      slice: &self.slice,
      bit: 0,
      index: 0,
    }
  }
}

pub(crate) struct Iter<'a> {
  slice: &'a [BitBlock],
  bit: usize,
  index: usize,
}

impl<'a> Iterator for Iter<'a> {
  type Item = usize;

  fn next(&mut self) -> Option<usize> {
    while self.index < self.slice.len() {
      if self.bit < BLOCK_NBITS {
        let bit = (self.slice[self.index] & !(((1 as BitBlock) << self.bit) - 1))
          .trailing_zeros() as usize;
        if bit < BLOCK_NBITS {
          self.bit = bit + 1;
          return Some(self.index * BLOCK_NBITS + bit);
        }
      }

      self.index += 1;
      self.bit = 0;
    }
    None
  }
}

impl Debug for BitSet {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    f.debug_set().entries(self.iter()).finish()
  }
}

#[cfg(test)]
mod tests {
  use super::BitSet;
  use pretty_assertions::assert_eq;

  #[test]
  fn insert() {
    let mut set = BitSet::new(15);

    set.insert(7);
    set.insert(3);
    set.insert(7);
    set.insert(14);

    let vec = set.iter().collect::<Vec<_>>();

    assert_eq!(vec, vec![3, 7, 14]);
  }

  #[test]
  fn iter_across_blocks() {
    let mut set = BitSet::new(200);

    set.insert(0);
    set.insert(63);
    set.insert(64);
    set.insert(199);

    assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 63, 64, 199]);
  }

  #[test]
  fn union_reports_change() {
    let mut a = BitSet::from_bit(70, 1);
    let b = BitSet::from_bit(70, 65);

    assert!(a.union_with(&b));
    assert!(!a.union_with(&b));
    assert_eq!(a.iter().collect::<Vec<_>>(), vec![1, 65]);
  }

  #[test]
  fn clear() {
    let mut set = BitSet::from_bit(10, 4);
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![4]);

    set.clear();

    assert_eq!(set.iter().count(), 0);
  }
}
