use rand::Rng;
use util::{
  grid::Grid,
  pos::{Diff, Pos},
};

use crate::{dirs::Dir, validate::validate_word};

const ALPHABET: usize = 26;
/// Randomized walks per retrieval before giving up on a cell/direction pair.
const WALK_ATTEMPTS: u32 = 32;
/// Sentinel for "no word passes through this node yet".
const NO_LEN: usize = usize::MAX;

pub const DEFAULT_MIN_LEN: usize = 5;
pub const DEFAULT_MAX_LEN: usize = 20;

fn letter_index(c: char) -> Option<usize> {
  c.is_ascii_lowercase().then(|| c as usize - 'a' as usize)
}

pub(crate) fn random_letter<R: Rng>(rng: &mut R) -> char {
  (b'a' + rng.random_range(0..ALPHABET as u8)) as char
}

fn is_palindrome(word: &str) -> bool {
  word.bytes().eq(word.bytes().rev())
}

struct TrieNode {
  children: [Option<Box<TrieNode>>; ALPHABET],
  end_of_word: bool,
  /// Shortest and longest length, measured from the root, among words whose
  /// prefix path continues through this node. A node where a word merely
  /// terminates keeps the sentinels.
  min_len: usize,
  max_len: usize,
}

impl TrieNode {
  fn new() -> Self {
    Self {
      children: [const { None }; ALPHABET],
      end_of_word: false,
      min_len: NO_LEN,
      max_len: 0,
    }
  }

  fn live_children(&self) -> impl Iterator<Item = usize> + '_ {
    self
      .children
      .iter()
      .enumerate()
      .filter_map(|(idx, child)| child.is_some().then_some(idx))
  }
}

/// Prefix tree over lowercase words, augmented with per-node length bounds so
/// grid walks can prune branches whose every completion would leave the grid.
pub struct Trie {
  root: TrieNode,
  size: usize,
  min_len: usize,
  max_len: usize,
}

impl Default for Trie {
  fn default() -> Self {
    Self::new()
  }
}

impl Trie {
  pub fn new() -> Self {
    Self {
      root: TrieNode::new(),
      size: 0,
      min_len: NO_LEN,
      max_len: 0,
    }
  }

  /// Number of distinct words inserted.
  pub fn size(&self) -> usize {
    self.size
  }

  /// Global (min, max) word length, or None if the trie is empty.
  pub fn len_bounds(&self) -> Option<(usize, usize)> {
    (self.size > 0).then_some((self.min_len, self.max_len))
  }

  /// Inserts a canonical (lowercase ascii) word. Returns false without
  /// changing the size if the word was already present or contains a
  /// non-letter.
  pub fn insert(&mut self, word: &str) -> bool {
    // resolve every letter before touching any node, so a rejected word
    // cannot leave stale bounds on the prefixes it shares with real words
    let Some(indices) = word.chars().map(letter_index).collect::<Option<Vec<_>>>() else {
      return false;
    };
    let n = word.len();
    let mut node = &mut self.root;
    for idx in indices {
      node.min_len = node.min_len.min(n);
      node.max_len = node.max_len.max(n);
      node = node.children[idx].get_or_insert_with(|| Box::new(TrieNode::new()));
    }
    if node.end_of_word {
      return false;
    }
    node.end_of_word = true;
    self.size += 1;
    true
  }

  /// Exact-match lookup; a bare prefix does not count.
  pub fn search(&self, word: &str) -> bool {
    let mut node = &self.root;
    for c in word.chars() {
      let Some(idx) = letter_index(c) else {
        return false;
      };
      match &node.children[idx] {
        Some(child) => node = child,
        None => return false,
      }
    }
    node.end_of_word
  }

  /// Loads candidate words with the default length window.
  pub fn load<S: AsRef<str>>(&mut self, words: impl IntoIterator<Item = S>) {
    self.load_bounded(words, DEFAULT_MIN_LEN, DEFAULT_MAX_LEN)
  }

  /// Canonicalizes and inserts every candidate whose length falls inside
  /// [min_len, max_len]. Palindromes are skipped: they read the same along a
  /// ray and its reverse, which makes them degenerate for this game.
  pub fn load_bounded<S: AsRef<str>>(
    &mut self,
    words: impl IntoIterator<Item = S>,
    min_len: usize,
    max_len: usize,
  ) {
    for word in words {
      let word = word.as_ref().trim().to_ascii_lowercase();
      if word.len() < min_len
        || word.len() > max_len
        || is_palindrome(&word)
        || !word.chars().all(|c| c.is_ascii_lowercase())
      {
        continue;
      }
      self.insert(&word);
      self.min_len = self.min_len.min(word.len());
      self.max_len = self.max_len.max(word.len());
    }
  }

  /// Samples one word that can be written along `dir` starting at `start`,
  /// matching every letter already on the grid and passing the used-word
  /// validator. Returns None when `[min_len, max_len]` cannot overlap the
  /// trie's own length window, or after `WALK_ATTEMPTS` walks found nothing.
  pub fn get_random<R: Rng>(
    &self,
    grid: &Grid<Option<char>>,
    start: Pos,
    dir: Dir,
    min_len: usize,
    max_len: usize,
    used: &[String],
    rng: &mut R,
  ) -> Option<String> {
    if max_len < self.min_len || min_len > self.max_len {
      return None;
    }
    (0..WALK_ATTEMPTS).find_map(|_| self.random_walk(grid, start, dir, min_len, max_len, used, rng))
  }

  /// One randomized walk down the trie along the ray. Collects every
  /// validated complete word encountered, then picks one with weights
  /// 2, 3, ..., n+1 in discovery order, which leans toward longer words to
  /// favor overlap and coverage.
  fn random_walk<R: Rng>(
    &self,
    grid: &Grid<Option<char>>,
    start: Pos,
    dir: Dir,
    min_len: usize,
    max_len: usize,
    used: &[String],
    rng: &mut R,
  ) -> Option<String> {
    let delta = dir.delta();
    let mut words: Vec<String> = Vec::new();
    let mut curr = String::new();
    let mut node = &self.root;
    let mut pos = 0;
    while pos < max_len && node.max_len >= min_len {
      // the shortest completion through this node must stay inside the grid
      if node.min_len == NO_LEN || ray_cell(grid, start, delta, node.min_len - 1).is_none() {
        break;
      }
      let Some(cell) = ray_cell(grid, start, delta, pos) else {
        break;
      };
      let idx = match cell {
        // blank cell: free choice among live branches
        None => {
          let live: Vec<_> = node.live_children().collect();
          if live.is_empty() {
            break;
          }
          live[rng.random_range(0..live.len())]
        }
        // cell already holds a letter; only the matching branch may continue
        Some(c) => {
          let Some(idx) = letter_index(c) else {
            break;
          };
          if node.children[idx].is_none() {
            break;
          }
          idx
        }
      };
      curr.push(cell.unwrap_or((b'a' + idx as u8) as char));
      node = match &node.children[idx] {
        Some(child) => child,
        None => break,
      };
      if node.end_of_word && validate_word(&curr, used) {
        words.push(curr.clone());
      }
      pos += 1;
    }
    match words.len() {
      0 => None,
      1 => words.pop(),
      n => {
        // weights 2..=n+1, cumulative sum (n+1)(n+2)/2 - 1
        let total = (n + 1) * (n + 2) / 2 - 1;
        let r = rng.random_range(0..total);
        let mut acc = 0;
        words
          .into_iter()
          .enumerate()
          .find(|(i, _)| {
            acc += i + 2;
            acc > r
          })
          .map(|(_, word)| word)
      }
    }
  }

  /// First complete trie word readable along `dir` from `start` on a fully
  /// filled grid. Used by the verifier, which scans with a trie built over
  /// only the placed words.
  pub(crate) fn first_word_along(&self, grid: &Grid<char>, start: Pos, dir: Dir) -> Option<String> {
    if self.root.min_len == NO_LEN {
      return None;
    }
    let delta = dir.delta();
    // even the shortest word cannot fit along this ray
    if grid
      .get(start + delta * (self.root.min_len as i32 - 1))
      .is_none()
    {
      return None;
    }
    let mut node = &self.root;
    let mut curr = String::new();
    let mut cursor = start;
    loop {
      let c = *grid.get(cursor)?;
      let idx = letter_index(c)?;
      node = match &node.children[idx] {
        Some(child) => child,
        None => return None,
      };
      curr.push(c);
      if node.end_of_word {
        return Some(curr);
      }
      cursor += delta;
    }
  }
}

fn ray_cell(
  grid: &Grid<Option<char>>,
  start: Pos,
  delta: Diff,
  steps: usize,
) -> Option<Option<char>> {
  grid.get(start + delta * steps as i32).copied()
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;
  use rand::{rngs::StdRng, SeedableRng};
  use util::{grid::Grid, pos::Pos};

  use crate::dirs::Dir;

  use super::{Trie, TrieNode, NO_LEN};

  fn loaded(words: &[&str]) -> Trie {
    let mut trie = Trie::new();
    trie.load(words);
    trie
  }

  #[gtest]
  fn test_load_filters_length_and_palindromes() {
    let trie = loaded(&["cat", "level", "  Stone ", "antidisestablishmentarianism"]);
    // too short
    expect_false!(trie.search("cat"));
    // palindrome
    expect_false!(trie.search("level"));
    // too long (> 20)
    expect_false!(trie.search("antidisestablishmentarianism"));
    // trimmed and lowercased
    expect_true!(trie.search("stone"));
    expect_eq!(trie.size(), 1);
    expect_that!(trie.len_bounds(), some(eq((5, 5))));
  }

  #[gtest]
  fn test_insert_reports_duplicates() {
    let mut trie = Trie::new();
    expect_true!(trie.insert("river"));
    expect_false!(trie.insert("river"));
    expect_eq!(trie.size(), 1);
  }

  #[gtest]
  fn test_rejected_insert_leaves_bounds_untouched() {
    let mut trie = Trie::new();
    expect_true!(trie.insert("river"));
    // shares the "riv" prefix but carries a non-letter
    expect_false!(trie.insert("riv3rs"));
    expect_eq!(trie.size(), 1);
    expect_that!(audit(&trie.root, 0), some(eq((5, 5))));
  }

  #[gtest]
  fn test_search_requires_exact_match() {
    let trie = loaded(&["stones"]);
    expect_true!(trie.search("stones"));
    expect_false!(trie.search("stone"));
    expect_false!(trie.search("stoness"));
    expect_false!(trie.search(""));
  }

  /// Recomputes, for every node, the min/max length among words terminating
  /// strictly below it. Words that end exactly at a node never update that
  /// node's own bounds.
  fn audit(node: &TrieNode, depth: usize) -> Option<(usize, usize)> {
    let mut bounds: Option<(usize, usize)> = None;
    let mut fold = |len: usize| {
      bounds = Some(match bounds {
        Some((lo, hi)) => (lo.min(len), hi.max(len)),
        None => (len, len),
      });
    };
    for child in node.children.iter().flatten() {
      if child.end_of_word {
        fold(depth + 1);
      }
      if let Some((lo, hi)) = audit(child, depth + 1) {
        fold(lo);
        fold(hi);
      }
    }
    match bounds {
      Some((lo, hi)) => {
        assert_eq!(node.min_len, lo);
        assert_eq!(node.max_len, hi);
      }
      None => {
        assert_eq!(node.min_len, NO_LEN);
        assert_eq!(node.max_len, 0);
      }
    }
    bounds
  }

  #[gtest]
  fn test_per_node_length_bounds() {
    // "stones" contains "stone"; both load fine, containment only matters at
    // placement time
    let trie = loaded(&["stone", "stones", "stormy", "brick", "bricklayer"]);
    let bounds = audit(&trie.root, 0);
    expect_that!(bounds, some(eq((5, 10))));
  }

  fn grid_with(cells: &[(Pos, char)], n: u32) -> Grid<Option<char>> {
    let mut grid: Grid<Option<char>> = Grid::new(n, n);
    for &(pos, c) in cells {
      *grid.get_mut(pos).unwrap() = Some(c);
    }
    grid
  }

  #[gtest]
  fn test_get_random_matches_existing_letters() {
    let trie = loaded(&["stone", "store", "storm", "bring", "shore"]);
    let grid = grid_with(
      &[
        (Pos { x: 0, y: 3 }, 's'),
        (Pos { x: 1, y: 3 }, 't'),
        (Pos { x: 2, y: 3 }, 'o'),
      ],
      7,
    );
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..50 {
      let word = trie.get_random(&grid, Pos { x: 0, y: 3 }, Dir::E, 0, 7, &[], &mut rng);
      let word = word.expect("compatible words exist along this ray");
      expect_true!(word.starts_with("sto"));
      expect_that!(word.as_str(), any!(eq("stone"), eq("store"), eq("storm")));
    }
  }

  #[gtest]
  fn test_get_random_rejects_incompatible_prefix() {
    let trie = loaded(&["stone", "store"]);
    let grid = grid_with(&[(Pos { x: 0, y: 0 }, 'z')], 7);
    let mut rng = StdRng::seed_from_u64(3);
    expect_that!(
      trie.get_random(&grid, Pos::zero(), Dir::E, 0, 7, &[], &mut rng),
      none()
    );
  }

  #[gtest]
  fn test_get_random_window_precheck() {
    let trie = loaded(&["stone"]);
    let grid: Grid<Option<char>> = Grid::new(30, 30);
    let mut rng = StdRng::seed_from_u64(3);
    // requested window cannot overlap the trie's [5, 5]
    expect_that!(
      trie.get_random(&grid, Pos::zero(), Dir::E, 6, 30, &[], &mut rng),
      none()
    );
    expect_that!(
      trie.get_random(&grid, Pos::zero(), Dir::E, 0, 4, &[], &mut rng),
      none()
    );
  }

  #[gtest]
  fn test_get_random_respects_used_words() {
    let trie = loaded(&["stone"]);
    let grid: Grid<Option<char>> = Grid::new(10, 10);
    let mut rng = StdRng::seed_from_u64(11);
    let used = vec!["stone".to_owned()];
    expect_that!(
      trie.get_random(&grid, Pos::zero(), Dir::E, 0, 10, &used, &mut rng),
      none()
    );
  }

  #[gtest]
  fn test_get_random_stays_in_bounds() {
    let trie = loaded(&["stone", "stones", "store"]);
    let grid: Grid<Option<char>> = Grid::new(6, 6);
    let mut rng = StdRng::seed_from_u64(29);
    for _ in 0..50 {
      // only 3 cells remain to the west; nothing fits
      expect_that!(
        trie.get_random(&grid, Pos { x: 2, y: 0 }, Dir::W, 0, 3, &[], &mut rng),
        none()
      );
    }
  }

  #[gtest]
  fn test_first_word_along() {
    let trie = loaded(&["stone"]);
    let letters: Vec<char> = "stonex\
                             xxxxxx\
                             xxxxxx\
                             xxxxxx\
                             xxxxxx\
                             xxxxxx"
      .chars()
      .collect();
    let grid = Grid::from_vec(letters, 6, 6).unwrap();
    expect_that!(
      trie.first_word_along(&grid, Pos::zero(), Dir::E).as_deref(),
      some(eq("stone"))
    );
    expect_that!(trie.first_word_along(&grid, Pos::zero(), Dir::S), none());
    // too close to the edge for the shortest word
    expect_that!(
      trie.first_word_along(&grid, Pos { x: 4, y: 0 }, Dir::E),
      none()
    );
  }
}
