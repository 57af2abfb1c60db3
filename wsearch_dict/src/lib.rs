use std::{
  fs::File,
  io::{BufRead, BufReader},
  path::Path,
};

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use util::error::PuzzleResult;

static WORD_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").expect("hard-coded regex is valid"));

const BUILTIN_WORDS: &str = include_str!("../words.txt");

/// A deduplicated, canonicalized list of candidate words for puzzle
/// generation. Length filtering and palindrome exclusion happen later, at
/// trie-load time; this layer only rejects entries that are not plain
/// alphabetic words.
#[derive(Clone, Debug)]
pub struct Dictionary {
  words: Vec<String>,
}

impl Dictionary {
  fn canonicalize_word(word: &str) -> Option<String> {
    let word = word.trim();
    WORD_RE
      .is_match(word)
      .then(|| word.to_ascii_lowercase())
  }

  pub fn from_lines<S: AsRef<str>>(lines: impl IntoIterator<Item = S>) -> Self {
    Self {
      words: lines
        .into_iter()
        .filter_map(|line| Self::canonicalize_word(line.as_ref()))
        .unique()
        .collect(),
    }
  }

  pub fn from_file(path: impl AsRef<Path>) -> PuzzleResult<Self> {
    Ok(Self::from_lines(
      BufReader::new(File::open(path)?)
        .lines()
        .collect::<Result<Vec<_>, _>>()?,
    ))
  }

  pub fn builtin() -> Self {
    Self::from_lines(BUILTIN_WORDS.lines())
  }

  pub fn words(&self) -> impl Iterator<Item = &str> {
    self.words.iter().map(|word| word.as_str())
  }

  pub fn len(&self) -> usize {
    self.words.len()
  }

  pub fn is_empty(&self) -> bool {
    self.words.is_empty()
  }
}
