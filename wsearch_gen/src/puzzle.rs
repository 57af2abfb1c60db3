use std::collections::{BTreeSet, HashMap};

use bitcode::{Decode, Encode};
use rand::Rng;
use util::{
  error::{PuzzleError, PuzzleResult},
  grid::Grid,
  pos::Pos,
};

use crate::{
  dirs::{self, Dir},
  trie::{random_letter, Trie},
  verify,
};

/// Fraction of cells that should hold intentionally placed letters before the
/// grow loop stops on its own.
const TARGET_FILL: f64 = 0.75;
/// Consecutive placement failures tolerated before growth is considered
/// stalled. Stalling is normal early termination, not an error.
const MAX_CONSECUTIVE_FAILURES: u32 = 1000;
/// Full rebuilds allowed before generation is abandoned.
const MAX_TOTAL_FAILURES: u64 = 1_000_000;
/// Directions tracked per cell. Only 4 line axes can cross one cell; further
/// crossings are allowed but no longer steer anchor selection.
const MAX_TRACKED_DIRS: usize = 4;
/// Relative weights for anchoring on cells crossed by 1, 2, or 3 words.
const CROSSING_WEIGHTS: [u32; 3] = [11, 7, 2];

/// A finished, verified word-search puzzle.
#[derive(Clone, Debug, Encode, Decode)]
pub struct Puzzle {
  pub grid: Grid<char>,
  pub used_words: Vec<String>,
  /// Start cell of each hidden word's intended occurrence.
  pub placements: HashMap<String, Pos>,
  /// Fraction of cells holding an intentionally placed letter.
  pub coverage_ratio: f64,
  /// Whole-grid rebuilds it took to reach a verifiable puzzle.
  pub fails: u64,
}

/// Drives puzzle generation. The dictionary trie is built once and reused
/// across every rebuild attempt; all other state is per-attempt.
pub struct Generator {
  trie: Trie,
  /// Length window the dictionary was loaded with. The verification scratch
  /// trie reloads the placed words through the same window so none of them
  /// can be filtered away.
  min_len: usize,
  max_len: usize,
}

impl Generator {
  pub fn new<S: AsRef<str>>(words: impl IntoIterator<Item = S>) -> Self {
    Self::with_length_bounds(words, crate::trie::DEFAULT_MIN_LEN, crate::trie::DEFAULT_MAX_LEN)
  }

  pub fn with_length_bounds<S: AsRef<str>>(
    words: impl IntoIterator<Item = S>,
    min_len: usize,
    max_len: usize,
  ) -> Self {
    let mut trie = Trie::new();
    trie.load_bounded(words, min_len, max_len);
    Self { trie, min_len, max_len }
  }

  pub fn dictionary_size(&self) -> usize {
    self.trie.size()
  }

  /// Generates one n-by-n puzzle, rebuilding from scratch whenever
  /// verification declares an attempt unrecoverable.
  pub fn generate<R: Rng>(&self, n: u32, rng: &mut R) -> PuzzleResult<Puzzle> {
    if n == 0 {
      return Err(PuzzleError::Parse("grid size must be positive".to_owned()).into());
    }
    let mut fails = 0;
    loop {
      if let Some(mut puzzle) = self.build_once(n, rng)? {
        puzzle.fails = fails;
        return Ok(puzzle);
      }
      fails += 1;
      if fails >= MAX_TOTAL_FAILURES {
        return Err(
          PuzzleError::Exhausted(format!("could not build a puzzle in {fails} attempts")).into(),
        );
      }
    }
  }

  /// One full generation attempt: seed, grow, fill, verify. Ok(None) means
  /// the attempt was unrecoverable and the caller should rebuild.
  fn build_once<R: Rng>(&self, n: u32, rng: &mut R) -> PuzzleResult<Option<Puzzle>> {
    let mut attempt = Attempt::new(n);

    // seed the first word near the center: split the grid into 16 regions and
    // anchor inside the middle 4
    let lo = (n / 4) as i32;
    let hi = (3 * n).div_ceil(4) as i32;
    let seed = Pos {
      x: lo + rng.random_range(0..hi - lo),
      y: lo + rng.random_range(0..hi - lo),
    };
    if let Some((dir, max_fwd)) = attempt.random_direction(seed, &[], rng) {
      attempt.try_word(&self.trie, seed, dir, 0, max_fwd, rng)?;
    }

    let target = TARGET_FILL * (n as f64 * n as f64);
    let mut consecutive_failures = 0;
    while (attempt.filled as f64) < target && attempt.used.len() < self.trie.size() {
      let placed = match attempt.random_start(rng) {
        Some((start, dir, min_len, max_len)) => {
          attempt.try_word(&self.trie, start, dir, min_len, max_len, rng)?
        }
        None => false,
      };
      if placed {
        consecutive_failures = 0;
      } else {
        consecutive_failures += 1;
        if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
          break;
        }
      }
    }

    let Attempt {
      grid,
      used,
      dir_map,
      word_pos,
      filled,
      ..
    } = attempt;

    // blanks get uniformly random letters
    let mut full = grid.map(|&cell| cell.unwrap_or_else(|| random_letter(rng)));

    let mut scratch = Trie::new();
    scratch.load_bounded(&used, self.min_len, self.max_len);
    if !verify::verify_and_repair(&scratch, &mut full, &used, &word_pos, &dir_map, rng)? {
      return Ok(None);
    }

    Ok(Some(Puzzle {
      grid: full,
      used_words: used,
      placements: word_pos,
      coverage_ratio: filled as f64 / (n as f64 * n as f64),
      fails: 0,
    }))
  }
}

/// Mutable state of one generation attempt, discarded on rebuild.
struct Attempt {
  n: u32,
  grid: Grid<Option<char>>,
  used: Vec<String>,
  /// Directions already running through each cell.
  dir_map: HashMap<Pos, Vec<Dir>>,
  /// Cells bucketed by how many words cross them (1, 2, or 3). Ordered so a
  /// seeded run draws the same anchors every time.
  crossings: [BTreeSet<Pos>; 3],
  word_pos: HashMap<String, Pos>,
  filled: usize,
}

impl Attempt {
  fn new(n: u32) -> Self {
    Self {
      n,
      grid: Grid::new(n, n),
      used: Vec::new(),
      dir_map: HashMap::new(),
      crossings: [BTreeSet::new(), BTreeSet::new(), BTreeSet::new()],
      word_pos: HashMap::new(),
      filled: 0,
    }
  }

  /// Retrieves a word from the trie for this cell/direction window and
  /// commits it. Ok(false) when no compatible word exists.
  fn try_word<R: Rng>(
    &mut self,
    trie: &Trie,
    start: Pos,
    dir: Dir,
    min_len: usize,
    max_len: usize,
    rng: &mut R,
  ) -> PuzzleResult<bool> {
    let Some(word) = trie.get_random(&self.grid, start, dir, min_len, max_len, &self.used, rng)
    else {
      return Ok(false);
    };
    self.place_word(start, dir, &word)?;
    self.used.push(word);
    Ok(true)
  }

  /// Writes a retrieved word into the grid. Letters land only in blank cells;
  /// occupied cells already match by construction of the retrieval walk.
  fn place_word(&mut self, start: Pos, dir: Dir, word: &str) -> PuzzleResult {
    let delta = dir.delta();
    self.word_pos.insert(word.to_owned(), start);
    for (i, c) in word.chars().enumerate() {
      let pos = start + delta * i as i32;
      let cell = self
        .grid
        .get_mut(pos)
        .ok_or_else(|| PuzzleError::Internal(format!("placement escapes the grid at {pos}")))?;
      if cell.is_none() {
        *cell = Some(c);
        self.filled += 1;
        self.dir_map.insert(pos, vec![dir]);
        self.crossings[0].insert(pos);
      } else {
        let dirs = self.dir_map.entry(pos).or_default();
        dirs.push(dir);
        let crossed = dirs.len();
        if crossed > MAX_TRACKED_DIRS {
          continue;
        }
        if crossed >= 2 {
          self.crossings[crossed - 2].remove(&pos);
        }
        if let Some(bucket) = self.crossings.get_mut(crossed - 1) {
          bucket.insert(pos);
        }
      }
    }
    Ok(())
  }

  /// Picks a direction whose axis is not yet used at `pos`, with the number
  /// of cells available before the grid edge in that direction.
  fn random_direction<R: Rng>(
    &self,
    pos: Pos,
    banned: &[Dir],
    rng: &mut R,
  ) -> Option<(Dir, usize)> {
    if banned.len() >= 4 {
      return None;
    }
    let candidates: Vec<Dir> = Dir::ALL
      .into_iter()
      .filter(|dir| !banned.iter().any(|b| b.same_axis(*dir)))
      .collect();
    if candidates.is_empty() {
      return None;
    }
    let dir = candidates[rng.random_range(0..candidates.len())];
    Some((dir, dirs::max_steps(pos, self.n, dir.delta())))
  }

  /// Draws a weighted-random anchor cell and derives the start cell,
  /// direction, and length window for the next word. The window always keeps
  /// the word inside the grid and forces it to cover the anchor.
  fn random_start<R: Rng>(&self, rng: &mut R) -> Option<(Pos, Dir, usize, usize)> {
    if self.crossings.iter().all(BTreeSet::is_empty) {
      return None;
    }
    let total: u32 = CROSSING_WEIGHTS.iter().sum();
    let bucket = loop {
      let r = rng.random_range(0..total);
      let mut acc = 0;
      let mut choice = CROSSING_WEIGHTS.len() - 1;
      for (i, &weight) in CROSSING_WEIGHTS.iter().enumerate() {
        acc += weight;
        if r < acc {
          choice = i;
          break;
        }
      }
      // redraw until the chosen bucket has cells in it
      if !self.crossings[choice].is_empty() {
        break choice;
      }
    };
    let cells = &self.crossings[bucket];
    let anchor = *cells.iter().nth(rng.random_range(0..cells.len()))?;

    let banned = self
      .dir_map
      .get(&anchor)
      .map(Vec::as_slice)
      .unwrap_or_default();
    let (dir, max_fwd) = self.random_direction(anchor, banned, rng)?;
    let max_rev = dirs::max_steps(anchor, self.n, -dir.delta());

    // 50/50: either the anchor is an offset along the reverse ray and the
    // word runs forward, or the word flips and runs backward over the anchor
    if rng.random_bool(0.5) {
      let m = rng.random_range(0..max_fwd);
      let start = anchor + dir.delta() * m as i32;
      // min m+1 keeps the anchor covered, max m+max_rev stays in bounds
      Some((start, dir.opposite(), m + 1, m + max_rev))
    } else {
      let m = rng.random_range(0..max_rev);
      let start = anchor - dir.delta() * m as i32;
      Some((start, dir, m + 1, m + max_fwd))
    }
  }
}
