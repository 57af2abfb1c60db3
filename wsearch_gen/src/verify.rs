use std::collections::HashMap;

use itertools::Itertools;
use rand::Rng;
use util::{
  error::{PuzzleError, PuzzleResult},
  grid::Grid,
  pos::Pos,
};

use crate::{
  dirs::Dir,
  trie::{random_letter, Trie},
};

/// Scans the finished grid for unintended occurrences of placed words and
/// repairs them in place where possible.
///
/// `trie` must be built over exactly the placed words. Every (cell, direction)
/// ray is walked through the trie and the first complete word along it is
/// recorded. A word found more than once keeps the occurrence at its recorded
/// start and has one unclaimed letter (not in `dir_map`) of each other
/// occurrence replaced with a random letter. Mutation invalidates the scan,
/// so the whole pass repeats until a scan comes back clean.
///
/// Returns Ok(false) when a spurious occurrence has no unclaimed letter to
/// mutate, or when duplicates originate at the intended start itself; the
/// caller discards the attempt. A placed word missing entirely is an internal
/// fault, not a recoverable puzzle condition.
pub fn verify_and_repair<R: Rng>(
  trie: &Trie,
  grid: &mut Grid<char>,
  words: &[String],
  word_pos: &HashMap<String, Pos>,
  dir_map: &HashMap<Pos, Vec<Dir>>,
  rng: &mut R,
) -> PuzzleResult<bool> {
  loop {
    let mut occurrences: HashMap<&str, Vec<(Pos, Dir)>> =
      words.iter().map(|w| (w.as_str(), Vec::new())).collect();
    for (pos, dir) in grid.positions().cartesian_product(Dir::ALL) {
      if let Some(word) = trie.first_word_along(grid, pos, dir) {
        if let Some(found) = occurrences.get_mut(word.as_str()) {
          found.push((pos, dir));
        }
      }
    }

    let mut mutated = false;
    // walk the placement order, not the map order, so a seeded run repairs
    // the same cells every time
    for word in words {
      let found = occurrences
        .get(word.as_str())
        .map(Vec::as_slice)
        .unwrap_or_default();
      if found.is_empty() {
        return Err(
          PuzzleError::Internal(format!("placed word {word:?} is missing from the grid")).into(),
        );
      }
      if found.len() <= 1 {
        continue;
      }
      let intended = *word_pos
        .get(word)
        .ok_or_else(|| PuzzleError::Internal(format!("no recorded position for {word:?}")))?;
      let mut all_at_intended = true;
      for &(start, dir) in found {
        // the intended occurrence is identified by start position alone; a
        // duplicate leaving the same cell in another direction is handled by
        // the all_at_intended check below
        if start == intended {
          continue;
        }
        all_at_intended = false;
        let delta = dir.delta();
        let mut repaired = false;
        for i in 0..word.len() {
          let pos = start + delta * i as i32;
          // letters claimed by any placed word must stay
          if dir_map.contains_key(&pos) {
            continue;
          }
          if let Some(cell) = grid.get_mut(pos) {
            *cell = random_letter(rng);
            repaired = true;
            mutated = true;
            break;
          }
        }
        if !repaired {
          // every letter of this occurrence belongs to a placed word
          return Ok(false);
        }
      }
      if all_at_intended {
        // duplicates from a single origin cannot be separated by mutation
        return Ok(false);
      }
    }

    if !mutated {
      return Ok(true);
    }
  }
}
