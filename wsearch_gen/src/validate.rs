/// True if `candidate` is safe to place alongside `used`.
///
/// A candidate is rejected when it (or its reversal) contains or is contained
/// by any already-placed word: a word hidden as a subsequence of another word
/// would show up as an ambiguous second occurrence at verification time.
pub fn validate_word(candidate: &str, used: &[String]) -> bool {
  let rev: String = candidate.chars().rev().collect();
  !used.iter().any(|u| {
    let rev_u: String = u.chars().rev().collect();
    candidate.contains(u.as_str())
      || u.contains(candidate)
      || candidate.contains(rev_u.as_str())
      || u.contains(rev.as_str())
  })
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;

  use super::validate_word;

  fn used(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
  }

  #[gtest]
  fn test_substring_of_used_word_rejected() {
    expect_false!(validate_word("cat", &used(&["cats"])));
  }

  #[gtest]
  fn test_used_word_inside_candidate_rejected() {
    expect_false!(validate_word("scatter", &used(&["cat"])));
  }

  #[gtest]
  fn test_reversal_rejected() {
    expect_false!(validate_word("tac", &used(&["cat"])));
    expect_false!(validate_word("stones", &used(&["enots"])));
  }

  #[gtest]
  fn test_unrelated_word_accepted() {
    expect_true!(validate_word("dog", &used(&["cat"])));
    expect_true!(validate_word("river", &used(&["stone", "cloud"])));
  }

  #[gtest]
  fn test_exact_duplicate_rejected() {
    expect_false!(validate_word("stone", &used(&["stone"])));
  }

  #[gtest]
  fn test_empty_used_accepts_anything() {
    expect_true!(validate_word("stone", &[]));
  }
}
