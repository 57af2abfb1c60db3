use core::fmt;
use std::{
  error::Error,
  fmt::{Display, Formatter},
};

#[derive(Debug)]
pub enum PuzzleError {
  Internal(String),
  Parse(String),
  Exhausted(String),
}

impl Display for PuzzleError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    match self {
      PuzzleError::Internal(msg) => write!(f, "Internal error: {msg}"),
      PuzzleError::Parse(msg) => write!(f, "Parse error: {msg}"),
      PuzzleError::Exhausted(msg) => write!(f, "Generation exhausted: {msg}"),
    }
  }
}

impl Error for PuzzleError {}

pub type PuzzleResult<T = ()> = Result<T, Box<dyn Error>>;
