pub mod dirs;
pub mod puzzle;
pub mod trie;
pub mod validate;
pub mod verify;

pub use puzzle::{Generator, Puzzle};
