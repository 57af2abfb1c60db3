use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
  /// Grid side length.
  #[arg(long, default_value_t = 15)]
  pub size: u32,

  /// Seed for reproducible generation; a random seed is used when omitted.
  #[arg(long)]
  pub seed: Option<u64>,

  /// Word-list file (one word per line); the built-in list is used when
  /// omitted.
  #[arg(long)]
  pub dict: Option<PathBuf>,

  /// Number of puzzles to generate from the loaded dictionary.
  #[arg(long, default_value_t = 1)]
  pub count: u32,

  /// Write the generated puzzles, bitcode-encoded, to this file.
  #[arg(long)]
  pub save: Option<PathBuf>,

  /// Suppress the grid and stats printout.
  #[arg(long)]
  pub quiet: bool,
}
