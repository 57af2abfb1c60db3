#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod args;

use std::{fs::File, io::Write};

use clap::Parser;
use itertools::Itertools;
use rand::{rngs::StdRng, Rng, SeedableRng};
use util::{bitcode, error::PuzzleResult, time::time_fn};
use wsearch_dict::Dictionary;
use wsearch_gen::{Generator, Puzzle};

use crate::args::Args;

fn print_stats(puzzle: &Puzzle, size: u32, millis: f64) {
  let cells = size as f64 * size as f64;
  println!("Expected spaces used: {}", 0.85 * cells);
  println!(
    "Actual spaces used: {}",
    (puzzle.coverage_ratio * cells).round() as u64
  );
  println!("Performance ratio: {:.1}%", 100.0 * puzzle.coverage_ratio);
  println!("Words used: {}", puzzle.used_words.len());
  println!("Rebuilds: {}", puzzle.fails);
  println!("Took {millis:.1}ms");
  println!();
  println!("{}", puzzle.grid);
  println!("{}", puzzle.used_words.iter().join(", "));
}

fn run<R: Rng>(mut rng: R, args: &Args) -> PuzzleResult {
  let dict = match &args.dict {
    Some(path) => Dictionary::from_file(path)?,
    None => Dictionary::builtin(),
  };
  let generator = Generator::new(dict.words());

  let mut puzzles = Vec::new();
  for _ in 0..args.count {
    let (elapsed, puzzle) = time_fn(|| generator.generate(args.size, &mut rng));
    let puzzle = puzzle?;
    if !args.quiet {
      print_stats(&puzzle, args.size, elapsed.as_secs_f64() * 1e3);
    }
    puzzles.push(puzzle);
  }

  if let Some(path) = &args.save {
    let encoded = bitcode::encode(&puzzles);
    let mut file = File::create(path)?;
    file.write_all(&encoded)?;
  }

  Ok(())
}

fn main() -> PuzzleResult {
  let args = Args::parse();
  match args.seed {
    Some(seed) => run(StdRng::seed_from_u64(seed), &args),
    None => run(rand::rng(), &args),
  }
}
