use util::pos::{Diff, Pos};

/// The eight compass directions a word may run in. `x` grows east, `y` grows
/// south.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Dir {
  N,
  NE,
  E,
  SE,
  S,
  SW,
  W,
  NW,
}

impl Dir {
  pub const ALL: [Dir; 8] = [
    Dir::N,
    Dir::NE,
    Dir::E,
    Dir::SE,
    Dir::S,
    Dir::SW,
    Dir::W,
    Dir::NW,
  ];

  pub const fn delta(self) -> Diff {
    match self {
      Dir::N => Diff { x: 0, y: -1 },
      Dir::NE => Diff { x: 1, y: -1 },
      Dir::E => Diff { x: 1, y: 0 },
      Dir::SE => Diff { x: 1, y: 1 },
      Dir::S => Diff { x: 0, y: 1 },
      Dir::SW => Diff { x: -1, y: 1 },
      Dir::W => Diff { x: -1, y: 0 },
      Dir::NW => Diff { x: -1, y: -1 },
    }
  }

  pub const fn from_delta(delta: Diff) -> Option<Dir> {
    match (delta.x, delta.y) {
      (0, -1) => Some(Dir::N),
      (1, -1) => Some(Dir::NE),
      (1, 0) => Some(Dir::E),
      (1, 1) => Some(Dir::SE),
      (0, 1) => Some(Dir::S),
      (-1, 1) => Some(Dir::SW),
      (-1, 0) => Some(Dir::W),
      (-1, -1) => Some(Dir::NW),
      _ => None,
    }
  }

  pub const fn opposite(self) -> Dir {
    match self {
      Dir::N => Dir::S,
      Dir::NE => Dir::SW,
      Dir::E => Dir::W,
      Dir::SE => Dir::NW,
      Dir::S => Dir::N,
      Dir::SW => Dir::NE,
      Dir::W => Dir::E,
      Dir::NW => Dir::SE,
    }
  }

  /// True if `other` runs along the same axis, in either orientation.
  pub fn same_axis(self, other: Dir) -> bool {
    self == other || self.opposite() == other
  }
}

/// Number of cells available starting at `pos` (inclusive) before a walk
/// along `delta` leaves an n-by-n grid. Each axis bounds the walk
/// independently; a zero component places no bound.
pub fn max_steps(pos: Pos, n: u32, delta: Diff) -> usize {
  let n = n as i32;
  let mx = match delta.x {
    x if x > 0 => n - pos.x,
    x if x < 0 => pos.x + 1,
    _ => i32::MAX,
  };
  let my = match delta.y {
    y if y > 0 => n - pos.y,
    y if y < 0 => pos.y + 1,
    _ => i32::MAX,
  };
  mx.min(my).max(0) as usize
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

  use googletest::prelude::*;
  use util::pos::{Diff, Pos};

  use super::{max_steps, Dir};

  #[gtest]
  fn test_delta_round_trips() {
    for dir in Dir::ALL {
      expect_that!(Dir::from_delta(dir.delta()), some(eq(dir)));
    }
  }

  #[gtest]
  fn test_non_unit_vector_has_no_direction() {
    expect_that!(Dir::from_delta(Diff { x: 2, y: 0 }), none());
    expect_that!(Dir::from_delta(Diff { x: 0, y: 0 }), none());
  }

  #[gtest]
  fn test_opposite_is_an_involution() {
    for dir in Dir::ALL {
      expect_eq!(dir.opposite().opposite(), dir);
      expect_eq!(dir.opposite().delta(), -dir.delta());
    }
  }

  #[gtest]
  fn test_same_axis() {
    expect_true!(Dir::NE.same_axis(Dir::SW));
    expect_true!(Dir::E.same_axis(Dir::E));
    expect_false!(Dir::N.same_axis(Dir::E));
  }

  #[gtest]
  fn test_max_steps() {
    let pos = Pos { x: 2, y: 3 };
    expect_eq!(max_steps(pos, 10, Dir::E.delta()), 8);
    expect_eq!(max_steps(pos, 10, Dir::W.delta()), 3);
    expect_eq!(max_steps(pos, 10, Dir::N.delta()), 4);
    expect_eq!(max_steps(pos, 10, Dir::S.delta()), 7);
    // diagonals take the tighter axis
    expect_eq!(max_steps(pos, 10, Dir::NW.delta()), 3);
    expect_eq!(max_steps(pos, 10, Dir::SE.delta()), 7);
  }
}
