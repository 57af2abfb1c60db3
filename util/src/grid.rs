use std::fmt::{Debug, Display};

use bitcode::{Decode, Encode};

use crate::{
  error::{PuzzleError, PuzzleResult},
  pos::Pos,
};

#[derive(Clone, PartialEq, Eq, Encode, Decode)]
pub struct Grid<T> {
  grid: Vec<T>,
  width: u32,
  height: u32,
}

impl<T> Grid<T> {
  pub fn from_vec(grid: Vec<T>, width: u32, height: u32) -> PuzzleResult<Self> {
    let expected_size = width as usize * height as usize;
    if grid.len() != expected_size {
      return Err(
        PuzzleError::Internal(format!(
          "Expected grid.len() == expected_size, {} != {expected_size}",
          grid.len()
        ))
        .into(),
      );
    }

    Ok(Self { grid, width, height })
  }

  fn idx(&self, pos: Pos) -> usize {
    debug_assert!(self.in_bounds(pos));
    pos.x as usize + pos.y as usize * self.width as usize
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn in_bounds(&self, pos: Pos) -> bool {
    pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
  }

  pub fn get(&self, pos: Pos) -> Option<&T> {
    self
      .in_bounds(pos)
      .then(|| self.grid.get(self.idx(pos)))
      .flatten()
  }

  pub fn get_mut(&mut self, pos: Pos) -> Option<&mut T> {
    self
      .in_bounds(pos)
      .then(|| {
        let index = self.idx(pos);
        self.grid.get_mut(index)
      })
      .flatten()
  }

  pub fn positions(&self) -> impl Iterator<Item = Pos> {
    let width = self.width;
    (0..self.height as i32).flat_map(move |y| (0..width as i32).map(move |x| Pos { x, y }))
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.grid.iter()
  }

  pub fn map<F, U>(&self, f: F) -> Grid<U>
  where
    F: FnMut(&T) -> U,
  {
    Grid {
      grid: self.grid.iter().map(f).collect(),
      width: self.width,
      height: self.height,
    }
  }
}

impl<T> Grid<T>
where
  T: Default,
{
  pub fn new(width: u32, height: u32) -> Self {
    Self {
      grid: (0..width * height).map(|_| T::default()).collect(),
      width,
      height,
    }
  }
}

impl<T: Debug> Debug for Grid<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    (0..self.height as i32).try_fold((), |_, y| {
      (0..self.width as i32)
        .flat_map(|x| self.get(Pos { x, y }))
        .try_fold((), |_, t| write!(f, "{t:?} "))?;
      writeln!(f)
    })
  }
}

impl<T: Display> Display for Grid<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    (0..self.height as i32).try_fold((), |_, y| {
      (0..self.width as i32)
        .flat_map(|x| self.get(Pos { x, y }))
        .try_fold((), |_, t| write!(f, "{t} "))?;
      writeln!(f)
    })
  }
}
