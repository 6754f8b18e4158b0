/// Entities: positions and movement intents.
/// Player and enemies are plain positions; the grid mirrors them as cell kinds.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }

    #[cfg(test)]
    pub fn manhattan(self, other: Pos) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Offset by (dx, dy). None if the result would be negative;
    /// the upper bound is the grid's business.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Pos> {
        let nx = self.x as i64 + dx as i64;
        let ny = self.y as i64 + dy as i64;
        if nx < 0 || ny < 0 {
            return None;
        }
        Some(Pos::new(nx as usize, ny as usize))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Player move intent (one cell per input event).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveDir {
    Up,
    Down,
    Left,
    Right,
}

impl MoveDir {
    pub fn delta(self) -> (i32, i32) {
        match self {
            MoveDir::Up => (0, -1),
            MoveDir::Down => (0, 1),
            MoveDir::Left => (-1, 0),
            MoveDir::Right => (1, 0),
        }
    }
}
