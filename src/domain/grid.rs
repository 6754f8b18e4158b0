/// Grid model and random placement.
///
/// The grid is a `height x width` field of `CellKind`, fixed for the
/// lifetime of a level. All mutation goes through `set()`.
///
/// ## Placement
///
/// Walls, stars, the exit and enemy spawns are drawn uniformly from the
/// list of candidate cells without replacement (`SliceRandom::choose_multiple`).
/// This always terminates: if there are fewer candidates than requested the
/// call fails with `PlacementError::GridTooDense` and the grid is untouched.
/// With a seeded RNG the result is reproducible.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use super::cell::CellKind;
use super::entity::Pos;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("grid too dense to place {what}: wanted {wanted}, only {available} free cells")]
    GridTooDense {
        what: &'static str,
        wanted: usize,
        available: usize,
    },
    #[error("no level {0} in the level table")]
    UnknownLevel(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<CellKind>>,
}

impl Grid {
    /// A `width x height` grid with every cell empty.
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![vec![CellKind::Empty; width]; height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Out of bounds reads as a wall.
    #[inline]
    pub fn kind_at(&self, pos: Pos) -> CellKind {
        if self.contains(pos) {
            self.cells[pos.y][pos.x]
        } else {
            CellKind::Wall
        }
    }

    #[inline]
    pub fn set(&mut self, pos: Pos, kind: CellKind) {
        if self.contains(pos) {
            self.cells[pos.y][pos.x] = kind;
        }
    }

    /// Neighbour of `pos` by (dx, dy), if it is inside the grid.
    pub fn step(&self, pos: Pos, dx: i32, dy: i32) -> Option<Pos> {
        pos.offset(dx, dy).filter(|p| self.contains(*p))
    }

    /// Row-major iterator over every position.
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Pos::new(x, y)))
    }

    #[cfg(test)]
    pub fn positions_of(&self, kind: CellKind) -> Vec<Pos> {
        self.positions().filter(|p| self.kind_at(*p) == kind).collect()
    }

    #[cfg(test)]
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().flatten().filter(|k| **k == kind).count()
    }

    pub fn rows(&self) -> &[Vec<CellKind>] {
        &self.cells
    }

    /// Build from an ASCII diagram (see `CellKind::from_glyph`).
    /// Unknown glyphs read as empty.
    #[cfg(test)]
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut grid = Grid::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                grid.cells[y][x] = CellKind::from_glyph(ch).unwrap_or_default();
            }
        }
        grid
    }

    /// Inverse of `from_rows`.
    #[cfg(test)]
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|k| k.glyph()).collect())
            .collect()
    }
}

// ── Placement ──

/// Pick `count` distinct empty cells not in `exclude`. Does not mark them.
pub fn pick_empty<R: Rng + ?Sized>(
    grid: &Grid,
    count: usize,
    exclude: &HashSet<Pos>,
    what: &'static str,
    rng: &mut R,
) -> Result<Vec<Pos>, PlacementError> {
    if count == 0 {
        return Ok(vec![]);
    }
    let candidates: Vec<Pos> = grid
        .positions()
        .filter(|p| grid.kind_at(*p).is_empty() && !exclude.contains(p))
        .collect();
    if candidates.len() < count {
        return Err(PlacementError::GridTooDense {
            what,
            wanted: count,
            available: candidates.len(),
        });
    }
    Ok(candidates.choose_multiple(rng, count).copied().collect())
}

fn mark<R: Rng + ?Sized>(
    grid: &mut Grid,
    count: usize,
    exclude: &HashSet<Pos>,
    kind: CellKind,
    what: &'static str,
    rng: &mut R,
) -> Result<Vec<Pos>, PlacementError> {
    let picked = pick_empty(grid, count, exclude, what, rng)?;
    for &p in &picked {
        grid.set(p, kind);
    }
    Ok(picked)
}

/// Mark `count` random empty cells outside `forbidden` as walls.
pub fn place_walls<R: Rng + ?Sized>(
    grid: &mut Grid,
    count: usize,
    forbidden: &HashSet<Pos>,
    rng: &mut R,
) -> Result<Vec<Pos>, PlacementError> {
    mark(grid, count, forbidden, CellKind::Wall, "walls", rng)
}

/// Mark the player cell and every enemy cell.
pub fn place_entities(grid: &mut Grid, player: Pos, enemies: &[Pos]) {
    grid.set(player, CellKind::Player);
    for &e in enemies {
        grid.set(e, CellKind::Enemy);
    }
}

/// Mark `count` distinct empty cells as stars and return them.
pub fn place_items<R: Rng + ?Sized>(
    grid: &mut Grid,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Pos>, PlacementError> {
    mark(grid, count, &HashSet::new(), CellKind::Star, "stars", rng)
}

/// Mark one random empty cell as the exit.
pub fn place_exit<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) -> Result<Pos, PlacementError> {
    let picked = mark(grid, 1, &HashSet::new(), CellKind::Exit, "exit", rng)?;
    Ok(picked[0])
}
