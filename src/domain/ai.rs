/// Enemy AI: breadth-first shortest path toward the player.
///
/// The grid is an implicit unweighted graph over the 4-neighbourhood.
/// Neighbours are enumerated in the fixed order +x, -x, +y, -y, which
/// decides which of several equally short paths is returned.
///
/// Traversable = in bounds, not a wall, and not the exit when
/// `PathRules::exit_blocks` is set. Enemy cells never block: enemies
/// may stack.

use std::collections::VecDeque;

use super::cell::CellKind;
use super::entity::Pos;
use super::grid::Grid;

const DIRS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PathRules {
    /// Enemies may neither stand on nor path through the exit.
    pub exit_blocks: bool,
}

impl Default for PathRules {
    fn default() -> Self {
        PathRules { exit_blocks: true }
    }
}

impl PathRules {
    fn passable(&self, kind: CellKind) -> bool {
        match kind {
            CellKind::Wall => false,
            CellKind::Exit => !self.exit_blocks,
            _ => true,
        }
    }
}

/// Shortest path from `start` to `goal`, excluding `start`, including `goal`.
/// Empty when `start == goal` or the goal is unreachable.
pub fn shortest_path(grid: &Grid, start: Pos, goal: Pos, rules: PathRules) -> Vec<Pos> {
    if start == goal || !grid.contains(start) || !grid.contains(goal) {
        return vec![];
    }

    let w = grid.width();
    let idx = |p: Pos| p.y * w + p.x;

    let mut visited = vec![false; w * grid.height()];
    let mut came_from: Vec<Option<Pos>> = vec![None; w * grid.height()];
    let mut queue: VecDeque<Pos> = VecDeque::with_capacity(64);

    visited[idx(start)] = true;
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        if current == goal {
            break;
        }
        for &(dx, dy) in &DIRS {
            let Some(next) = grid.step(current, dx, dy) else { continue };
            if visited[idx(next)] || !rules.passable(grid.kind_at(next)) {
                continue;
            }
            visited[idx(next)] = true;
            came_from[idx(next)] = Some(current);
            queue.push_back(next);
        }
    }

    if !visited[idx(goal)] {
        return vec![];
    }

    let mut path = vec![goal];
    let mut cur = goal;
    while let Some(prev) = came_from[idx(cur)] {
        if prev == start {
            break;
        }
        path.push(prev);
        cur = prev;
    }
    path.reverse();
    path
}

/// Graph distance in steps; `None` when unreachable.
#[cfg(test)]
pub fn distance(grid: &Grid, start: Pos, goal: Pos, rules: PathRules) -> Option<usize> {
    if start == goal {
        return Some(0);
    }
    match shortest_path(grid, start, goal, rules).len() {
        0 => None,
        n => Some(n),
    }
}

/// First step an enemy at `from` should take toward `target`, if any.
pub fn next_step(grid: &Grid, from: Pos, target: Pos, rules: PathRules) -> Option<Pos> {
    shortest_path(grid, from, target, rules).first().copied()
}
