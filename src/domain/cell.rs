/// Cell kinds and their properties.
/// Properties are queried via methods, not stored as flags,
/// so cell semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CellKind {
    #[default]
    Empty,
    Wall,
    Player,
    Enemy,
    Star,
    Exit, // Appears when all stars collected
}

impl CellKind {
    /// Can the player step here? (Enemies use `ai::PathRules` instead.)
    pub fn is_walkable(self) -> bool {
        !matches!(self, CellKind::Wall)
    }

    /// Free for placement (walls, stars, exit, spawns).
    pub fn is_empty(self) -> bool {
        matches!(self, CellKind::Empty)
    }

    /// ASCII glyph used by test diagrams.
    #[cfg(test)]
    pub fn glyph(self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::Wall => '#',
            CellKind::Player => 'P',
            CellKind::Enemy => 'E',
            CellKind::Star => '*',
            CellKind::Exit => 'X',
        }
    }

    #[cfg(test)]
    pub fn from_glyph(ch: char) -> Option<CellKind> {
        match ch {
            '.' | ' ' => Some(CellKind::Empty),
            '#' => Some(CellKind::Wall),
            'P' => Some(CellKind::Player),
            'E' => Some(CellKind::Enemy),
            '*' => Some(CellKind::Star),
            'X' => Some(CellKind::Exit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_walls_block_the_player() {
        assert!(!CellKind::Wall.is_walkable());
        for kind in [CellKind::Empty, CellKind::Star, CellKind::Exit, CellKind::Enemy] {
            assert!(kind.is_walkable(), "{kind:?}");
        }
    }

    #[test]
    fn glyphs_map_back() {
        for kind in [
            CellKind::Empty, CellKind::Wall, CellKind::Player,
            CellKind::Enemy, CellKind::Star, CellKind::Exit,
        ] {
            assert_eq!(CellKind::from_glyph(kind.glyph()), Some(kind));
        }
        assert_eq!(CellKind::from_glyph('?'), None);
    }
}
