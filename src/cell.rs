use crate::Position;

/// One grid square. Only `Board` mutates cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    position: Position,
    is_open: bool,
    is_flagged: bool,
    has_mine: bool,
    nearby_mines: u8,
}

impl Cell {
    pub(crate) fn new(position: Position) -> Self {
        Self {
            position,
            is_open: false,
            is_flagged: false,
            has_mine: false,
            nearby_mines: 0,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_flagged(&self) -> bool {
        self.is_flagged
    }

    pub fn has_mine(&self) -> bool {
        self.has_mine
    }

    /// Mined neighbors, never counting the cell itself. Zero until mines are placed.
    pub fn nearby_mines(&self) -> u8 {
        self.nearby_mines
    }

    /// Closed and not flagged.
    pub fn is_revealable(&self) -> bool {
        !self.is_open && !self.is_flagged
    }

    pub(crate) fn open(&mut self) {
        self.is_open = true;
    }

    pub(crate) fn toggle_flag(&mut self) {
        self.is_flagged = !self.is_flagged;
    }

    pub(crate) fn set_mine(&mut self) {
        self.has_mine = true;
    }

    pub(crate) fn set_nearby_mines(&mut self, count: u8) {
        self.nearby_mines = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cell_is_blank() {
        let cell = Cell::new(Position::new(2, 3));
        assert_eq!(cell.position(), Position::new(2, 3));
        assert!(!cell.is_open());
        assert!(!cell.is_flagged());
        assert!(!cell.has_mine());
        assert_eq!(cell.nearby_mines(), 0);
        assert!(cell.is_revealable());
    }

    #[test]
    fn test_flag_blocks_reveal() {
        let mut cell = Cell::new(Position::new(0, 0));
        cell.toggle_flag();
        assert!(cell.is_flagged());
        assert!(!cell.is_revealable());
        cell.toggle_flag();
        assert!(cell.is_revealable());
    }
}
