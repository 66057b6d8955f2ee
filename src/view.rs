use crate::{Cell, Game, Outcome, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a player can see of a cell. Mine locations stay hidden until opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Open(u8),
    Mine,
}

impl From<&Cell> for CellView {
    fn from(cell: &Cell) -> Self {
        match (cell.is_open(), cell.is_flagged(), cell.has_mine()) {
            (true, _, true) => CellView::Mine,
            (true, _, false) => CellView::Open(cell.nearby_mines()),
            (false, true, _) => CellView::Flagged,
            (false, false, _) => CellView::Hidden,
        }
    }
}

/// A read-only copy of everything a frontend needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u32,
    pub height: u32,
    pub outcome: Outcome,
    pub remaining_flag_budget: i64,
    pub opened_safe_count: u32,
    pub total_safe_count: u32,
    /// Row-major.
    pub cells: Vec<CellView>,
}

impl BoardSnapshot {
    pub fn get(&self, pos: Position) -> Option<CellView> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width as i32 || pos.y >= self.height as i32 {
            return None;
        }
        self.cells
            .get(pos.y as usize * self.width as usize + pos.x as usize)
            .copied()
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Column numbers
        write!(f, "   ")?;
        for x in 0..self.width {
            write!(f, "{:>2}", x)?;
        }
        writeln!(f)?;
        if self.width == 0 {
            return Ok(());
        }

        for (y, row) in self.cells.chunks(self.width as usize).enumerate() {
            write!(f, "{:>2} ", y)?;
            for cell in row {
                match cell {
                    CellView::Hidden => write!(f, " □")?,
                    CellView::Flagged => write!(f, " ⚑")?,
                    CellView::Open(0) => write!(f, "  ")?,
                    CellView::Open(n) => write!(f, " {}", n)?,
                    CellView::Mine => write!(f, " *")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Game {
    pub fn snapshot(&self) -> BoardSnapshot {
        let (width, height) = self.dimensions();
        BoardSnapshot {
            width,
            height,
            outcome: self.outcome(),
            remaining_flag_budget: self.remaining_flag_budget(),
            opened_safe_count: self.opened_safe_count(),
            total_safe_count: self.total_safe_count(),
            cells: self.board().cells().map(CellView::from).collect(),
        }
    }

    pub fn cell_view(&self, pos: Position) -> Option<CellView> {
        self.cell(pos).map(CellView::from)
    }
}
