use crate::error::{ConfigError, GameError, Result};
use crate::{Cell, GameConfig, Position};
use itertools::Itertools;
use log::{debug, warn};
use ndarray::{Array2, Zip};
use rand::Rng;
use std::collections::{HashSet, VecDeque};
use std::iter;

/// Cells opened by a single reveal or chord, in the order they were opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Revealed {
    opened: Vec<Position>,
    mines: Vec<Position>,
}

impl Revealed {
    pub fn opened(&self) -> &[Position] {
        &self.opened
    }

    /// The opened cells that held a mine.
    pub fn mines(&self) -> &[Position] {
        &self.mines
    }

    pub fn is_empty(&self) -> bool {
        self.opened.is_empty()
    }

    pub fn hit_mine(&self) -> bool {
        !self.mines.is_empty()
    }

    pub fn safe_count(&self) -> u32 {
        (self.opened.len() - self.mines.len()) as u32
    }

    fn push(&mut self, pos: Position, has_mine: bool) {
        self.opened.push(pos);
        if has_mine {
            self.mines.push(pos);
        }
    }

    fn append(&mut self, mut other: Revealed) {
        self.opened.append(&mut other.opened);
        self.mines.append(&mut other.mines);
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    cells: Array2<Cell>,
    width: u32,
    height: u32,
    mines_count: u32,
    mines_placed: bool,
}

impl Board {
    /// Creates an empty board; mines are placed later by [`Board::place_mines`].
    pub fn new(width: u32, height: u32, mines_count: u32) -> Result<Self> {
        GameConfig::new(width, height, mines_count).validate()?;

        let cells = Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
            Cell::new(Position::new(x as i32, y as i32))
        });

        Ok(Board {
            cells,
            width,
            height,
            mines_count,
            mines_placed: false,
        })
    }

    /// Creates a board with a fixed mine layout. Duplicate positions count once.
    pub fn from_mine_positions(width: u32, height: u32, mines: &[Position]) -> Result<Self> {
        let mines: HashSet<Position> = mines.iter().copied().collect();
        let mut board = Board::new(width, height, mines.len() as u32)?;

        for &pos in &mines {
            board
                .cell_mut(pos)
                .ok_or(GameError::OutOfBounds(pos))?
                .set_mine();
        }
        board.mines_placed = true;
        board.compute_nearby_mines();
        Ok(board)
    }

    /// A fresh board with the same size and mine budget, mines not yet placed.
    pub fn cleared(&self) -> Board {
        let cells = self.cells.map(|cell| Cell::new(cell.position()));
        Board {
            cells,
            width: self.width,
            height: self.height,
            mines_count: self.mines_count,
            mines_placed: false,
        }
    }

    pub fn is_within_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
    }

    fn index(&self, pos: Position) -> Option<[usize; 2]> {
        self.is_within_bounds(pos)
            .then_some([pos.y as usize, pos.x as usize])
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.index(pos).map(|index| &self.cells[index])
    }

    fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        let index = self.index(pos)?;
        Some(&mut self.cells[index])
    }

    pub fn get_cell(&self, pos: Position) -> Result<&Cell> {
        self.cell(pos).ok_or(GameError::OutOfBounds(pos))
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn iter_positions(&self) -> impl Iterator<Item = Position> {
        (0..self.height as i32)
            .cartesian_product(0..self.width as i32)
            .map(|(y, x)| Position::new(x, y))
    }

    /// In-bounds neighbors of `pos`, in the fixed order of [`Position::neighbors`].
    pub fn neighbor_positions(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors().filter(move |p| self.is_within_bounds(*p))
    }

    pub fn neighbors(&self, pos: Position) -> Vec<&Cell> {
        self.neighbor_positions(pos)
            .filter_map(|p| self.cell(p))
            .collect()
    }

    pub fn count_adjacent_mines(&self, pos: Position) -> u8 {
        self.neighbor_positions(pos)
            .filter(|p| self.cell(*p).is_some_and(Cell::has_mine))
            .count() as u8
    }

    pub fn flagged_neighbors(&self, pos: Position) -> u8 {
        self.neighbor_positions(pos)
            .filter(|p| self.cell(*p).is_some_and(Cell::is_flagged))
            .count() as u8
    }

    pub fn place_mines(&mut self, exclude: Position) -> Result<()> {
        self.place_mines_with_rng(exclude, &mut rand::thread_rng())
    }

    /// Places the mines uniformly among the cells outside `exclude` and its
    /// neighbors, then fills in every cell's nearby-mine count. Runs at most
    /// once per board; later calls leave the layout untouched.
    pub fn place_mines_with_rng<R: Rng + ?Sized>(
        &mut self,
        exclude: Position,
        rng: &mut R,
    ) -> Result<()> {
        if !self.is_within_bounds(exclude) {
            return Err(GameError::OutOfBounds(exclude));
        }
        if self.mines_placed {
            warn!("Mines already placed, ignoring placement around {}", exclude);
            return Ok(());
        }

        let safe_zone: HashSet<Position> = iter::once(exclude)
            .chain(self.neighbor_positions(exclude))
            .collect();
        let eligible: Vec<Position> = self
            .iter_positions()
            .filter(|pos| !safe_zone.contains(pos))
            .collect();

        if self.mines_count as usize > eligible.len() {
            return Err(ConfigError::SafeZoneTooSmall {
                position: exclude,
                mines: self.mines_count,
                eligible: eligible.len() as u32,
            }
            .into());
        }

        for index in rand::seq::index::sample(rng, eligible.len(), self.mines_count as usize) {
            if let Some(cell) = self.cell_mut(eligible[index]) {
                cell.set_mine();
            }
        }
        self.mines_placed = true;
        self.compute_nearby_mines();

        debug!(
            "Placed {} mines on {}x{} board, safe zone of {} cells around {}",
            self.mines_count,
            self.width,
            self.height,
            safe_zone.len(),
            exclude
        );
        Ok(())
    }

    fn compute_nearby_mines(&mut self) {
        let counts = Array2::from_shape_fn(self.cells.dim(), |(y, x)| {
            self.count_adjacent_mines(Position::new(x as i32, y as i32))
        });
        Zip::from(&mut self.cells)
            .and(&counts)
            .for_each(|cell, &count| cell.set_nearby_mines(count));
    }

    /// Opens `pos` and, when it is a safe cell with no mined neighbors, keeps
    /// opening outward through the zero region. Flagged cells are never opened.
    pub fn reveal_cascade(&mut self, pos: Position) -> Revealed {
        let mut revealed = Revealed::default();

        if !self.mines_placed {
            warn!("Reveal at {} requested before mines were placed", pos);
            return revealed;
        }
        if !self.cell(pos).is_some_and(Cell::is_revealable) {
            return revealed;
        }

        let mut visited = HashSet::from([pos]);
        let mut to_visit = VecDeque::from([pos]);

        while let Some(current) = to_visit.pop_front() {
            let Some(cell) = self.cell_mut(current) else {
                continue;
            };
            if !cell.is_revealable() {
                continue;
            }

            cell.open();
            let (has_mine, nearby_mines) = (cell.has_mine(), cell.nearby_mines());
            revealed.push(current, has_mine);

            if has_mine || nearby_mines > 0 {
                continue;
            }

            let next: Vec<Position> = self
                .neighbor_positions(current)
                .filter(|p| self.cell(*p).is_some_and(Cell::is_revealable))
                .filter(|p| visited.insert(*p))
                .collect();
            to_visit.extend(next);
        }

        debug!("Reveal at {} opened {} cells", pos, revealed.opened.len());
        revealed
    }

    /// Flips the flag on a closed cell and returns the new flag state.
    /// Open or off-board cells are left alone.
    pub fn toggle_flag(&mut self, pos: Position) -> Option<bool> {
        let cell = self.cell_mut(pos)?;
        if cell.is_open() {
            return None;
        }
        cell.toggle_flag();
        Some(cell.is_flagged())
    }

    /// Reveals every closed, unflagged neighbor of an open cell, but only when
    /// the number of flagged neighbors equals the cell's mine count.
    pub fn chord_reveal(&mut self, pos: Position) -> Revealed {
        let mut revealed = Revealed::default();

        let Some(cell) = self.cell(pos) else {
            return revealed;
        };
        if !cell.is_open() || self.flagged_neighbors(pos) != cell.nearby_mines() {
            return revealed;
        }

        let targets: Vec<Position> = self
            .neighbor_positions(pos)
            .filter(|p| self.cell(*p).is_some_and(Cell::is_revealable))
            .collect();
        for target in targets {
            revealed.append(self.reveal_cascade(target));
        }
        revealed
    }

    pub fn all_safe_cells_opened(&self) -> bool {
        self.cells().all(|cell| cell.has_mine() || cell.is_open())
    }

    /// Opens every mine that is still closed, clearing any flag on it first.
    /// Returns how many were opened.
    pub fn open_all_mines(&mut self) -> usize {
        self.update_cells(
            |cell| cell.has_mine() && !cell.is_open(),
            |cell| {
                if cell.is_flagged() {
                    cell.toggle_flag();
                }
                cell.open();
            },
        )
    }

    /// Flags every closed mine that is not flagged yet.
    pub fn flag_all_mines(&mut self) -> usize {
        self.update_cells(
            |cell| cell.has_mine() && cell.is_revealable(),
            Cell::toggle_flag,
        )
    }

    /// Opens every closed safe cell, clearing any flag on it first.
    pub fn open_all_safe_cells(&mut self) -> usize {
        self.update_cells(
            |cell| !cell.has_mine() && !cell.is_open(),
            |cell| {
                if cell.is_flagged() {
                    cell.toggle_flag();
                }
                cell.open();
            },
        )
    }

    fn update_cells(
        &mut self,
        select: impl Fn(&Cell) -> bool,
        update: impl Fn(&mut Cell),
    ) -> usize {
        let mut changed = 0;
        for cell in self.cells.iter_mut().filter(|cell| select(cell)) {
            update(cell);
            changed += 1;
        }
        changed
    }

    pub fn flagged_count(&self) -> u32 {
        self.cells().filter(|cell| cell.is_flagged()).count() as u32
    }

    pub fn opened_count(&self) -> u32 {
        self.cells().filter(|cell| cell.is_open()).count() as u32
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mines_count(&self) -> u32 {
        self.mines_count
    }

    pub fn safe_cells_count(&self) -> u32 {
        // `new` rejects boards whose cell count overflows a u32
        self.width * self.height - self.mines_count
    }
}
