use crate::error::Result;
use crate::{Board, Cell, GameConfig, Position, Revealed};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

impl Outcome {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reveal,
    ToggleFlag,
    Chord,
    /// Toggle the flag on a closed cell, chord an open one.
    Mark,
}

/// One playthrough over a single board. Mines are placed on the first
/// reveal so that the first opened cell and its neighbors are always safe.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    board: Board,
    rng: StdRng,
    has_placed_mines: bool,
    opened_safe_count: u32,
    total_safe_count: u32,
    remaining_flag_budget: i64,
    outcome: Outcome,
}

impl Game {
    pub fn new(width: u32, height: u32, mines_count: u32) -> Result<Self> {
        Self::with_config(GameConfig::new(width, height, mines_count))
    }

    pub fn with_config(config: GameConfig) -> Result<Self> {
        let board = Board::new(config.width, config.height, config.mines)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self::from_parts(config, board, rng))
    }

    /// Starts a game on a fixed mine layout. Mines count as already placed;
    /// a later [`Game::reset`] switches to random placement.
    pub fn with_mines(width: u32, height: u32, mines: &[Position]) -> Result<Self> {
        let board = Board::from_mine_positions(width, height, mines)?;
        let config = GameConfig::new(width, height, board.mines_count());
        Ok(Self::from_parts(config, board, StdRng::from_entropy()))
    }

    fn from_parts(config: GameConfig, board: Board, rng: StdRng) -> Self {
        Self {
            config,
            has_placed_mines: board.mines_placed(),
            total_safe_count: board.safe_cells_count(),
            remaining_flag_budget: i64::from(board.mines_count()),
            opened_safe_count: 0,
            outcome: Outcome::InProgress,
            board,
            rng,
        }
    }

    pub fn perform_action(&mut self, pos: Position, action: Action) -> Result<Outcome> {
        trace!("{:?} at {}", action, pos);

        match action {
            Action::Reveal => {
                self.handle_reveal(pos)?;
            }
            Action::ToggleFlag => {
                self.handle_flag_toggle(pos);
            }
            Action::Chord => {
                self.handle_chord_reveal(pos);
            }
            Action::Mark => match self.board.cell(pos).map(Cell::is_open) {
                Some(true) => {
                    self.handle_chord_reveal(pos);
                }
                Some(false) => {
                    self.handle_flag_toggle(pos);
                }
                None => {}
            },
        }
        Ok(self.outcome)
    }

    /// Opens `pos`, cascading through empty regions. The first on-board
    /// reveal of a game places the mines around `pos`, even when the cell is
    /// flagged and stays closed; placement is the only step that can fail.
    pub fn handle_reveal(&mut self, pos: Position) -> Result<Revealed> {
        if self.outcome.is_finished() || !self.board.is_within_bounds(pos) {
            return Ok(Revealed::default());
        }

        if !self.has_placed_mines {
            self.board.place_mines_with_rng(pos, &mut self.rng)?;
            self.has_placed_mines = true;
        }

        let revealed = self.board.reveal_cascade(pos);
        self.record(&revealed);
        Ok(revealed)
    }

    /// Toggles a flag and returns the new flag state, or `None` when nothing changed.
    pub fn handle_flag_toggle(&mut self, pos: Position) -> Option<bool> {
        if self.outcome.is_finished() {
            return None;
        }

        let flagged = self.board.toggle_flag(pos)?;
        self.remaining_flag_budget += if flagged { -1 } else { 1 };
        Some(flagged)
    }

    pub fn handle_chord_reveal(&mut self, pos: Position) -> Revealed {
        if self.outcome.is_finished() || !self.board.cell(pos).is_some_and(Cell::is_open) {
            return Revealed::default();
        }

        let revealed = self.board.chord_reveal(pos);
        self.record(&revealed);
        revealed
    }

    /// Throws the board away and starts over with the same size and mine count.
    pub fn reset(&mut self) {
        let board = self.board.cleared();
        *self = Self::from_parts(self.config, board, self.rng.clone());
        debug!(
            "New {}x{} game with {} mines",
            self.config.width, self.config.height, self.config.mines
        );
    }

    fn record(&mut self, revealed: &Revealed) {
        self.opened_safe_count += revealed.safe_count();

        if revealed.hit_mine() {
            self.finish(Outcome::Lost);
        } else if self.opened_safe_count == self.total_safe_count {
            self.finish(Outcome::Won);
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        if self.outcome.is_finished() {
            return;
        }
        self.outcome = outcome;
        debug!(
            "Game {:?} with {}/{} safe cells opened",
            outcome, self.opened_safe_count, self.total_safe_count
        );

        if !self.config.reveal_on_finish {
            return;
        }
        match outcome {
            Outcome::Won => {
                self.board.open_all_safe_cells();
                let flagged = self.board.flag_all_mines();
                self.remaining_flag_budget -= flagged as i64;
            }
            Outcome::Lost => {
                self.board.open_all_mines();
            }
            Outcome::InProgress => {}
        }
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_finished()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.board.cell(pos)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.board.dimensions()
    }

    pub fn has_placed_mines(&self) -> bool {
        self.has_placed_mines
    }

    pub fn opened_safe_count(&self) -> u32 {
        self.opened_safe_count
    }

    pub fn total_safe_count(&self) -> u32 {
        self.total_safe_count
    }

    /// Mines minus flags placed. Goes negative when more flags than mines are down.
    pub fn remaining_flag_budget(&self) -> i64 {
        self.remaining_flag_budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, GameError};

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_new_game_state() {
        let game = Game::new(9, 9, 10).unwrap();
        assert_eq!(game.outcome(), Outcome::InProgress);
        assert!(!game.has_placed_mines());
        assert_eq!(game.opened_safe_count(), 0);
        assert_eq!(game.total_safe_count(), 71);
        assert_eq!(game.remaining_flag_budget(), 10);
        assert_eq!(game.dimensions(), (9, 9));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Game::new(2, 2, 4),
            Err(GameError::InvalidConfiguration(ConfigError::TooManyMines { .. }))
        ));
    }

    #[test]
    fn test_first_reveal_places_mines_around_click() {
        let mut game = Game::with_config(GameConfig::new(10, 10, 10).with_seed(3)).unwrap();
        let revealed = game.handle_reveal(pos(5, 5)).unwrap();

        assert!(game.has_placed_mines());
        assert!(!revealed.hit_mine());
        assert_eq!(game.cell(pos(5, 5)).unwrap().nearby_mines(), 0);
        assert_eq!(game.opened_safe_count(), revealed.safe_count());
        assert_eq!(game.board().cells().filter(|c| c.has_mine()).count(), 10);
    }

    #[test]
    fn test_first_reveal_with_no_room_for_safe_zone_fails() {
        let mut game = Game::new(3, 3, 1).unwrap();
        assert!(matches!(
            game.handle_reveal(pos(1, 1)),
            Err(GameError::InvalidConfiguration(
                ConfigError::SafeZoneTooSmall { .. }
            ))
        ));
        assert!(!game.has_placed_mines());
        assert_eq!(game.outcome(), Outcome::InProgress);
    }

    #[test]
    fn test_off_board_commands_are_ignored() {
        let mut game = Game::new(4, 4, 2).unwrap();
        assert!(game.handle_reveal(pos(4, 0)).unwrap().is_empty());
        assert_eq!(game.handle_flag_toggle(pos(-1, 0)), None);
        assert!(game.handle_chord_reveal(pos(0, 9)).is_empty());
        assert!(!game.has_placed_mines());
    }

    #[test]
    fn test_flag_budget_tracks_flags_not_mines() {
        let mut game = Game::with_mines(3, 3, &[pos(0, 0)]).unwrap();
        assert_eq!(game.handle_flag_toggle(pos(2, 2)), Some(true));
        assert_eq!(game.handle_flag_toggle(pos(1, 2)), Some(true));
        assert_eq!(game.remaining_flag_budget(), -1);
        assert_eq!(game.handle_flag_toggle(pos(2, 2)), Some(false));
        assert_eq!(game.remaining_flag_budget(), 0);
    }

    #[test]
    fn test_loss_opens_remaining_mines() {
        let mines = [pos(0, 0), pos(2, 2)];
        let mut game = Game::with_mines(3, 3, &mines).unwrap();

        let revealed = game.handle_reveal(pos(0, 0)).unwrap();

        assert!(revealed.hit_mine());
        assert_eq!(game.outcome(), Outcome::Lost);
        assert!(game.cell(pos(2, 2)).unwrap().is_open());
        assert_eq!(game.opened_safe_count(), 0);
    }

    #[test]
    fn test_first_reveal_on_flagged_cell_still_places_mines() {
        let mut game = Game::with_config(GameConfig::new(5, 5, 3).with_seed(8)).unwrap();
        game.handle_flag_toggle(pos(2, 2));

        let revealed = game.handle_reveal(pos(2, 2)).unwrap();

        assert!(revealed.is_empty());
        assert!(game.has_placed_mines());
        assert!(game.cell(pos(2, 2)).unwrap().is_flagged());
        assert!(game.board().neighbors(pos(2, 2)).iter().all(|c| !c.has_mine()));
        assert_eq!(game.board().cells().filter(|c| c.has_mine()).count(), 3);
        assert_eq!(game.outcome(), Outcome::InProgress);
    }

    #[test]
    fn test_loss_opens_flagged_mines_too() {
        let mines = [pos(0, 0), pos(2, 2)];
        let mut game = Game::with_mines(3, 3, &mines).unwrap();
        game.handle_flag_toggle(pos(2, 2));

        game.handle_reveal(pos(0, 0)).unwrap();

        let flagged_mine = game.cell(pos(2, 2)).unwrap();
        assert!(flagged_mine.is_open() && !flagged_mine.is_flagged());
    }

    #[test]
    fn test_loss_without_reveal_on_finish() {
        let mines = [pos(0, 0), pos(2, 2)];
        let mut game = Game::with_mines(3, 3, &mines).unwrap();
        game.config.reveal_on_finish = false;

        game.handle_reveal(pos(0, 0)).unwrap();

        assert_eq!(game.outcome(), Outcome::Lost);
        assert!(!game.cell(pos(2, 2)).unwrap().is_open());
    }

    #[test]
    fn test_win_flags_all_mines() {
        let mut game = Game::with_mines(3, 1, &[pos(0, 0)]).unwrap();
        game.handle_reveal(pos(2, 0)).unwrap();

        assert_eq!(game.outcome(), Outcome::Won);
        assert!(game.cell(pos(0, 0)).unwrap().is_flagged());
        assert_eq!(game.remaining_flag_budget(), 0);
    }

    #[test]
    fn test_commands_after_finish_are_ignored() {
        let mut game = Game::with_mines(3, 3, &[pos(0, 0)]).unwrap();
        game.handle_reveal(pos(0, 0)).unwrap();
        assert_eq!(game.outcome(), Outcome::Lost);

        assert!(game.handle_reveal(pos(2, 2)).unwrap().is_empty());
        assert_eq!(game.handle_flag_toggle(pos(2, 2)), None);
        assert!(!game.cell(pos(2, 2)).unwrap().is_open());
        assert_eq!(game.outcome(), Outcome::Lost);
    }

    #[test]
    fn test_chord_accounting_can_win() {
        let mut game = Game::with_mines(3, 3, &[pos(0, 1), pos(2, 1)]).unwrap();
        game.handle_reveal(pos(1, 1)).unwrap();
        game.handle_flag_toggle(pos(0, 1));
        game.handle_flag_toggle(pos(2, 1));

        let revealed = game.handle_chord_reveal(pos(1, 1));

        assert_eq!(revealed.safe_count(), 6);
        assert_eq!(game.opened_safe_count(), 7);
        assert_eq!(game.outcome(), Outcome::Won);
    }

    #[test]
    fn test_chord_on_closed_cell_is_ignored() {
        let mut game = Game::with_mines(3, 3, &[pos(0, 0)]).unwrap();
        assert!(game.handle_chord_reveal(pos(1, 1)).is_empty());
        assert_eq!(game.opened_safe_count(), 0);
    }

    #[test]
    fn test_mark_flags_closed_and_chords_open() {
        let mut game = Game::with_mines(3, 3, &[pos(0, 1), pos(2, 1)]).unwrap();
        game.perform_action(pos(1, 1), Action::Reveal).unwrap();
        game.perform_action(pos(0, 1), Action::Mark).unwrap();
        assert!(game.cell(pos(0, 1)).unwrap().is_flagged());
        game.perform_action(pos(2, 1), Action::Mark).unwrap();

        let outcome = game.perform_action(pos(1, 1), Action::Mark).unwrap();
        assert_eq!(outcome, Outcome::Won);
    }

    #[test]
    fn test_reset_starts_fresh_game() {
        let mut game = Game::with_config(GameConfig::new(8, 8, 10).with_seed(11)).unwrap();
        game.handle_reveal(pos(0, 0)).unwrap();
        game.handle_flag_toggle(pos(7, 7));

        game.reset();

        assert_eq!(game.outcome(), Outcome::InProgress);
        assert!(!game.has_placed_mines());
        assert_eq!(game.opened_safe_count(), 0);
        assert_eq!(game.remaining_flag_budget(), 10);
        assert_eq!(game.total_safe_count(), 54);
        assert!(game.board().cells().all(|c| c.is_revealable() && !c.has_mine()));
    }

    #[test]
    fn test_reset_after_loss() {
        let mut game = Game::with_mines(4, 4, &[pos(0, 0)]).unwrap();
        game.handle_reveal(pos(0, 0)).unwrap();
        assert_eq!(game.outcome(), Outcome::Lost);

        game.reset();
        assert_eq!(game.outcome(), Outcome::InProgress);
        let revealed = game.handle_reveal(pos(3, 3)).unwrap();
        assert!(!revealed.hit_mine());
        assert!(game.has_placed_mines());
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let layout = |seed| {
            let mut game = Game::with_config(GameConfig::new(16, 16, 40).with_seed(seed)).unwrap();
            game.handle_reveal(pos(8, 8)).unwrap();
            game.board()
                .cells()
                .map(Cell::has_mine)
                .collect::<Vec<_>>()
        };
        assert_eq!(layout(99), layout(99));
    }
}
