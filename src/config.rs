use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Standard board presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    /// 10x10 with 10 mines.
    Classic,
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub const fn dimensions(self) -> (u32, u32, u32) {
        match self {
            Difficulty::Classic => (10, 10, 10),
            Difficulty::Beginner => (9, 9, 10),
            Difficulty::Intermediate => (16, 16, 40),
            Difficulty::Expert => (30, 16, 99),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: u32,
    pub height: u32,
    pub mines: u32,
    /// Fixed RNG seed for reproducible mine placement.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Uncover the rest of the board once the game is decided.
    #[serde(default = "default_reveal_on_finish")]
    pub reveal_on_finish: bool,
}

fn default_reveal_on_finish() -> bool {
    true
}

impl GameConfig {
    pub fn new(width: u32, height: u32, mines: u32) -> Self {
        Self {
            width,
            height,
            mines,
            seed: None,
            reveal_on_finish: true,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_reveal_on_finish(mut self, reveal_on_finish: bool) -> Self {
        self.reveal_on_finish = reveal_on_finish;
        self
    }

    pub fn total_cells(&self) -> u32 {
        self.width.saturating_mul(self.height)
    }

    pub fn safe_cells(&self) -> u32 {
        self.total_cells().saturating_sub(self.mines)
    }

    /// Checks what can be checked before the first click is known. The
    /// safe-zone constraint depends on where that click lands and is
    /// enforced when mines are placed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyBoard {
                width: self.width,
                height: self.height,
            });
        }
        let total_cells = self.width.checked_mul(self.height);
        if i32::try_from(self.width).is_err()
            || i32::try_from(self.height).is_err()
            || total_cells.is_none()
        {
            return Err(ConfigError::BoardTooLarge {
                width: self.width,
                height: self.height,
            });
        }
        if total_cells.is_some_and(|total| self.mines >= total) {
            return Err(ConfigError::TooManyMines {
                width: self.width,
                height: self.height,
                mines: self.mines,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Difficulty::Classic.into()
    }
}

impl From<Difficulty> for GameConfig {
    fn from(difficulty: Difficulty) -> Self {
        let (width, height, mines) = difficulty.dimensions();
        Self::new(width, height, mines)
    }
}
