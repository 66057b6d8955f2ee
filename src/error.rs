use crate::Position;
use thiserror::Error;

/// Board configurations that can never produce a playable game.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Board size {width}x{height} must be positive in both dimensions")]
    EmptyBoard { width: u32, height: u32 },
    #[error("Board size {width}x{height} is too large")]
    BoardTooLarge { width: u32, height: u32 },
    #[error("Too many mines ({mines}) for board size {width}x{height}")]
    TooManyMines { width: u32, height: u32, mines: u32 },
    #[error("Cannot place {mines} mines outside the safe zone around {position}: only {eligible} cells are eligible")]
    SafeZoneTooSmall {
        position: Position,
        mines: u32,
        eligible: u32,
    },
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("Position {0} is out of bounds")]
    OutOfBounds(Position),
}

pub type Result<T> = std::result::Result<T, GameError>;
