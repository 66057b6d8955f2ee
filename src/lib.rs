pub mod board;
pub mod cell;
pub mod config;
pub mod error;
pub mod game;
pub mod position;
pub mod view;

pub use board::{Board, Revealed};
pub use cell::Cell;
pub use config::{Difficulty, GameConfig};
pub use error::{ConfigError, GameError, Result};
pub use game::{Action, Game, Outcome};
pub use position::Position;
pub use view::{BoardSnapshot, CellView};
