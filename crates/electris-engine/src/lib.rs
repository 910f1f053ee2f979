//! Falling-block puzzle engine in the style of the 1984 Electronika‑60 Tetris.
//!
//! The crate is split in two layers:
//!
//! - [`core`] - the tetromino catalog, live pieces and the board grid
//! - [`engine`] - the game state machine driven by intents and a monotonic clock
//!
//! Rendering and input polling are left to the caller: feed [`Intents`] and a
//! timestamp into [`Game::update`] once per frame and draw from
//! [`Game::snapshot`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use electris_engine::{Game, GameConfig, Intent, Intents, PieceKind, SequencePieces};
//!
//! let mut game = Game::with_source(GameConfig::default(), SequencePieces::new([PieceKind::I]));
//!
//! let tick = game.update(Intents::from(Intent::HardDrop), Duration::from_millis(16));
//! let lock = tick.lock.unwrap();
//!
//! assert_eq!(lock.points, 1);
//! assert_eq!(game.score().to_string(), "0'001");
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Reason a piece could not be stamped into the board.
///
/// Any of these ends the game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    derive_more::Display,
    derive_more::Error,
)]
pub enum StampError {
    #[display("piece locked above the visible field")]
    AboveVisibleField,
    #[display("piece locked on top of filled cells")]
    Overlap,
    #[display("piece locked outside the board columns")]
    OutOfBounds,
}
