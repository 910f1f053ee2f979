//! Game state machine and its inputs.
//!
//! - [`Game`] - board, current/next piece, gravity timer, scoring
//! - [`Intents`] - the de-bounced player intents of one tick
//! - [`GameConfig`] / [`StartLevel`] - construction parameters
//! - [`PieceSource`] - where new pieces come from ([`RandomPieces`], [`SequencePieces`])
//! - [`Score`] / [`GameStats`] - running totals
//! - [`GameSnapshot`] - everything a renderer needs for one frame
//!
//! # Game Flow
//!
//! 1. Create a [`Game`] with a start level and a piece source
//! 2. Once per frame, call [`Game::update`] with the active intents and the
//!    time elapsed since the game was created
//! 3. Draw from [`Game::snapshot`]
//! 4. Stop when [`Game::state`] reports game over; further updates are no-ops

pub use self::{config::*, game::*, game_stats::*, intent::*, piece_source::*, snapshot::*};

mod config;
mod game;
mod game_stats;
mod intent;
mod piece_source;
mod snapshot;
