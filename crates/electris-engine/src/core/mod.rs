pub use self::{board::*, piece::*, tetromino::*};

pub(crate) mod board;
pub(crate) mod piece;
pub(crate) mod tetromino;
