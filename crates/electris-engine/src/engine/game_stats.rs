use std::fmt;

use serde::{Deserialize, Serialize};

/// Points for every locked piece.
const LOCK_POINTS: u16 = 1;
/// Extra points per lock while the next-piece preview is hidden.
const NO_PREVIEW_BONUS: u16 = 5;

/// Score kept as a thousands counter plus a remainder below 1000.
///
/// Scoring ignores cleared lines: each lock is worth 1 point, or 6 with the
/// preview hidden. The remainder wraps past 999 into the thousands counter.
///
/// # Example
///
/// ```
/// use electris_engine::Score;
///
/// let mut score = Score::new();
/// for _ in 0..170 {
///     score.award_lock(false);
/// }
/// assert_eq!(score.thousands(), 1);
/// assert_eq!(score.points(), 20);
/// assert_eq!(score.to_string(), "1'020");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Score {
    thousands: u32,
    points: u16,
}

impl Score {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            thousands: 0,
            points: 0,
        }
    }

    #[must_use]
    pub const fn thousands(&self) -> u32 {
        self.thousands
    }

    /// Remainder below 1000.
    #[must_use]
    pub const fn points(&self) -> u16 {
        self.points
    }

    /// `thousands * 1000 + points`.
    #[must_use]
    pub fn total(&self) -> u64 {
        u64::from(self.thousands) * 1000 + u64::from(self.points)
    }

    /// Adds the points for one lock and returns how many were added.
    pub fn award_lock(&mut self, preview: bool) -> u16 {
        let points = if preview {
            LOCK_POINTS
        } else {
            LOCK_POINTS + NO_PREVIEW_BONUS
        };
        self.points += points;
        if self.points > 999 {
            self.points -= 1000;
            self.thousands += 1;
        }
        points
    }
}

/// Rendered as the thousands digit, an apostrophe and three padded digits.
impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'{:03}", self.thousands, self.points)
    }
}

/// Counters that do not affect play.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct GameStats {
    locked_pieces: usize,
    cleared_lines: usize,
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            locked_pieces: 0,
            cleared_lines: 0,
        }
    }

    /// Total number of pieces that have been locked into place.
    #[must_use]
    pub const fn locked_pieces(&self) -> usize {
        self.locked_pieces
    }

    #[must_use]
    pub const fn cleared_lines(&self) -> usize {
        self.cleared_lines
    }

    pub const fn record_lock(&mut self, cleared_lines: usize) {
        self.locked_pieces += 1;
        self.cleared_lines += cleared_lines;
    }
}
