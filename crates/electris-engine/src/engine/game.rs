use std::time::Duration;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{
    StampError,
    core::{board::Board, piece::Piece},
};

use super::{
    config::GameConfig,
    game_stats::{GameStats, Score},
    intent::{Intent, Intents},
    piece_source::{PieceSource, RandomPieces},
    snapshot::GameSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, derive_more::IsVariant)]
pub enum GameState {
    Running,
    /// Terminal: a piece could not be locked.
    GameOver(StampError),
}

/// What happened during one [`Game::update`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tick {
    /// The current piece was moved, rotated or hard-dropped by an intent.
    pub moved: bool,
    /// Set when a piece was locked this tick.
    pub lock: Option<Lock>,
}

/// Result of a successful lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lock {
    /// The piece as it was stamped.
    pub piece: Piece,
    /// Rows that were full after stamping, top to bottom, before removal.
    pub cleared_rows: ArrayVec<usize, { Board::ROWS }>,
    /// Points awarded for this lock.
    pub points: u16,
}

/// A single game: board, falling piece, preview, gravity and score.
///
/// Timestamps passed to [`Self::update`] are durations since the game was
/// created and must never decrease. The first gravity step is due one drop
/// interval after creation.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use electris_engine::{Game, GameConfig, Intents};
///
/// let mut game = Game::new(GameConfig::default());
/// let y = game.current().y();
///
/// // no intents: gravity moves the piece once the interval has elapsed
/// game.update(Intents::NONE, Duration::from_millis(999));
/// assert_eq!(game.current().y(), y);
/// game.update(Intents::NONE, Duration::from_millis(1000));
/// assert_eq!(game.current().y(), y + 1);
/// ```
#[derive(Debug, Clone)]
pub struct Game<S = RandomPieces> {
    board: Board,
    current: Piece,
    next: Piece,
    source: S,
    score: Score,
    stats: GameStats,
    preview: bool,
    drop_interval: Duration,
    next_drop: Duration,
    state: GameState,
}

impl Game<RandomPieces> {
    /// Creates a game with random pieces, seeded from the config when it has
    /// a seed.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let source = config
            .seed
            .map_or_else(RandomPieces::new, RandomPieces::with_seed);
        Self::with_source(config, source)
    }
}

impl<S> Game<S>
where
    S: PieceSource,
{
    #[must_use]
    pub fn with_source(config: GameConfig, source: S) -> Self {
        Self::with_board(config, Board::EMPTY, source)
    }

    /// Like [`Self::with_source`], but starting from a prepared board.
    #[must_use]
    pub fn with_board(config: GameConfig, board: Board, mut source: S) -> Self {
        let current = Piece::spawn(source.next_kind());
        let next = Piece::spawn(source.next_kind());
        let drop_interval = config.start_level.drop_interval();
        Self {
            board,
            current,
            next,
            source,
            score: Score::new(),
            stats: GameStats::new(),
            preview: config.preview,
            drop_interval,
            next_drop: drop_interval,
            state: GameState::Running,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn current(&self) -> &Piece {
        &self.current
    }

    #[must_use]
    pub fn next(&self) -> &Piece {
        &self.next
    }

    #[must_use]
    pub fn score(&self) -> &Score {
        &self.score
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn is_preview_enabled(&self) -> bool {
        self.preview
    }

    #[must_use]
    pub fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    /// Time at which the next gravity step is due.
    #[must_use]
    pub fn next_drop_deadline(&self) -> Duration {
        self.next_drop
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::new(self)
    }

    /// Advances the game by one tick.
    ///
    /// Intents are applied in a fixed order:
    ///
    /// 1. `TogglePreview` flips the preview before anything else
    /// 2. one horizontal step, `MoveLeft` winning over `MoveRight`
    /// 3. `SoftDrop` moves one row down
    /// 4. `Rotate` turns clockwise if the new orientation fits, without kicks
    /// 5. `HardDrop` falls as far as possible and locks at once
    ///
    /// Gravity only acts in ticks where none of the above moved the piece and
    /// the deadline has passed. Illegal moves are ignored. After game over
    /// this is a no-op.
    pub fn update(&mut self, intents: Intents, now: Duration) -> Tick {
        let mut tick = Tick::default();
        if self.state.is_game_over() {
            return tick;
        }

        if intents.contains(Intent::TogglePreview) {
            self.preview = !self.preview;
        }

        if (intents.contains(Intent::MoveLeft) && self.try_shift(-1, 0))
            || (intents.contains(Intent::MoveRight) && self.try_shift(1, 0))
        {
            tick.moved = true;
        }
        if intents.contains(Intent::SoftDrop) && self.try_shift(0, 1) {
            tick.moved = true;
        }
        if intents.contains(Intent::Rotate) && self.try_rotate() {
            tick.moved = true;
        }

        if intents.contains(Intent::HardDrop) {
            while self.try_shift(0, 1) {}
            tick.lock = self.lock();
            tick.moved = true;
            if self.state.is_game_over() {
                return tick;
            }
            self.next_drop = now.saturating_add(self.drop_interval);
        }

        if !tick.moved && now >= self.next_drop {
            if !self.try_shift(0, 1) {
                tick.lock = self.lock();
            }
            self.next_drop = now.saturating_add(self.drop_interval);
        }

        tick
    }

    fn try_shift(&mut self, dx: i32, dy: i32) -> bool {
        if !self.board.fits(&self.current, dx, dy, 0) {
            return false;
        }
        self.current.shift(dx, dy);
        true
    }

    fn try_rotate(&mut self) -> bool {
        if !self.board.fits(&self.current, 0, 0, 1) {
            return false;
        }
        self.current.rotate_clockwise();
        true
    }

    /// Stamps the current piece, clears rows, scores and spawns the next piece.
    ///
    /// Returns `None` and ends the game if the piece cannot be stamped.
    fn lock(&mut self) -> Option<Lock> {
        let piece = self.current;
        if let Err(cause) = self.board.stamp(&piece) {
            self.state = GameState::GameOver(cause);
            return None;
        }

        let cleared_rows = self.board.full_rows();
        let cleared_count = self.board.clear_full_rows();
        assert_eq!(cleared_count, cleared_rows.len());

        let points = self.score.award_lock(self.preview);
        self.stats.record_lock(cleared_count);

        self.current = self.next;
        self.next = Piece::spawn(self.source.next_kind());

        Some(Lock {
            piece,
            cleared_rows,
            points,
        })
    }
}
