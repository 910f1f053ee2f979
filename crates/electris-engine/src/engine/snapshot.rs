use serde::Serialize;

use crate::core::{board::Board, piece::Piece, tetromino::Shape};

use super::{
    game::{Game, GameState},
    game_stats::{GameStats, Score},
    piece_source::PieceSource,
};

/// A piece together with the matrix of its active rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceView {
    pub piece: Piece,
    pub shape: Shape,
}

impl PieceView {
    #[must_use]
    pub fn new(piece: Piece) -> Self {
        Self {
            piece,
            shape: *piece.image(),
        }
    }
}

/// Read-only copy of everything a renderer draws in one frame.
///
/// The falling piece is not part of `board`; draw it on top from `current`.
/// `next` is only filled while the preview is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub state: GameState,
    pub board: Board,
    pub current: PieceView,
    pub next: Option<PieceView>,
    pub preview: bool,
    pub score: Score,
    /// Score in its display form, e.g. `0'042`.
    pub score_text: String,
    pub stats: GameStats,
}

impl GameSnapshot {
    pub(crate) fn new<S>(game: &Game<S>) -> Self
    where
        S: PieceSource,
    {
        let preview = game.is_preview_enabled();
        Self {
            state: *game.state(),
            board: game.board().clone(),
            current: PieceView::new(*game.current()),
            next: preview.then(|| PieceView::new(*game.next())),
            preview,
            score: *game.score(),
            score_text: game.score().to_string(),
            stats: *game.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{GameConfig, Intent, PieceKind, SequencePieces};

    fn game() -> Game<SequencePieces> {
        Game::with_source(
            GameConfig::default(),
            SequencePieces::new([PieceKind::J, PieceKind::S]),
        )
    }

    #[test]
    fn test_snapshot_shows_preview_only_when_enabled() {
        let mut game = game();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.current.piece.kind(), PieceKind::J);
        assert_eq!(snapshot.next.unwrap().piece.kind(), PieceKind::S);

        game.update(Intent::TogglePreview.into(), Duration::from_millis(1));
        let snapshot = game.snapshot();
        assert!(!snapshot.preview);
        assert!(snapshot.next.is_none());
    }

    #[test]
    fn test_snapshot_serialization() {
        let mut game = game();
        game.update(Intent::HardDrop.into(), Duration::from_millis(1));

        let json = serde_json::to_value(game.snapshot()).unwrap();
        assert_eq!(json["state"], "Running");
        assert_eq!(json["current"]["piece"], "S#0@4,0");
        assert_eq!(json["current"]["shape"][0], ".##");
        assert_eq!(json["next"]["piece"], "J#0@4,0");
        assert_eq!(json["score_text"], "0'001");
        assert_eq!(json["stats"]["locked_pieces"], 1);
        assert!(json["board"].as_str().unwrap().ends_with(",010,070"));
    }
}
