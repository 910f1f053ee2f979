use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    tetromino::{PieceKind, Rotation, Shape},
};

/// A live tetromino: kind, rotation and board position.
///
/// `(x, y)` is the board cell under the top-left corner of the current
/// orientation's matrix. `y` may be negative while the piece still sticks out
/// above the visible field.
///
/// Movement and rotation mutate the piece in place without checking the board;
/// callers test with [`Board::fits`] before committing.
///
/// # Example
///
/// ```
/// use electris_engine::{Board, Piece, PieceKind};
///
/// let board = Board::EMPTY;
/// let mut piece = Piece::spawn(PieceKind::T);
/// if board.fits(&piece, 0, 0, 1) {
///     piece.rotate_clockwise();
/// }
/// assert_eq!(piece.rotation().get(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    kind: PieceKind,
    rotation: Rotation,
    x: i32,
    y: i32,
}

impl Piece {
    /// Creates a piece in spawn orientation, horizontally centered, at row 0.
    #[must_use]
    pub fn spawn(kind: PieceKind) -> Self {
        Self::new(kind, Rotation::SPAWN, spawn_column(kind), 0)
    }

    #[must_use]
    pub const fn new(kind: PieceKind, rotation: Rotation, x: i32, y: i32) -> Self {
        Self {
            kind,
            rotation,
            x,
            y,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the matrix of the active rotation.
    #[must_use]
    pub fn image(&self) -> &'static Shape {
        self.kind.shape(self.rotation)
    }

    pub fn rotate_clockwise(&mut self) {
        self.rotation = self.rotation.rotated_clockwise();
    }

    pub fn shift(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Returns the absolute `(x, y)` board cells this piece covers.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + use<> {
        self.cells_offset(0, 0, 0)
    }

    /// Returns the cells the piece would cover after moving by `(dx, dy)` and
    /// turning `drot` quarter turns clockwise.
    pub fn cells_offset(
        &self,
        dx: i32,
        dy: i32,
        drot: u8,
    ) -> impl Iterator<Item = (i32, i32)> + use<> {
        let shape = self.kind.shape(self.rotation.offset(drot));
        let x0 = self.x + dx;
        let y0 = self.y + dy;
        shape
            .occupied_cells()
            .map(move |(col, row)| (x0 + offset(col), y0 + offset(row)))
    }
}

/// Column that centers the spawn orientation on the board.
fn spawn_column(kind: PieceKind) -> i32 {
    let width = kind.shape(Rotation::SPAWN).cols();
    offset(Board::COLS / 2 - width / 2)
}

#[expect(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
const fn offset(n: usize) -> i32 {
    n as i32
}

/// Error parsing the `kind#rotation@x,y` text form of a [`Piece`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PieceParseError {
    #[display("expected format 'kind#rotation@x,y', got '{text}'")]
    Malformed { text: String },
    #[display("invalid piece kind: '{text}'")]
    InvalidKind { text: String },
    #[display("rotation must be 0-3, got '{text}'")]
    InvalidRotation { text: String },
    #[display("invalid coordinate: '{text}'")]
    InvalidCoordinate { text: String },
}

/// Text form `kind#rotation@x,y`, e.g. `S#1@4,-1`.
impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.get(),
            self.x,
            self.y
        )
    }
}

impl FromStr for Piece {
    type Err = PieceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || PieceParseError::Malformed { text: s.to_owned() };
        let (kind, rest) = s.split_once('#').ok_or_else(malformed)?;
        let (rotation, position) = rest.split_once('@').ok_or_else(malformed)?;
        let (x, y) = position.split_once(',').ok_or_else(malformed)?;

        let mut kind_chars = kind.chars();
        let kind = match (kind_chars.next(), kind_chars.next()) {
            (Some(c), None) => PieceKind::from_char(c),
            _ => None,
        }
        .ok_or_else(|| PieceParseError::InvalidKind {
            text: kind.to_owned(),
        })?;

        let rotation = rotation
            .parse::<u8>()
            .ok()
            .filter(|r| *r < 4)
            .map(Rotation::new)
            .ok_or_else(|| PieceParseError::InvalidRotation {
                text: rotation.to_owned(),
            })?;

        let coordinate = |text: &str| {
            text.parse::<i32>()
                .map_err(|_| PieceParseError::InvalidCoordinate {
                    text: text.to_owned(),
                })
        };

        Ok(Self::new(kind, rotation, coordinate(x)?, coordinate(y)?))
    }
}

impl Serialize for Piece {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Piece {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_is_centered() {
        assert_eq!(Piece::spawn(PieceKind::I).x(), 3);
        assert_eq!(Piece::spawn(PieceKind::O).x(), 4);
        for kind in [PieceKind::T, PieceKind::J, PieceKind::L, PieceKind::S, PieceKind::Z] {
            let piece = Piece::spawn(kind);
            assert_eq!((piece.x(), piece.y()), (4, 0), "{kind:?}");
            assert_eq!(piece.rotation(), Rotation::SPAWN);
        }
    }

    #[test]
    fn test_cells_follow_position() {
        let mut piece = Piece::spawn(PieceKind::T);
        piece.shift(-2, 3);
        let cells: Vec<_> = piece.cells().collect();
        assert_eq!(cells, [(3, 3), (2, 4), (3, 4), (4, 4)]);
    }

    #[test]
    fn test_cells_offset_uses_candidate_rotation() {
        let piece = Piece::spawn(PieceKind::I);
        let cells: Vec<_> = piece.cells_offset(0, 1, 1).collect();
        assert_eq!(cells, [(3, 1), (3, 2), (3, 3), (3, 4)]);
        // the piece itself is untouched
        assert_eq!(piece.rotation(), Rotation::SPAWN);
    }

    #[test]
    fn test_four_rotations_restore_image() {
        for kind in PieceKind::ALL {
            let mut piece = Piece::spawn(kind);
            let original = *piece.image();
            for _ in 0..4 {
                piece.rotate_clockwise();
            }
            assert_eq!(*piece.image(), original);
            assert_eq!(piece.rotation(), Rotation::SPAWN);
        }
    }

    #[test]
    fn test_piece_serialization() {
        let piece = Piece::new(PieceKind::S, Rotation::new(1), 4, -1);

        let serialized = serde_json::to_string(&piece).unwrap();
        assert_eq!(serialized, "\"S#1@4,-1\"");

        let deserialized: Piece = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, piece);
    }

    #[test]
    fn test_piece_parse_errors() {
        assert!(matches!(
            "S1@4,18".parse::<Piece>(),
            Err(PieceParseError::Malformed { .. })
        ));
        assert!(matches!(
            "S#1@4".parse::<Piece>(),
            Err(PieceParseError::Malformed { .. })
        ));
        assert!(matches!(
            "X#1@4,18".parse::<Piece>(),
            Err(PieceParseError::InvalidKind { .. })
        ));
        assert!(matches!(
            "SS#1@4,18".parse::<Piece>(),
            Err(PieceParseError::InvalidKind { .. })
        ));
        assert!(matches!(
            "S#4@4,18".parse::<Piece>(),
            Err(PieceParseError::InvalidRotation { .. })
        ));
        assert!(matches!(
            "S#1@abc,18".parse::<Piece>(),
            Err(PieceParseError::InvalidCoordinate { .. })
        ));
        assert!(serde_json::from_str::<Piece>("\"S#-1@4,18\"").is_err());
    }
}
