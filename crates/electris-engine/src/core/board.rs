use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{StampError, core::piece::Piece};

const COLS: usize = 10;
const ROWS: usize = 20;

// All playable cells occupied
const FULL_ROW_MASK: u16 = (1 << COLS) - 1;

/// Single board row as a bitmask; bit `x` is column `x`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardRow {
    bits: u16,
}

impl BoardRow {
    pub const EMPTY: Self = Self { bits: 0 };
    pub const FULL: Self = Self {
        bits: FULL_ROW_MASK,
    };

    #[inline]
    #[must_use]
    pub fn is_full(self) -> bool {
        self.bits == FULL_ROW_MASK
    }

    #[inline]
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[inline]
    #[must_use]
    pub fn is_filled(self, x: usize) -> bool {
        x < COLS && (self.bits & (1 << x)) != 0
    }

    #[inline]
    fn fill(&mut self, x: usize) {
        self.bits |= 1 << x;
    }

    /// Iterates over the cells left to right.
    #[inline]
    pub fn cells(self) -> impl Iterator<Item = bool> {
        (0..COLS).map(move |x| self.is_filled(x))
    }
}

/// The 10×20 play field.
///
/// Row 0 is the top of the visible field, row 19 the floor. Only occupancy is
/// stored; locked pieces lose their identity.
///
/// Coordinates are signed so that callers can probe cells of a piece that
/// still hangs above the field (`y < 0`). Those cells never block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    rows: [BoardRow; ROWS],
}

impl Default for Board {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Board {
    pub const COLS: usize = COLS;
    pub const ROWS: usize = ROWS;

    pub const EMPTY: Self = Self {
        rows: [BoardRow::EMPTY; ROWS],
    };

    /// Returns whether the cell blocks a piece.
    ///
    /// - columns outside `0..COLS` and rows at or below the floor block
    /// - rows above the field (`y < 0`) never block
    /// - otherwise the stored cell decides
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        let Some(col) = usize::try_from(x).ok().filter(|&col| col < COLS) else {
            return true;
        };
        let Ok(row) = usize::try_from(y) else {
            return false;
        };
        self.rows.get(row).is_none_or(|r| r.is_filled(col))
    }

    /// Checks whether `piece` would be legal after moving by `(dx, dy)` and
    /// turning `drot` quarter turns clockwise.
    #[must_use]
    pub fn fits(&self, piece: &Piece, dx: i32, dy: i32, drot: u8) -> bool {
        piece
            .cells_offset(dx, dy, drot)
            .all(|(x, y)| !self.is_occupied(x, y))
    }

    /// Locks a piece onto the board by setting its occupied cells.
    ///
    /// All cells are validated before any is written, so a failed stamp leaves
    /// the board untouched. A cell above row 0 takes precedence over the other
    /// failures.
    pub fn stamp(&mut self, piece: &Piece) -> Result<(), StampError> {
        if piece.cells().any(|(_, y)| y < 0) {
            return Err(StampError::AboveVisibleField);
        }

        let mut targets = ArrayVec::<(usize, usize), 4>::new();
        for (x, y) in piece.cells() {
            let col = usize::try_from(x)
                .ok()
                .filter(|&col| col < COLS)
                .ok_or(StampError::OutOfBounds)?;
            let row = usize::try_from(y)
                .ok()
                .filter(|&row| row < ROWS)
                .ok_or(StampError::OutOfBounds)?;
            if self.rows[row].is_filled(col) {
                return Err(StampError::Overlap);
            }
            targets.push((col, row));
        }

        for (col, row) in targets {
            self.rows[row].fill(col);
        }
        Ok(())
    }

    /// Returns the indices of all full rows, top to bottom.
    #[must_use]
    pub fn full_rows(&self) -> ArrayVec<usize, ROWS> {
        (0..ROWS).filter(|&y| self.rows[y].is_full()).collect()
    }

    /// Clears full rows and returns how many were removed.
    ///
    /// Remaining rows keep their order and slide down; the same number of
    /// empty rows appears at the top.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut count = 0;

        for y in (0..ROWS).rev() {
            if self.rows[y].is_full() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows[y + count] = self.rows[y];
            }
        }

        self.rows[..count].fill(BoardRow::EMPTY);
        count
    }

    #[must_use]
    pub fn row(&self, y: usize) -> BoardRow {
        self.rows[y]
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = BoardRow> + '_ {
        self.rows.iter().copied()
    }

    /// Number of filled cells on the whole board.
    #[must_use]
    pub fn filled_cells(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.bits.count_ones() as usize)
            .sum()
    }

    /// Creates a `Board` from ASCII art for tests and puzzles.
    ///
    /// `#` is a filled cell, `.` an empty one, other characters are ignored.
    /// Every line must have exactly 10 cells. Lines are aligned to the bottom
    /// of the board, so the last line is row 19.
    ///
    /// # Panics
    ///
    /// Panics if a line does not have 10 cells or there are more than 20 lines.
    #[must_use]
    pub fn from_ascii(art: &str) -> Self {
        let mut board = Self::EMPTY;
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(
            lines.len() <= ROWS,
            "board art has {} rows, at most {ROWS} allowed",
            lines.len()
        );

        let top = ROWS - lines.len();
        for (i, line) in lines.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                cells.len(),
                COLS,
                "Each row must have exactly {COLS} cells, got {} at line {i}",
                cells.len()
            );
            for (x, &ch) in cells.iter().enumerate() {
                if ch == '#' {
                    board.rows[top + i].fill(x);
                }
            }
        }
        board
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for filled in row.cells() {
                f.write_str(if filled { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Serialized as comma-separated row masks in hex, top row first
/// (e.g. `"000,000,...,3ff"`).
impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| format!("{:03x}", row.bits))
            .collect();
        serializer.serialize_str(&rows.join(","))
    }
}

impl<'de> Deserialize<'de> for Board {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != ROWS {
            return Err(serde::de::Error::custom(format!(
                "expected {ROWS} comma-separated hex values, got {}",
                parts.len()
            )));
        }

        let mut board = Self::EMPTY;
        for (y, hex_str) in parts.iter().enumerate() {
            let bits = u16::from_str_radix(hex_str.trim(), 16).map_err(|e| {
                serde::de::Error::custom(format!("invalid hex at row {y}: {hex_str} ({e})"))
            })?;
            if bits & !FULL_ROW_MASK != 0 {
                return Err(serde::de::Error::custom(format!(
                    "row {y} has cells outside the board: {hex_str}"
                )));
            }
            board.rows[y] = BoardRow { bits };
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tetromino::{PieceKind, Rotation};

    #[test]
    fn test_is_occupied_edges() {
        let board = Board::from_ascii("#.........");

        assert!(board.is_occupied(0, 19));
        assert!(!board.is_occupied(1, 19));
        // above the field
        assert!(!board.is_occupied(0, -1));
        assert!(!board.is_occupied(9, -3));
        // sides and floor
        assert!(board.is_occupied(-1, 5));
        assert!(board.is_occupied(10, 5));
        assert!(board.is_occupied(-1, -1));
        assert!(board.is_occupied(4, 20));
    }

    #[test]
    fn test_spawned_pieces_fit_empty_board() {
        for kind in PieceKind::ALL {
            assert!(Board::EMPTY.fits(&Piece::spawn(kind), 0, 0, 0), "{kind:?}");
        }
    }

    #[test]
    fn test_fits_rejects_walls_and_floor() {
        let board = Board::EMPTY;
        let at_left = Piece::new(PieceKind::O, Rotation::SPAWN, 0, 5);
        assert!(!board.fits(&at_left, -1, 0, 0));
        assert!(board.fits(&at_left, 1, 0, 0));

        let at_right = Piece::new(PieceKind::O, Rotation::SPAWN, 8, 5);
        assert!(!board.fits(&at_right, 1, 0, 0));

        let on_floor = Piece::new(PieceKind::O, Rotation::SPAWN, 4, 18);
        assert!(!board.fits(&on_floor, 0, 1, 0));
    }

    #[test]
    fn test_fits_allows_cells_above_field() {
        let board = Board::from_ascii(
            "
            ##########
            ",
        );
        // vertical I hanging two cells above row 0
        let piece = Piece::new(PieceKind::I, Rotation::new(1), 0, -2);
        assert!(board.fits(&piece, 0, 0, 0));
        // turning back to horizontal at row -2 is still legal
        assert!(board.fits(&piece, 0, 0, 3));
    }

    #[test]
    fn test_fits_checks_rotation_against_stack() {
        let board = Board::from_ascii(
            "
            ....#.....
            ....#.....
            ",
        );
        // horizontal I resting at row 17 over the column
        let piece = Piece::new(PieceKind::I, Rotation::SPAWN, 3, 17);
        assert!(board.fits(&piece, 0, 0, 0));
        // vertical orientation would reach rows 17..=20
        assert!(!board.fits(&piece, 0, 0, 1));
    }

    #[test]
    fn test_stamp_writes_cells() {
        let mut board = Board::EMPTY;
        let piece = Piece::new(PieceKind::T, Rotation::SPAWN, 0, 18);
        board.stamp(&piece).unwrap();

        assert_eq!(board.filled_cells(), 4);
        assert!(board.is_occupied(1, 18));
        assert!(board.is_occupied(0, 19));
        assert!(board.is_occupied(2, 19));
        assert!(!board.is_occupied(0, 18));
    }

    #[test]
    fn test_stamp_above_field_leaves_board_untouched() {
        let mut board = Board::from_ascii("....#.....");
        let before = board.clone();

        // vertical I with its top cell at row -1
        let piece = Piece::new(PieceKind::I, Rotation::new(1), 2, -1);
        assert_eq!(board.stamp(&piece), Err(StampError::AboveVisibleField));
        assert_eq!(board, before);
    }

    #[test]
    fn test_stamp_overlap_leaves_board_untouched() {
        let mut board = Board::from_ascii("....#.....");
        let before = board.clone();

        let piece = Piece::new(PieceKind::I, Rotation::SPAWN, 2, 19);
        assert_eq!(board.stamp(&piece), Err(StampError::Overlap));
        assert_eq!(board, before);
    }

    #[test]
    fn test_stamp_out_of_bounds_leaves_board_untouched() {
        let mut board = Board::from_ascii("#.........");
        let before = board.clone();

        // horizontal I reaching columns 8..=11
        let piece = Piece::new(PieceKind::I, Rotation::SPAWN, 8, 5);
        assert_eq!(board.stamp(&piece), Err(StampError::OutOfBounds));
        assert_eq!(board, before);

        let piece = Piece::new(PieceKind::O, Rotation::SPAWN, 4, 19);
        assert_eq!(board.stamp(&piece), Err(StampError::OutOfBounds));
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_single_row() {
        let mut board = Board::from_ascii(
            "
            .#........
            #########.
            ",
        );
        let piece = Piece::new(PieceKind::I, Rotation::new(1), 9, 16);
        board.stamp(&piece).unwrap();
        assert_eq!(board.full_rows().as_slice(), [19]);

        assert_eq!(board.clear_full_rows(), 1);
        let expected = Board::from_ascii(
            "
            .........#
            .........#
            .#.......#
            ",
        );
        assert_eq!(board, expected);
        assert!(board.row(0).is_empty());
    }

    #[test]
    fn test_clear_non_adjacent_rows() {
        let mut board = Board::from_ascii(
            "
            ..#.......
            ##########
            #.........
            ##########
            ...#......
            ",
        );
        assert_eq!(board.clear_full_rows(), 2);
        let expected = Board::from_ascii(
            "
            ..#.......
            #.........
            ...#......
            ",
        );
        assert_eq!(board, expected);
    }

    #[test]
    fn test_clear_without_full_rows_is_noop() {
        let mut board = Board::from_ascii(
            "
            #########.
            .#########
            ",
        );
        let before = board.clone();
        assert_eq!(board.clear_full_rows(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_board_serialization() {
        let board = Board::from_ascii(
            "
            #.........
            ##########
            ",
        );
        let serialized = serde_json::to_string(&board).unwrap();
        assert!(serialized.ends_with(",001,3ff\""), "{serialized}");

        let deserialized: Board = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, board);
    }

    #[test]
    fn test_board_deserialization_errors() {
        assert!(serde_json::from_str::<Board>("\"000,3ff\"").is_err());

        let mut rows = vec!["000"; ROWS];
        rows[3] = "400";
        let json = format!("\"{}\"", rows.join(","));
        assert!(serde_json::from_str::<Board>(&json).is_err());

        rows[3] = "xyz";
        let json = format!("\"{}\"", rows.join(","));
        assert!(serde_json::from_str::<Board>(&json).is_err());
    }
}
