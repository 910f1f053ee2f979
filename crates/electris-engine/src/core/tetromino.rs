use std::fmt;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// Largest row or column extent of any orientation.
const MAX_EXTENT: usize = 4;

/// The seven tetromino kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// J-piece.
    J = 3,
    /// L-piece.
    L = 4,
    /// S-piece.
    S = 5,
    /// Z-piece.
    Z = 6,
}

/// Uniform choice over the seven kinds.
impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::J,
        PieceKind::L,
        PieceKind::S,
        PieceKind::Z,
    ];

    /// Returns the four orientations of this kind, clockwise from spawn.
    #[must_use]
    pub fn rotations(self) -> &'static [Shape; 4] {
        &SHAPES[self as usize]
    }

    /// Returns the matrix for one orientation.
    #[must_use]
    pub fn shape(self, rotation: Rotation) -> &'static Shape {
        &self.rotations()[rotation.index()]
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use electris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::Z.as_char(), 'Z');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            _ => None,
        }
    }
}

/// Rotation index of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise
///
/// Arithmetic wraps modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rotation(u8);

impl Rotation {
    pub const SPAWN: Self = Self(0);

    /// Creates a rotation from any index, wrapping modulo 4.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index % 4)
    }

    #[must_use]
    pub const fn rotated_clockwise(self) -> Self {
        self.offset(1)
    }

    /// Returns the rotation `steps` quarter turns clockwise from this one.
    #[must_use]
    pub const fn offset(self, steps: u8) -> Self {
        Self((self.0 + steps % 4) % 4)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Occupancy matrix of one tetromino orientation.
///
/// Cells outside `rows() x cols()` are always empty, so two shapes compare
/// equal exactly when their matrices do.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    rows: u8,
    cols: u8,
    cells: [[bool; MAX_EXTENT]; MAX_EXTENT],
}

impl Shape {
    /// Builds a shape from rows of `#` (filled) and `.` (empty).
    ///
    /// # Panics
    ///
    /// Panics if the rows are empty, ragged, or larger than 4×4.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub const fn from_rows(rows: &[&str]) -> Self {
        assert!(!rows.is_empty() && rows.len() <= MAX_EXTENT);
        let cols = rows[0].len();
        assert!(cols > 0 && cols <= MAX_EXTENT);

        let mut cells = [[false; MAX_EXTENT]; MAX_EXTENT];
        let mut y = 0;
        while y < rows.len() {
            let row = rows[y].as_bytes();
            assert!(row.len() == cols, "shape rows must have equal length");
            let mut x = 0;
            while x < cols {
                cells[y][x] = row[x] == b'#';
                x += 1;
            }
            y += 1;
        }

        Self {
            rows: rows.len() as u8,
            cols: cols as u8,
            cells,
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows as usize
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols as usize
    }

    #[must_use]
    pub const fn is_filled(&self, x: usize, y: usize) -> bool {
        x < self.cols() && y < self.rows() && self.cells[y][x]
    }

    fn row_strings(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.rows()).map(move |y| {
            (0..self.cols())
                .map(|x| if self.cells[y][x] { '#' } else { '.' })
                .collect()
        })
    }

    /// Returns the `(x, y)` offsets of the filled cells, row by row.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows()).flat_map(move |y| {
            (0..self.cols())
                .filter(move |&x| self.cells[y][x])
                .map(move |x| (x, y))
        })
    }

    /// Quarter turn clockwise.
    ///
    /// An R×C matrix becomes C×R with `new[i][j] = old[R-1-j][i]`.
    #[must_use]
    pub const fn rotated_clockwise(&self) -> Self {
        let rows = self.rows();
        let cols = self.cols();
        let mut cells = [[false; MAX_EXTENT]; MAX_EXTENT];
        let mut i = 0;
        while i < cols {
            let mut j = 0;
            while j < rows {
                cells[i][j] = self.cells[rows - 1 - j][i];
                j += 1;
            }
            i += 1;
        }
        Self {
            rows: self.cols,
            cols: self.rows,
            cells,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.row_strings().enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            f.write_str(&row)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.row_strings()).finish()
    }
}

/// Serialized as a list of row strings, e.g. `[".#.", "###"]`.
impl Serialize for Shape {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.row_strings())
    }
}

/// Collects the base shape and its three successive clockwise turns.
///
/// Each orientation is derived from the previous one, not from the base.
#[must_use]
pub const fn rotations_of(base: Shape) -> [Shape; 4] {
    let mut rotations = [base; 4];
    let mut i = 1;
    while i < 4 {
        rotations[i] = rotations[i - 1].rotated_clockwise();
        i += 1;
    }
    rotations
}

const SHAPES: [[Shape; 4]; PieceKind::LEN] = [
    rotations_of(Shape::from_rows(&["####"])),
    rotations_of(Shape::from_rows(&["##", "##"])),
    rotations_of(Shape::from_rows(&[".#.", "###"])),
    rotations_of(Shape::from_rows(&["#..", "###"])),
    rotations_of(Shape::from_rows(&["..#", "###"])),
    rotations_of(Shape::from_rows(&[".##", "##."])),
    rotations_of(Shape::from_rows(&["##.", ".##"])),
];
