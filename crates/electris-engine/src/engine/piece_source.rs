use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Supplies the kind of every newly spawned piece.
///
/// The game draws from its source once for the current piece, once for the
/// preview, and once more after every lock.
pub trait PieceSource {
    fn next_kind(&mut self) -> PieceKind;
}

impl<S> PieceSource for &mut S
where
    S: PieceSource + ?Sized,
{
    fn next_kind(&mut self) -> PieceKind {
        (**self).next_kind()
    }
}

impl<S> PieceSource for Box<S>
where
    S: PieceSource + ?Sized,
{
    fn next_kind(&mut self) -> PieceKind {
        (**self).next_kind()
    }
}

/// Seed for deterministic piece generation.
///
/// This is a 128-bit (16-byte) seed for the generator behind [`RandomPieces`].
/// The same seed yields the same piece sequence, which makes runs
/// reproducible and replayable.
///
/// Its text form is 32 hex digits, used both by `Display`/`FromStr` and by
/// serde.
///
/// # Example
///
/// ```
/// use electris_engine::{PieceSeed, PieceSource as _, RandomPieces};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
///
/// let mut first = RandomPieces::with_seed(seed);
/// let mut second = RandomPieces::with_seed(seed.to_string().parse().unwrap());
/// assert_eq!(first.next_kind(), second.next_kind());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

/// Error parsing a [`PieceSeed`] from hex.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex seed: expected 32 hex digits, got '{text}'")]
pub struct PieceSeedParseError {
    text: String,
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for PieceSeed {
    type Err = PieceSeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || PieceSeedParseError { text: s.to_owned() };
        if s.len() != 32 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(error());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| error())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values with `rng.random()`.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// Uniformly random pieces, each draw independent of the previous ones.
///
/// There is no bag: droughts and repeats happen as they would with a fair
/// seven-sided die.
#[derive(Debug, Clone)]
pub struct RandomPieces {
    rng: Pcg32,
}

impl Default for RandomPieces {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPieces {
    /// Creates a source with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }
}

impl PieceSource for RandomPieces {
    fn next_kind(&mut self) -> PieceKind {
        self.rng.random()
    }
}

/// Replays a fixed list of kinds, starting over when it runs out.
#[derive(Debug, Clone)]
pub struct SequencePieces {
    kinds: Vec<PieceKind>,
    cursor: usize,
}

impl SequencePieces {
    /// # Panics
    ///
    /// Panics if `kinds` is empty.
    #[must_use]
    pub fn new(kinds: impl IntoIterator<Item = PieceKind>) -> Self {
        let kinds: Vec<_> = kinds.into_iter().collect();
        assert!(!kinds.is_empty(), "piece sequence must not be empty");
        Self { kinds, cursor: 0 }
    }
}

impl PieceSource for SequencePieces {
    fn next_kind(&mut self) -> PieceKind {
        let kind = self.kinds[self.cursor];
        self.cursor = (self.cursor + 1) % self.kinds.len();
        kind
    }
}
