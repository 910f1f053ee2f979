use serde::{Deserialize, Serialize};

/// A discrete player intent.
///
/// Key bindings and key-repeat handling belong to the input adapter; the
/// engine only sees which intents are active in a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum Intent {
    MoveLeft = 0,
    MoveRight = 1,
    SoftDrop = 2,
    Rotate = 3,
    HardDrop = 4,
    TogglePreview = 5,
}

impl Intent {
    pub const ALL: [Self; 6] = [
        Intent::MoveLeft,
        Intent::MoveRight,
        Intent::SoftDrop,
        Intent::Rotate,
        Intent::HardDrop,
        Intent::TogglePreview,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of intents active during one tick.
///
/// Serialized as a list of intent names, e.g. `["MoveLeft", "Rotate"]`.
///
/// # Example
///
/// ```
/// use electris_engine::{Intent, Intents};
///
/// let intents: Intents = [Intent::MoveLeft, Intent::Rotate].into_iter().collect();
/// assert!(intents.contains(Intent::Rotate));
/// assert!(!intents.contains(Intent::HardDrop));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "Vec<Intent>", into = "Vec<Intent>")]
pub struct Intents {
    bits: u8,
}

impl Intents {
    pub const NONE: Self = Self { bits: 0 };

    /// Returns a copy with `intent` added.
    #[must_use]
    pub const fn with(self, intent: Intent) -> Self {
        Self {
            bits: self.bits | intent.bit(),
        }
    }

    pub fn insert(&mut self, intent: Intent) {
        self.bits |= intent.bit();
    }

    #[must_use]
    pub const fn contains(self, intent: Intent) -> bool {
        self.bits & intent.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Intent> {
        Intent::ALL
            .into_iter()
            .filter(move |intent| self.contains(*intent))
    }
}

impl From<Intent> for Intents {
    fn from(intent: Intent) -> Self {
        Self::NONE.with(intent)
    }
}

impl FromIterator<Intent> for Intents {
    fn from_iter<T: IntoIterator<Item = Intent>>(iter: T) -> Self {
        let mut intents = Self::NONE;
        for intent in iter {
            intents.insert(intent);
        }
        intents
    }
}

impl Extend<Intent> for Intents {
    fn extend<T: IntoIterator<Item = Intent>>(&mut self, iter: T) {
        for intent in iter {
            self.insert(intent);
        }
    }
}

impl From<Vec<Intent>> for Intents {
    fn from(intents: Vec<Intent>) -> Self {
        intents.into_iter().collect()
    }
}

impl From<Intents> for Vec<Intent> {
    fn from(intents: Intents) -> Self {
        intents.iter().collect()
    }
}
