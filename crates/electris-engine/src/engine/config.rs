use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Deserializer, Serialize, de};

use super::piece_source::PieceSeed;

/// Starting level, 0 through 9.
///
/// The level only selects the gravity interval; it never changes during a
/// game. Out-of-range input is not an error: the lenient constructors fall
/// back to level 0, and so does deserialization of any value that is not an
/// integer in range or a string holding one.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use electris_engine::StartLevel;
///
/// assert_eq!(StartLevel::clamped(3).drop_interval(), Duration::from_millis(700));
/// assert_eq!(StartLevel::clamped(42), StartLevel::default());
/// assert_eq!(StartLevel::parse_lenient("x"), StartLevel::default());
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct StartLevel(u8);

impl StartLevel {
    pub const MAX: u8 = 9;

    /// Returns the level, or level 0 when `level` is outside `0..=9`.
    #[must_use]
    pub fn clamped(level: i64) -> Self {
        u8::try_from(level)
            .ok()
            .filter(|level| *level <= Self::MAX)
            .map_or_else(Self::default, Self)
    }

    /// Parses a level typed by a user, falling back to level 0.
    #[must_use]
    pub fn parse_lenient(text: &str) -> Self {
        text.trim().parse().unwrap_or_default()
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Time between two gravity steps: `max(50, 1000 - 100 * level)` ms.
    #[must_use]
    pub fn drop_interval(self) -> Duration {
        let millis = 1000_u64.saturating_sub(100 * u64::from(self.0)).max(50);
        Duration::from_millis(millis)
    }
}

impl fmt::Display for StartLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error from the strict [`FromStr`] implementation of [`StartLevel`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum StartLevelError {
    #[display("start level is not a number: '{text}'")]
    NotANumber { text: String },
    #[display("start level must be between 0 and 9, got {level}")]
    OutOfRange { level: i64 },
}

impl FromStr for StartLevel {
    type Err = StartLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = s
            .parse::<i64>()
            .map_err(|_| StartLevelError::NotANumber { text: s.to_owned() })?;
        u8::try_from(level)
            .ok()
            .filter(|level| *level <= Self::MAX)
            .map(Self)
            .ok_or(StartLevelError::OutOfRange { level })
    }
}

impl From<i64> for StartLevel {
    fn from(level: i64) -> Self {
        Self::clamped(level)
    }
}

impl<'de> Deserialize<'de> for StartLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(StartLevelVisitor)
    }
}

struct StartLevelVisitor;

impl<'de> de::Visitor<'de> for StartLevelVisitor {
    type Value = StartLevel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a start level")
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(StartLevel::clamped(v))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(i64::try_from(v).map_or_else(|_| StartLevel::default(), StartLevel::clamped))
    }

    fn visit_f64<E>(self, _v: f64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(StartLevel::default())
    }

    fn visit_bool<E>(self, _v: bool) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(StartLevel::default())
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(StartLevel::parse_lenient(v))
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(StartLevel::default())
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(StartLevel::default())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(StartLevel::default())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: de::MapAccess<'de>,
    {
        while map
            .next_entry::<de::IgnoredAny, de::IgnoredAny>()?
            .is_some()
        {}
        Ok(StartLevel::default())
    }
}

impl From<StartLevel> for u8 {
    fn from(level: StartLevel) -> Self {
        level.0
    }
}

/// Parameters fixed when a game is created.
///
/// Every field has a default, so a config file may omit any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GameConfig {
    pub start_level: StartLevel,
    /// Whether the next piece is shown. Turning it off earns a bonus per lock.
    pub preview: bool,
    /// Seed for [`RandomPieces`](super::RandomPieces); random when absent.
    pub seed: Option<PieceSeed>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_level: StartLevel::default(),
            preview: true,
            seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_interval_per_level() {
        let intervals: Vec<u64> = (0..=9)
            .map(|level| {
                let millis = StartLevel::clamped(level).drop_interval().as_millis();
                u64::try_from(millis).unwrap()
            })
            .collect();
        assert_eq!(
            intervals,
            [1000, 900, 800, 700, 600, 500, 400, 300, 200, 100]
        );
    }

    #[test]
    fn test_clamped_defaults_out_of_range() {
        assert_eq!(StartLevel::clamped(9).get(), 9);
        assert_eq!(StartLevel::clamped(10).get(), 0);
        assert_eq!(StartLevel::clamped(-1).get(), 0);
        assert_eq!(StartLevel::clamped(i64::MAX).get(), 0);
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(StartLevel::parse_lenient(" 7\n").get(), 7);
        assert_eq!(StartLevel::parse_lenient("").get(), 0);
        assert_eq!(StartLevel::parse_lenient("seven").get(), 0);
        assert_eq!(StartLevel::parse_lenient("12").get(), 0);
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!("4".parse::<StartLevel>(), Ok(StartLevel::clamped(4)));
        assert_eq!(
            "10".parse::<StartLevel>(),
            Err(StartLevelError::OutOfRange { level: 10 })
        );
        assert!(matches!(
            "abc".parse::<StartLevel>(),
            Err(StartLevelError::NotANumber { .. })
        ));
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: GameConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert!(config.preview);
    }

    #[test]
    fn test_config_out_of_range_level_falls_back() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "start_level": 15, "preview": false }"#).unwrap();
        assert_eq!(config.start_level.get(), 0);
        assert!(!config.preview);

        let config: GameConfig = serde_json::from_str(r#"{ "start_level": 5 }"#).unwrap();
        assert_eq!(config.start_level.get(), 5);
    }

    #[test]
    fn test_config_unparsable_level_falls_back() {
        for (json, level) in [
            (r#"{ "start_level": "7" }"#, 7),
            (r#"{ "start_level": " 3 " }"#, 3),
            (r#"{ "start_level": "abc" }"#, 0),
            (r#"{ "start_level": 3.5 }"#, 0),
            (r#"{ "start_level": -2 }"#, 0),
            (r#"{ "start_level": 99999999999999999999 }"#, 0),
            (r#"{ "start_level": 18446744073709551615 }"#, 0),
            (r#"{ "start_level": true }"#, 0),
            (r#"{ "start_level": null }"#, 0),
            (r#"{ "start_level": [4] }"#, 0),
            (r#"{ "start_level": { "level": 4 } }"#, 0),
        ] {
            let config: GameConfig = serde_json::from_str(json).unwrap();
            assert_eq!(config.start_level.get(), level, "{json}");
        }
    }
}
