use std::time::Duration;

use electris_engine::{Board, GameConfig, Intents};
use serde::{Deserialize, Serialize};

/// Recorded or hand-written input for a headless run.
///
/// ```json
/// {
///   "config": { "start_level": 3, "preview": false },
///   "board": "000,000,...,1ff",
///   "frames": [
///     { "at_ms": 16, "intents": ["MoveLeft"] },
///     { "at_ms": 32, "intents": ["Rotate", "HardDrop"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub config: Option<GameConfig>,
    /// Starting board; empty when absent.
    #[serde(default)]
    pub board: Option<Board>,
    #[serde(default)]
    pub frames: Vec<ScriptFrame>,
}

/// Intents active at one point in time, measured from the start of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScriptFrame {
    pub at_ms: u64,
    #[serde(default)]
    pub intents: Intents,
}

impl ScriptFrame {
    pub fn at(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }
}

impl ReplayScript {
    /// Checks that frame times never go backwards.
    pub fn validate(&self) -> anyhow::Result<()> {
        for pair in self.frames.windows(2) {
            anyhow::ensure!(
                pair[0].at_ms <= pair[1].at_ms,
                "frame times must not decrease: {}ms is followed by {}ms",
                pair[0].at_ms,
                pair[1].at_ms
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use electris_engine::Intent;

    use super::*;

    #[test]
    fn test_parse_minimal_script() {
        let script: ReplayScript = serde_json::from_str(
            r#"{ "frames": [{ "at_ms": 16 }, { "at_ms": 32, "intents": ["HardDrop"] }] }"#,
        )
        .unwrap();
        assert!(script.config.is_none());
        assert!(script.board.is_none());
        assert_eq!(script.frames.len(), 2);
        assert!(script.frames[0].intents.is_empty());
        assert!(script.frames[1].intents.contains(Intent::HardDrop));
        assert_eq!(script.frames[1].at(), Duration::from_millis(32));
        script.validate().unwrap();
    }

    #[test]
    fn test_decreasing_times_are_rejected() {
        let script: ReplayScript =
            serde_json::from_str(r#"{ "frames": [{ "at_ms": 50 }, { "at_ms": 40 }] }"#).unwrap();
        let err = script.validate().unwrap_err();
        assert!(err.to_string().contains("50ms"), "{err}");
    }

    #[test]
    fn test_script_config_and_board() {
        let mut rows = vec!["000"; Board::ROWS];
        rows[Board::ROWS - 1] = "1ff";
        let json = format!(
            r#"{{ "config": {{ "start_level": 12, "preview": false }}, "board": "{}" }}"#,
            rows.join(",")
        );
        let script: ReplayScript = serde_json::from_str(&json).unwrap();

        let config = script.config.unwrap();
        assert_eq!(config.start_level.get(), 0);
        assert!(!config.preview);
        assert_eq!(script.board.unwrap().filled_cells(), 9);
        assert!(script.frames.is_empty());
    }
}
