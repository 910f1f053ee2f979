use std::{path::PathBuf, time::Duration};

use electris_engine::{
    Board, Game, GameConfig, GameSnapshot, GameState, Intents, Piece, PieceSeed, RandomPieces,
    StartLevel, Tick,
};
use rand::Rng as _;
use serde::Serialize;

use crate::{
    script::{ReplayScript, ScriptFrame},
    util::{Output, read_json_file},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RunArg {
    /// Replay script with timed intents (JSON)
    script: Option<PathBuf>,
    /// Game config file (JSON); overrides the config embedded in the script
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start level 0-9; anything else starts at level 0
    #[arg(long)]
    level: Option<String>,
    /// Piece seed as 32 hex digits
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Hide the next-piece preview (5 bonus points per lock)
    #[arg(long)]
    no_preview: bool,
    /// Frame rate of the idle loop
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,
    /// Stop after this many frames even if the game is not over
    #[arg(long, default_value_t = 100_000)]
    max_frames: usize,
    /// Keep running under gravity after the script ends
    #[arg(long)]
    idle: bool,
    /// Output file path for the JSON report
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RunReport {
    seed: PieceSeed,
    config: GameConfig,
    frames: usize,
    elapsed_ms: u64,
    locks: Vec<LockRecord>,
    snapshot: GameSnapshot,
}

#[derive(Debug, Serialize)]
struct LockRecord {
    frame: usize,
    at_ms: u64,
    piece: Piece,
    cleared_rows: Vec<usize>,
    points: u16,
}

struct Runner {
    game: Game,
    frames: usize,
    now: Duration,
    locks: Vec<LockRecord>,
}

impl Runner {
    fn new(game: Game) -> Self {
        Self {
            game,
            frames: 0,
            now: Duration::ZERO,
            locks: vec![],
        }
    }

    fn step(&mut self, intents: Intents, now: Duration) -> anyhow::Result<()> {
        self.now = now;
        self.frames += 1;
        let Tick { lock, .. } = self.game.update(intents, now);
        if let Some(lock) = lock {
            self.locks.push(LockRecord {
                frame: self.frames,
                at_ms: u64::try_from(now.as_millis())?,
                piece: lock.piece,
                cleared_rows: lock.cleared_rows.to_vec(),
                points: lock.points,
            });
        }
        Ok(())
    }

    fn is_done(&self, max_frames: usize) -> bool {
        self.game.state().is_game_over() || self.frames >= max_frames
    }

    /// Feeds script frames at their own timestamps.
    fn play_script(&mut self, frames: &[ScriptFrame], max_frames: usize) -> anyhow::Result<()> {
        for frame in frames {
            if self.is_done(max_frames) {
                break;
            }
            self.step(frame.intents, frame.at())?;
        }
        Ok(())
    }

    /// Lets gravity run at a fixed frame interval until the game ends.
    fn idle(&mut self, frame_interval: Duration, max_frames: usize) -> anyhow::Result<()> {
        while !self.is_done(max_frames) {
            let now = self.now + frame_interval;
            self.step(Intents::NONE, now)?;
        }
        Ok(())
    }
}

pub(crate) fn run(arg: &RunArg) -> anyhow::Result<()> {
    let script = match &arg.script {
        Some(path) => {
            eprintln!("Loading replay script from {}...", path.display());
            let script: ReplayScript = read_json_file("replay script", path)?;
            script.validate()?;
            eprintln!("Loaded {} frames", script.frames.len());
            Some(script)
        }
        None => None,
    };

    let mut config = match &arg.config {
        Some(path) => read_json_file("config", path)?,
        None => script
            .as_ref()
            .and_then(|script| script.config)
            .unwrap_or_default(),
    };
    if let Some(level) = &arg.level {
        config.start_level = StartLevel::parse_lenient(level);
    }
    if arg.no_preview {
        config.preview = false;
    }
    if let Some(seed) = arg.seed {
        config.seed = Some(seed);
    }
    let seed = *config.seed.get_or_insert_with(|| rand::rng().random());

    let board = script
        .as_ref()
        .and_then(|script| script.board.clone())
        .unwrap_or(Board::EMPTY);

    eprintln!(
        "Starting at level {} with seed {seed} (preview {})",
        config.start_level,
        if config.preview { "on" } else { "off" }
    );
    let game = Game::with_board(config, board, RandomPieces::with_seed(seed));
    let mut runner = Runner::new(game);

    if let Some(script) = &script {
        runner.play_script(&script.frames, arg.max_frames)?;
    }
    if script.is_none() || arg.idle {
        runner.idle(Duration::from_secs(1) / arg.fps, arg.max_frames)?;
    }

    let snapshot = runner.game.snapshot();
    match snapshot.state {
        GameState::Running => eprintln!("Stopped after {} frames", runner.frames),
        GameState::GameOver(cause) => {
            eprintln!("Game over after {} frames: {cause}", runner.frames);
        }
    }
    eprintln!(
        "Score: {} ({} pieces, {} lines)",
        snapshot.score_text,
        snapshot.stats.locked_pieces(),
        snapshot.stats.cleared_lines()
    );

    let report = RunReport {
        seed,
        config,
        frames: runner.frames,
        elapsed_ms: u64::try_from(runner.now.as_millis())?,
        locks: runner.locks,
        snapshot,
    };
    Output::save_json(&report, arg.output.clone())?;
    Ok(())
}
