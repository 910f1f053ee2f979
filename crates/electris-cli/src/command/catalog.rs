use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::Context as _;
use electris_engine::{PieceKind, Shape};
use serde::Serialize;

use crate::util::Output;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct CatalogArg {
    /// Write the catalog as JSON instead of drawing it
    #[arg(long)]
    json: bool,
    /// Output file path for `--json`
    #[arg(long, requires = "json")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CatalogEntry {
    kind: PieceKind,
    rotations: [Shape; 4],
}

pub(crate) fn run(arg: &CatalogArg) -> anyhow::Result<()> {
    if arg.json {
        let entries: Vec<_> = PieceKind::ALL
            .into_iter()
            .map(|kind| CatalogEntry {
                kind,
                rotations: *kind.rotations(),
            })
            .collect();
        return Output::save_json(&entries, arg.output.clone());
    }

    let mut out = io::stdout().lock();
    for kind in PieceKind::ALL {
        writeln!(out, "{}:", kind.as_char())?;
        for (index, shape) in kind.rotations().iter().enumerate() {
            writeln!(out, "  rotation {index}")?;
            for line in shape.to_string().lines() {
                writeln!(out, "    {line}")?;
            }
        }
    }
    out.flush().context("Failed to flush stdout")?;
    Ok(())
}
