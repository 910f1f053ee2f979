use clap::{Parser, Subcommand};

use self::{catalog::CatalogArg, run::RunArg};

mod catalog;
mod run;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run a game headless, from a replay script or under gravity alone
    Run(#[clap(flatten)] RunArg),
    /// Print every tetromino in all four orientations
    Catalog(#[clap(flatten)] CatalogArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Run(arg) => run::run(&arg)?,
        Mode::Catalog(arg) => catalog::run(&arg)?,
    }
    Ok(())
}
