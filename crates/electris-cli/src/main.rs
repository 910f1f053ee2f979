mod command;
mod script;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
