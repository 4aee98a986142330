use clap::Parser;

mod cli;
mod interactive;
mod terminal;
mod transport;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
