use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.options.silent);

    match cli.action() {
        Command::Build => commands::build(&cli.options),
        Command::Lookup { term, bodies } => commands::lookup(&cli.options, &term, bodies),
    }
}

fn init_tracing(silent: bool) {
    let env_filter = if silent {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();
}
