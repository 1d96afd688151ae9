use std::io::IsTerminal;

use clap::Parser;
use taf::cli::commands::Cli;
use taf::cli::handlers;
use taf::cli::output::{Style, paint};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env("TAF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = handlers::dispatch(cli) {
        let color = std::io::stderr().is_terminal();
        eprintln!("{}", paint(&format!("error: {}", e), Style::Error, color));
        std::process::exit(1);
    }
}
