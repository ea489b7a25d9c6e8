use clap::Parser;
use organizer::cli::{Args, exit_code, run_cli};
use organizer::output::OutputFormatter;
use std::process::ExitCode;
use tracing::Level;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = run_cli(&args);
    if let Err(e) = &result {
        OutputFormatter::error(&format!("Error: {}", e));
    }
    ExitCode::from(exit_code(&result))
}
