mod app;

use anyhow::Result;
use app::{App, Cli, Outcome};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let mut app = match App::from_cli(&cli) {
        Ok(app) => app,
        Err(err) => {
            println!("The study cannot start: {err:#}");
            println!("Please contact the experimenter.");
            return Ok(ExitCode::FAILURE);
        }
    };

    let stdin = std::io::stdin();
    match app.run(stdin.lock(), std::io::stdout())? {
        Outcome::Completed => {}
        Outcome::Abandoned => println!("\nSession ended before all trials were answered."),
    }

    Ok(ExitCode::SUCCESS)
}
