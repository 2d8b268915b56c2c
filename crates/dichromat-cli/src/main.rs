//! Dichromat CLI - color-vision screening plates and result analysis.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{Cli, Commands, ExitCode};
use config::AppConfig;
use output::JsonOutput;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = AppConfig::load();
    let out = JsonOutput::stdout(cli.pretty || config.output.pretty.unwrap_or(false));

    let result = match cli.command {
        Commands::Plate(ref args) => commands::plate::run(args, &config, &out).map(|()| ExitCode::Success),
        Commands::Session(ref args) => {
            commands::plate::run_session(args, &config, &out).map(|()| ExitCode::Success)
        }
        Commands::Explore(ref args) => {
            commands::explore::run(args, &config, &out).map(|()| ExitCode::Success)
        }
        Commands::Presets => commands::explore::run_presets(&out).map(|()| ExitCode::Success),
        Commands::Luminance(ref args) => {
            commands::luminance::run(args, &out).map(|()| ExitCode::Success)
        }
        Commands::Simulate(ref args) => {
            commands::simulate::run(args, &out).map(|()| ExitCode::Success)
        }
        Commands::Generate(ref args) => {
            commands::generate::run(args, &config, &out).map(|()| ExitCode::Success)
        }
        Commands::Assign(ref args) => commands::assign::run(args, &config, &out),
        Commands::Classify(ref args) => commands::classify::run(args, &out),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::Error
        }
    };

    exit_code.into()
}
