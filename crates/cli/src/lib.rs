pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::rank::RankArgs;

#[derive(Debug, Parser)]
#[command(
    name = "giftwise",
    about = "Giftwise operator CLI",
    long_about = "Inspect configuration, check storefront readiness, and run the fallback ranker offline.",
    after_help = "Examples:\n  giftwise doctor --json\n  giftwise config\n  giftwise rank --catalog products.json --interests \"coffee, books\" --budget-max 2000"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and storefront catalog connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Rank a local JSON product catalog with the fallback ranker")]
    Rank(RankArgs),
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Rank(args) => commands::rank::run(&args),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
