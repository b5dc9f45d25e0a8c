pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "stockwise",
    about = "Stockwise operator CLI",
    long_about = "Operate the Stockwise inventory engine: migrations, demo seeds, simulations, reports, and store-wide stats.",
    after_help = "Examples:\n  stockwise migrate\n  stockwise seed\n  stockwise simulate reordering --dry-run\n  stockwise report sales daily\n  stockwise stats"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo catalog and order history")]
    Seed,
    #[command(
        about = "Run one simulation scenario (seasonal|stockout|pricing|reordering|expiry|sales|restructure)"
    )]
    Simulate {
        #[arg(help = "Scenario tag to run")]
        scenario: String,
        #[arg(long, help = "Plan adjustments without committing them")]
        dry_run: bool,
    },
    #[command(about = "Generate a report series for a reporting period")]
    Report {
        #[arg(help = "Report tag (same seven tags as simulate)")]
        report: String,
        #[arg(help = "Reporting period: daily|weekly|monthly", default_value = "daily")]
        period: String,
    },
    #[command(about = "Print store-wide inventory statistics")]
    Stats,
}

pub fn run() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Simulate { scenario, dry_run } => commands::simulate::run(&scenario, dry_run),
        Command::Report { report, period } => commands::report::run(&report, &period),
        Command::Stats => commands::stats::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second init in the same process (tests) is fine to ignore.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
