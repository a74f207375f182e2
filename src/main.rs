use clap::{Parser, Subcommand};
use std::process;
use tracing::{error, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect, merge and score reach studies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recompute and print the results of one database
    Summary(cmd::summary::SummaryArgs),
    /// Compare the results of several databases
    Compare(cmd::compare::CompareArgs),
    /// Merge databases into one (later inputs win on id clashes)
    Merge(cmd::merge::MergeArgs),
    /// Score one joint state with a configured scorer
    Score(cmd::score::ScoreArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Commands::Summary(args) => cmd::summary::run(args),
        Commands::Compare(args) => cmd::compare::run(args),
        Commands::Merge(args) => cmd::merge::run(args),
        Commands::Score(args) => cmd::score::run(args),
    };

    if let Err(e) = outcome {
        error!("{}", e);
        process::exit(1);
    }
}
