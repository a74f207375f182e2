use crate::reports;
use clap::Args;
use reach_study::diagnostics::TracingDiagnostics;
use reach_study::{ReachDatabase, ReachResult};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    /// Destination database
    pub output: PathBuf,

    /// Input databases, merged in order
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

pub fn run(args: MergeArgs) -> ReachResult<()> {
    let db = ReachDatabase::with_diagnostics(TracingDiagnostics::shared("reach::merge"));
    for input in &args.inputs {
        db.try_load(input)?;
        info!(records = db.size(), "Merged '{}'", input.display());
    }

    db.calculate_results();
    db.save(&args.output)?;
    info!("Wrote {} records to '{}'", db.size(), args.output.display());

    reports::print_results_table(&args.output.display().to_string(), db.size(), &db.results());
    Ok(())
}
