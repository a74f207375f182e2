use crate::reports;
use clap::Args;
use reach_study::diagnostics::TracingDiagnostics;
use reach_study::{ReachDatabase, ReachResult};
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// Database file to summarize
    pub database: PathBuf,

    /// Write the recomputed results back to the database
    #[arg(long, default_value_t = false)]
    pub save: bool,
}

pub fn run(args: SummaryArgs) -> ReachResult<()> {
    let db = ReachDatabase::with_diagnostics(TracingDiagnostics::shared("reach::summary"));
    db.try_load(&args.database)?;
    info!(records = db.size(), "Loaded '{}'", args.database.display());

    db.calculate_results();
    db.print_results();

    let name = args
        .database
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.database.display().to_string());
    reports::print_results_table(&name, db.size(), &db.results());

    if args.save {
        db.save(&args.database)?;
        info!("Saved recomputed results to '{}'", args.database.display());
    }
    Ok(())
}
