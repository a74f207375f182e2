use crate::reports;
use clap::Args;
use reach_study::diagnostics::TracingDiagnostics;
use reach_study::study::compare_databases;
use reach_study::ReachResult;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Databases as `name=path` (a bare path is named after its file)
    #[arg(required = true)]
    pub databases: Vec<String>,
}

fn split_named(entry: &str) -> (String, PathBuf) {
    match entry.split_once('=') {
        Some((name, path)) if !name.is_empty() => (name.to_string(), PathBuf::from(path)),
        _ => {
            let path = PathBuf::from(entry);
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| entry.to_string());
            (name, path)
        }
    }
}

pub fn run(args: CompareArgs) -> ReachResult<()> {
    let named: Vec<(String, PathBuf)> = args.databases.iter().map(|e| split_named(e)).collect();
    let results = compare_databases(&named, TracingDiagnostics::shared("reach::compare"))?;
    reports::print_comparison_report(&results);
    Ok(())
}
