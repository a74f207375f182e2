//! Helpers for driving and inspecting studies.

use crate::database::ReachDatabase;
use crate::diagnostics::{Diagnostics, Severity};
use crate::error::{ReachError, ReachResult};
use crate::joints::PoseMap;
use crate::results::StudyResults;
use crate::scorer::Scorer;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const SAVED_DB_NAME: &str = "reach.db";
pub const OPT_SAVED_DB_NAME: &str = "optimized_reach.db";

/// Loads each named database and returns its stored aggregate.
///
/// Databases that fail to load are reported and left out. At least two must
/// load for the comparison to make sense.
pub fn compare_databases<S, P>(
    named_paths: &[(S, P)],
    diagnostics: Arc<dyn Diagnostics>,
) -> ReachResult<Vec<(String, StudyResults)>>
where
    S: AsRef<str>,
    P: AsRef<Path>,
{
    let mut loaded = Vec::with_capacity(named_paths.len());
    for (name, path) in named_paths {
        let db = ReachDatabase::with_diagnostics(diagnostics.clone());
        if db.load(path.as_ref()) {
            loaded.push((name.as_ref().to_string(), db.results()));
        } else {
            diagnostics.report(
                Severity::Warn,
                &format!(
                    "Skipping '{}': could not load '{}'",
                    name.as_ref(),
                    path.as_ref().display()
                ),
            );
        }
    }

    if loaded.len() < 2 {
        return Err(ReachError::Validation(format!(
            "cannot compare fewer than 2 databases ({} loaded)",
            loaded.len()
        )));
    }
    Ok(loaded)
}

/// Resumes from the optimized database in `dir` if present, otherwise from
/// the initial one. Returns the file that was loaded.
pub fn load_with_fallback<P: AsRef<Path>>(db: &ReachDatabase, dir: P) -> Option<PathBuf> {
    let dir = dir.as_ref();
    [OPT_SAVED_DB_NAME, SAVED_DB_NAME]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists() && db.load(path))
}

/// Scores every configuration with one shared scorer, in parallel. The
/// output order matches the input order.
pub fn par_score(scorer: &dyn Scorer, configurations: &[PoseMap], group: &str) -> Vec<f64> {
    configurations
        .par_iter()
        .map(|pose| scorer.calculate_score(pose, group))
        .collect()
}
