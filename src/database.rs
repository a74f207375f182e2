//! Thread-safe store of reach records.
//!
//! All access goes through one mutex around the record map and the
//! aggregate. Scoring never happens under the lock: producers build a
//! complete [`ReachRecord`] first and only then call [`ReachDatabase::put`].

use crate::diagnostics::{Diagnostics, Severity, TracingDiagnostics};
use crate::error::{ReachError, ReachResult};
use crate::record::ReachRecord;
use crate::results::StudyResults;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tempfile::NamedTempFile;

/// Version stamped into every saved database.
pub const FORMAT_VERSION: u32 = 1;

fn legacy_version() -> u32 {
    FORMAT_VERSION
}

/// Serializable form of a database: records sorted by id plus the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    #[serde(default = "legacy_version")]
    pub format_version: u32,
    pub records: Vec<ReachRecord>,
    #[serde(flatten)]
    pub results: StudyResults,
}

impl DatabaseSnapshot {
    /// Names the first float that JSON cannot carry (NaN or an infinity).
    pub fn find_non_finite(&self) -> Option<String> {
        let aggregate = [
            ("total_pose_score", self.results.total_pose_score),
            ("norm_total_pose_score", self.results.norm_total_pose_score),
            ("reach_percentage", self.results.reach_percentage),
            ("avg_num_neighbors", self.results.avg_num_neighbors),
            ("avg_joint_distance", self.results.avg_joint_distance),
        ];
        if let Some((field, value)) = aggregate.iter().find(|(_, v)| !v.is_finite()) {
            return Some(format!("{} = {}", field, value));
        }

        self.records.iter().find_map(|r| {
            let q = &r.goal_pose.orientation;
            let orientation = [q.x, q.y, q.z, q.w];
            let fields: [(&str, &[f64]); 5] = [
                ("score", std::slice::from_ref(&r.score)),
                ("goal_pose.position", &r.goal_pose.position),
                ("goal_pose.orientation", &orientation),
                ("seed_state", &r.seed_state.position),
                ("goal_state", &r.goal_state.position),
            ];
            fields.iter().find_map(|(field, values)| {
                values
                    .iter()
                    .find(|v| !v.is_finite())
                    .map(|v| format!("record '{}' {} = {}", r.id, field, v))
            })
        })
    }
}

#[derive(Debug, Default)]
struct DatabaseState {
    records: HashMap<String, ReachRecord>,
    results: StudyResults,
}

pub struct ReachDatabase {
    state: Mutex<DatabaseState>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Default for ReachDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl ReachDatabase {
    pub fn new() -> Self {
        Self::with_diagnostics(TracingDiagnostics::shared("reach_database"))
    }

    pub fn with_diagnostics(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            state: Mutex::new(DatabaseState::default()),
            diagnostics,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DatabaseState> {
        // Every critical section is a single map or struct assignment
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Inserts or replaces the record with the same id.
    pub fn put(&self, record: ReachRecord) {
        let mut state = self.lock();
        state.records.insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<ReachRecord> {
        self.lock().records.get(id).cloned()
    }

    pub fn size(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    pub fn records(&self) -> Vec<ReachRecord> {
        self.lock().records.values().cloned().collect()
    }

    /// Recomputes the aggregate from the current records. An empty database
    /// keeps its current aggregate.
    pub fn calculate_results(&self) {
        let mut state = self.lock();
        if state.records.is_empty() {
            return;
        }
        let DatabaseState { records, results } = &mut *state;
        results.recalculate(records.values());
    }

    pub fn results(&self) -> StudyResults {
        self.lock().results
    }

    pub fn set_average_neighbors_count(&self, value: f64) {
        self.lock().results.avg_num_neighbors = value;
    }

    pub fn set_average_joint_distance(&self, value: f64) {
        self.lock().results.avg_joint_distance = value;
    }

    pub fn snapshot(&self) -> DatabaseSnapshot {
        let state = self.lock();
        let mut records: Vec<ReachRecord> = state.records.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        DatabaseSnapshot {
            format_version: FORMAT_VERSION,
            records,
            results: state.results,
        }
    }

    /// Writes every record and the aggregate to `path`.
    ///
    /// The file is written next to the destination and renamed into place,
    /// so a failed save never leaves a truncated database behind. Non-finite
    /// floats are rejected before anything is written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ReachResult<()> {
        let path = path.as_ref();
        let snapshot = self.snapshot();
        if let Some(field) = snapshot.find_non_finite() {
            return Err(ReachError::Persistence(format!(
                "Unable to save database to file '{}': non-finite value {}",
                path.display(),
                field
            )));
        }

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir).map_err(|e| {
            ReachError::Persistence(format!(
                "Unable to save database to file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut writer = BufWriter::new(tmp);
        serde_json::to_writer_pretty(&mut writer, &snapshot)?;
        writer.flush()?;
        let tmp = writer
            .into_inner()
            .map_err(|e| ReachError::Persistence(e.to_string()))?;
        tmp.persist(path).map_err(|e| {
            ReachError::Persistence(format!(
                "Unable to save database to file '{}': {}",
                path.display(),
                e.error
            ))
        })?;

        self.diagnostics.report(
            Severity::Debug,
            &format!(
                "Saved {} records to '{}'",
                snapshot.records.len(),
                path.display()
            ),
        );
        Ok(())
    }

    /// Merges the records stored at `path` into this database and adopts the
    /// stored aggregate. Returns `false` (after reporting why) when the file
    /// cannot be read.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        match self.try_load(path) {
            Ok(()) => true,
            Err(e) => {
                self.diagnostics.report(
                    Severity::Error,
                    &format!("Unable to load database from '{}': {}", path.display(), e),
                );
                false
            }
        }
    }

    pub fn try_load<P: AsRef<Path>>(&self, path: P) -> ReachResult<()> {
        let content = fs::read_to_string(path)?;
        let snapshot: DatabaseSnapshot = serde_json::from_str(&content)?;
        if snapshot.format_version > FORMAT_VERSION {
            return Err(ReachError::Persistence(format!(
                "Unsupported database format version {} (newest known is {})",
                snapshot.format_version, FORMAT_VERSION
            )));
        }

        let mut state = self.lock();
        for record in snapshot.records {
            state.records.insert(record.id.clone(), record);
        }
        state.results = snapshot.results;
        Ok(())
    }

    pub fn print_results(&self) {
        let r = self.results();
        let rule = "------------------------------------------------";
        self.diagnostics.report(Severity::Info, rule);
        self.diagnostics.report(
            Severity::Info,
            &format!("Percent Reached = {}", r.reach_percentage),
        );
        self.diagnostics.report(
            Severity::Info,
            &format!("Total points score = {}", r.total_pose_score),
        );
        self.diagnostics.report(
            Severity::Info,
            &format!("Normalized total points score = {}", r.norm_total_pose_score),
        );
        self.diagnostics.report(Severity::Info, rule);
    }
}
