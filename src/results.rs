use crate::record::ReachRecord;
use serde::{Deserialize, Serialize};

/// Aggregate statistics of a study.
///
/// Everything except the two neighbor metrics is recomputed from the record
/// set by [`StudyResults::from_records`]. The neighbor metrics are filled in
/// by external analysis and only carried through save/load.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyResults {
    pub total_pose_score: f64,
    pub norm_total_pose_score: f64,
    pub reach_percentage: f64,
    pub avg_num_neighbors: f64,
    pub avg_joint_distance: f64,
}

impl StudyResults {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ReachRecord>,
    {
        let mut total = 0usize;
        let mut reached = 0usize;
        let mut total_pose_score = 0.0;
        for rec in records {
            total += 1;
            if rec.reached {
                reached += 1;
                total_pose_score += rec.score;
            }
        }

        if total == 0 {
            return Self::default();
        }

        let fraction = reached as f64 / total as f64;
        Self {
            total_pose_score,
            norm_total_pose_score: if reached > 0 {
                total_pose_score / fraction
            } else {
                0.0
            },
            reach_percentage: 100.0 * fraction,
            ..Self::default()
        }
    }

    /// Recomputes the record-derived fields, keeping the neighbor metrics.
    pub fn recalculate<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a ReachRecord>,
    {
        let fresh = Self::from_records(records);
        self.total_pose_score = fresh.total_pose_score;
        self.norm_total_pose_score = fresh.norm_total_pose_score;
        self.reach_percentage = fresh.reach_percentage;
    }
}
