use super::groups::{init_failure, GroupTable};
use super::{Scorer, ScorerKind};
use crate::config::ScorerParams;
use crate::diagnostics::{Diagnostics, Severity};
use crate::error::{ReachError, ReachResult};
use crate::joints::PoseMap;
use crate::model::RobotModel;
use std::collections::HashMap;
use std::sync::Arc;

/// Product over joints of `(x - lo)(hi - x) / (hi - lo)^2`.
///
/// Peaks at `0.25^n` with every joint at its midpoint, reaches zero on any
/// bound and turns negative when an odd number of joints are outside.
pub fn joint_limit_penalty(positions: &[f64], min: &[f64], max: &[f64]) -> f64 {
    positions
        .iter()
        .zip(min.iter().zip(max))
        .map(|(&x, (&lo, &hi))| {
            let range = hi - lo;
            (x - lo) * (hi - x) / (range * range)
        })
        .product()
}

/// `max(0, 1 - exp(-penalty))`. A NaN penalty scores zero.
pub fn joint_limit_score(penalty: f64) -> f64 {
    (1.0 - (-penalty).exp()).max(0.0)
}

#[derive(Debug, Clone)]
struct GroupLimits {
    min: Vec<f64>,
    max: Vec<f64>,
}

/// Rewards configurations far from every joint limit.
pub struct JointLimitScorer {
    groups: GroupTable,
    limits: HashMap<String, GroupLimits>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl JointLimitScorer {
    pub fn new(
        params: &ScorerParams,
        model: &dyn RobotModel,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> ReachResult<Self> {
        let name = ScorerKind::JointLimit.to_string();
        let groups = GroupTable::resolve(&name, params, model, diagnostics.as_ref())?;

        let mut limits = HashMap::with_capacity(groups.len());
        for (group_name, group) in groups.iter() {
            let mut min = Vec::with_capacity(group.joint_count());
            let mut max = Vec::with_capacity(group.joint_count());
            for (joint, bounds) in group.active_joint_bounds() {
                if bounds.len() > 1 {
                    // Only the first variable's bounds are used
                    diagnostics.report(
                        Severity::Fatal,
                        &format!(
                            "Joint '{}' has more than one DOF; can't pull joint limits correctly",
                            joint
                        ),
                    );
                }
                let first = bounds.first().ok_or_else(|| {
                    init_failure(
                        diagnostics.as_ref(),
                        ReachError::Validation(format!("Joint '{}' has no bounds", joint)),
                    )
                })?;
                min.push(first.min_position);
                max.push(first.max_position);
            }
            limits.insert(group_name.to_string(), GroupLimits { min, max });
        }

        Ok(Self {
            groups,
            limits,
            diagnostics,
        })
    }

    /// Precomputed lower and upper bounds of `group`, in joint order.
    pub fn limits(&self, group: &str) -> Option<(&[f64], &[f64])> {
        self.limits
            .get(group)
            .map(|l| (l.min.as_slice(), l.max.as_slice()))
    }
}

impl Scorer for JointLimitScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::JointLimit
    }

    fn calculate_score(&self, pose: &PoseMap, group: &str) -> f64 {
        let diagnostics = self.diagnostics.as_ref();
        let Some((_, cfg)) = self.groups.project("JointLimitScorer", pose, group, diagnostics)
        else {
            return 0.0;
        };
        let Some((min, max)) = self.limits(group) else {
            return 0.0;
        };
        joint_limit_score(joint_limit_penalty(cfg.positions(), min, max))
    }
}
