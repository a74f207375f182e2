use super::groups::GroupTable;
use super::{Scorer, ScorerKind};
use crate::config::ScorerParams;
use crate::diagnostics::{Diagnostics, Severity};
use crate::error::ReachResult;
use crate::joints::PoseMap;
use crate::model::RobotModel;
use nalgebra::DMatrix;
use std::sync::Arc;

/// Product of the singular values of `jacobian`.
pub fn manipulability(jacobian: &DMatrix<f64>) -> f64 {
    if jacobian.is_empty() {
        return 0.0;
    }
    jacobian.singular_values().iter().product()
}

/// Scores a configuration by the manipulability of the group's Jacobian.
pub struct ManipulabilityScorer {
    model: Arc<dyn RobotModel>,
    groups: GroupTable,
    diagnostics: Arc<dyn Diagnostics>,
}

impl ManipulabilityScorer {
    pub fn new(
        params: &ScorerParams,
        model: Arc<dyn RobotModel>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> ReachResult<Self> {
        let name = ScorerKind::Manipulability.to_string();
        let groups = GroupTable::resolve(&name, params, model.as_ref(), diagnostics.as_ref())?;
        Ok(Self {
            model,
            groups,
            diagnostics,
        })
    }
}

impl Scorer for ManipulabilityScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Manipulability
    }

    fn calculate_score(&self, pose: &PoseMap, group: &str) -> f64 {
        let diagnostics = self.diagnostics.as_ref();
        let Some((jg, cfg)) = self.groups.project("ManipulabilityScorer", pose, group, diagnostics)
        else {
            return 0.0;
        };

        match self.model.jacobian(jg, cfg.positions()) {
            Ok(jacobian) => manipulability(&jacobian),
            Err(e) => {
                diagnostics.report(
                    Severity::Error,
                    &format!("ManipulabilityScorer: failed to compute Jacobian: {}", e),
                );
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_product_of_singular_values() {
        let m = DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 3.0]);
        assert_relative_eq!(manipulability(&m), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rank_deficient_matrix() {
        let m = DMatrix::from_row_slice(3, 2, &[1.0, 1.0, 2.0, 2.0, 0.5, 0.5]);
        assert!(manipulability(&m).abs() < 1e-12);
    }
}
