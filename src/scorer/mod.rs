//! Pose scoring.
//!
//! A scorer is built once against a robot model and a configuration and is
//! then queried from any number of threads. The set of scorers is closed:
//! [`ScorerKind`] lists them and [`build`] is the registry.

pub mod distance;
pub mod groups;
pub mod joint_limit;
pub mod manipulability;
pub mod multiplicative;

pub use self::distance::DistanceScorer;
pub use self::joint_limit::JointLimitScorer;
pub use self::manipulability::ManipulabilityScorer;
pub use self::multiplicative::MultiplicativeScorer;

use crate::config::EvaluationConfig;
use crate::diagnostics::Diagnostics;
use crate::error::ReachResult;
use crate::joints::PoseMap;
use crate::model::RobotModel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
pub enum ScorerKind {
    #[strum(to_string = "DistanceScorer", serialize = "distance")]
    #[serde(rename = "DistanceScorer", alias = "distance")]
    Distance,
    #[strum(to_string = "JointLimitScorer", serialize = "joint_limit")]
    #[serde(rename = "JointLimitScorer", alias = "joint_limit")]
    JointLimit,
    #[strum(to_string = "ManipulabilityScorer", serialize = "manipulability")]
    #[serde(rename = "ManipulabilityScorer", alias = "manipulability")]
    Manipulability,
    #[strum(to_string = "MultiplicativeFactory", serialize = "multiplicative")]
    #[serde(rename = "MultiplicativeFactory", alias = "multiplicative")]
    Multiplicative,
}

/// Names accepted by the registry.
pub fn registered_scorers() -> Vec<String> {
    ScorerKind::iter().map(|k| k.to_string()).collect()
}

pub trait Scorer: Send + Sync {
    fn kind(&self) -> ScorerKind;

    /// Scores the joint positions of `group` found in `pose`.
    ///
    /// Never fails: a pose that cannot be projected onto the group scores
    /// `0.0` and the problem is reported through the scorer's diagnostics.
    fn calculate_score(&self, pose: &PoseMap, group: &str) -> f64;
}

/// Builds and initializes the scorer named by `config`.
pub fn build(
    config: &EvaluationConfig,
    model: Arc<dyn RobotModel>,
    diagnostics: Arc<dyn Diagnostics>,
) -> ReachResult<Box<dyn Scorer>> {
    let scorer: Box<dyn Scorer> = match config.name {
        ScorerKind::Distance => Box::new(DistanceScorer::new(&config.params, model, diagnostics)?),
        ScorerKind::JointLimit => {
            Box::new(JointLimitScorer::new(&config.params, model.as_ref(), diagnostics)?)
        }
        ScorerKind::Manipulability => {
            Box::new(ManipulabilityScorer::new(&config.params, model, diagnostics)?)
        }
        ScorerKind::Multiplicative => {
            Box::new(MultiplicativeScorer::new(config, model, diagnostics)?)
        }
    };
    Ok(scorer)
}
