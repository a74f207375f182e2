use super::{build, Scorer, ScorerKind};
use crate::config::EvaluationConfig;
use crate::diagnostics::{Diagnostics, Severity};
use crate::error::{ReachError, ReachResult};
use crate::joints::PoseMap;
use crate::model::RobotModel;
use std::sync::Arc;

/// Multiplies the scores of several other scorers.
///
/// Plugins share the parent's parameters. A plugin that fails to initialize
/// is dropped with a warning.
pub struct MultiplicativeScorer {
    plugins: Vec<Box<dyn Scorer>>,
}

impl MultiplicativeScorer {
    pub fn new(
        config: &EvaluationConfig,
        model: Arc<dyn RobotModel>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> ReachResult<Self> {
        let mut plugins = Vec::with_capacity(config.plugins.len());
        for &kind in &config.plugins {
            diagnostics.report(
                Severity::Info,
                &format!("Creating shared instance of plugin '{}'", kind),
            );
            let plugin_config = EvaluationConfig::new(kind, config.params.clone());
            match build(&plugin_config, model.clone(), diagnostics.clone()) {
                Ok(plugin) => plugins.push(plugin),
                Err(e) => diagnostics.report(
                    Severity::Warn,
                    &format!(
                        "Plugin '{}' failed to be initialized ({}); excluding it from the list",
                        kind, e
                    ),
                ),
            }
        }

        if plugins.is_empty() {
            diagnostics.report(Severity::Error, "No valid plugins remain");
            return Err(ReachError::Config("No valid plugins remain".to_string()));
        }
        Ok(Self { plugins })
    }

    pub fn plugin_kinds(&self) -> Vec<ScorerKind> {
        self.plugins.iter().map(|p| p.kind()).collect()
    }
}

impl Scorer for MultiplicativeScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Multiplicative
    }

    fn calculate_score(&self, pose: &PoseMap, group: &str) -> f64 {
        self.plugins
            .iter()
            .map(|p| p.calculate_score(pose, group))
            .product()
    }
}
