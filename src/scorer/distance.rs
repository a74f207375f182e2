use super::groups::{init_failure, GroupTable};
use super::{Scorer, ScorerKind};
use crate::config::{DistanceParams, ScorerParams};
use crate::diagnostics::{Diagnostics, Severity};
use crate::error::{ReachError, ReachResult};
use crate::joints::PoseMap;
use crate::model::{CollisionObject, PlanningScene, RobotModel, REACH_OBJECT_ID};
use std::sync::Arc;
use tracing::debug;

/// `(d / threshold) ^ exponent`, unclamped.
pub fn distance_score(distance: f64, threshold: f64, exponent: f64) -> f64 {
    (distance / threshold).powf(exponent)
}

/// A touch list containing a blank entry allows no links at all.
pub fn normalize_touch_links(links: Vec<String>) -> Vec<String> {
    if links.iter().any(|l| l.trim().is_empty()) {
        Vec::new()
    } else {
        links
    }
}

/// Scores a configuration by its clearance from the reach object.
pub struct DistanceScorer {
    groups: GroupTable,
    scene: Box<dyn PlanningScene>,
    params: DistanceParams,
    diagnostics: Arc<dyn Diagnostics>,
}

impl DistanceScorer {
    pub fn new(
        params: &ScorerParams,
        model: Arc<dyn RobotModel>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> ReachResult<Self> {
        let name = ScorerKind::Distance.to_string();
        let diag = diagnostics.as_ref();

        let mut resolved = params
            .distance_params(&name)
            .map_err(|e| init_failure(diag, e))?;
        resolved.touch_links = normalize_touch_links(resolved.touch_links);

        let groups = GroupTable::resolve(&name, params, model.as_ref(), diag)?;

        let mut scene = model.create_scene().map_err(|e| init_failure(diag, e))?;
        if !scene.knows_frame_transform(&resolved.collision_mesh_frame) {
            return Err(init_failure(
                diag,
                ReachError::UnknownFrame(resolved.collision_mesh_frame.clone()),
            ));
        }

        let object = CollisionObject::from_package(
            &resolved.collision_mesh_package,
            &resolved.collision_mesh_filename_path,
            &resolved.collision_mesh_frame,
            REACH_OBJECT_ID,
        );
        scene.process_collision_object(&object).map_err(|e| {
            init_failure(
                diag,
                ReachError::Scene(format!("Failed to add collision mesh to planning scene: {}", e)),
            )
        })?;
        scene.allow_collision(REACH_OBJECT_ID, &resolved.touch_links, true);

        debug!(
            mesh = %object.mesh_resource,
            frame = %object.frame,
            touch_links = resolved.touch_links.len(),
            "Distance scorer ready"
        );

        Ok(Self {
            groups,
            scene,
            params: resolved,
            diagnostics,
        })
    }

    pub fn params(&self) -> &DistanceParams {
        &self.params
    }
}

impl Scorer for DistanceScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Distance
    }

    fn calculate_score(&self, pose: &PoseMap, group: &str) -> f64 {
        let diagnostics = self.diagnostics.as_ref();
        let Some((jg, cfg)) = self.groups.project("DistanceScorer", pose, group, diagnostics)
        else {
            return 0.0;
        };

        match self.scene.distance_to_collision(jg, cfg.positions()) {
            Ok(d) => distance_score(d, self.params.distance_threshold, self.params.exponent),
            Err(e) => {
                diagnostics.report(
                    Severity::Error,
                    &format!("DistanceScorer: failed to compute clearance: {}", e),
                );
                0.0
            }
        }
    }
}
