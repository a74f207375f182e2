use crate::config::ScorerParams;
use crate::diagnostics::{Diagnostics, Severity};
use crate::error::{ReachError, ReachResult};
use crate::joints::{JointConfiguration, PoseMap};
use crate::model::{JointGroup, RobotModel};
use std::collections::HashMap;

/// Reports `err` as an initialization failure and hands it back.
pub(crate) fn init_failure(diagnostics: &dyn Diagnostics, err: ReachError) -> ReachError {
    diagnostics.report(Severity::Error, &err.to_string());
    err
}

/// Planning groups a scorer was configured for, resolved against the model.
#[derive(Debug, Clone)]
pub struct GroupTable {
    groups: HashMap<String, JointGroup>,
}

impl GroupTable {
    pub fn resolve(
        scorer: &str,
        params: &ScorerParams,
        model: &dyn RobotModel,
        diagnostics: &dyn Diagnostics,
    ) -> ReachResult<Self> {
        let names = params
            .planning_groups(scorer)
            .map_err(|e| init_failure(diagnostics, e))?;

        let mut groups = HashMap::with_capacity(names.len());
        for name in names {
            let group = model.joint_group(name).ok_or_else(|| {
                diagnostics.report(
                    Severity::Error,
                    &format!("Failed to get joint model group for '{}'", name),
                );
                ReachError::UnknownGroup(name.clone())
            })?;
            groups.insert(name.clone(), group.clone());
        }
        Ok(Self { groups })
    }

    pub fn get(&self, name: &str) -> Option<&JointGroup> {
        self.groups.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &JointGroup)> + '_ {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Looks up `group` and projects `pose` onto it. Failures are reported
    /// and yield `None`, which callers turn into a zero score.
    pub fn project(
        &self,
        scorer: &str,
        pose: &PoseMap,
        group: &str,
        diagnostics: &dyn Diagnostics,
    ) -> Option<(&JointGroup, JointConfiguration)> {
        let Some(jg) = self.groups.get(group) else {
            diagnostics.report(
                Severity::Error,
                &format!("{}: planning group '{}' was not configured", scorer, group),
            );
            return None;
        };

        match JointConfiguration::project(pose, jg) {
            Ok(cfg) => Some((jg, cfg)),
            Err(e) => {
                diagnostics.report(
                    Severity::Error,
                    &format!("{}: failed to transcribe input pose map: {}", scorer, e),
                );
                None
            }
        }
    }
}
