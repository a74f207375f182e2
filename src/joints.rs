use crate::error::{ReachError, ReachResult};
use crate::model::JointGroup;
use std::collections::{BTreeMap, HashSet};

/// Joint name -> position, possibly spanning several planning groups.
pub type PoseMap = BTreeMap<String, f64>;

/// Pulls the positions named in `joint_names` out of `input`, in that order.
pub fn transcribe_input_map(
    input: &PoseMap,
    joint_names: &[String],
    group: &str,
) -> ReachResult<Vec<f64>> {
    joint_names
        .iter()
        .map(|name| {
            input
                .get(name)
                .copied()
                .ok_or_else(|| ReachError::MissingJoint {
                    joint: name.clone(),
                    group: group.to_string(),
                })
        })
        .collect()
}

/// Positions for exactly the active joints of one planning group, in the
/// group's canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct JointConfiguration {
    group: String,
    names: Vec<String>,
    positions: Vec<f64>,
}

impl JointConfiguration {
    /// Projects a full pose map onto `group`'s active joints.
    pub fn project(pose: &PoseMap, group: &JointGroup) -> ReachResult<Self> {
        Self::from_names(pose, &group.name, group.active_joint_names())
    }

    pub fn from_names(pose: &PoseMap, group: &str, names: Vec<String>) -> ReachResult<Self> {
        let mut seen = HashSet::with_capacity(names.len());
        if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(ReachError::Validation(format!(
                "Joint '{}' appears more than once in group '{}'",
                dup, group
            )));
        }

        let positions = transcribe_input_map(pose, &names, group)?;
        Ok(Self {
            group: group.to_string(),
            names,
            positions,
        })
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.positions.iter().copied())
    }

    pub fn to_map(&self) -> PoseMap {
        self.iter().map(|(n, p)| (n.to_string(), p)).collect()
    }
}
