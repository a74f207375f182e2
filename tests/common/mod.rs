#![allow(dead_code)]

use nalgebra::DMatrix;
use reach_study::error::{ReachError, ReachResult};
use reach_study::joints::PoseMap;
use reach_study::kinematics::{ChainDescription, ChainModel};
use reach_study::model::{JointGroup, JointModel, PlanningScene, RobotModel, VariableBounds};
use reach_study::record::{JointState, Pose, Quaternion};
use reach_study::ReachRecord;
use std::collections::HashMap;

pub const PLANAR_JSON: &str = r#"{
    "name": "planar",
    "base_frame": "base_link",
    "joints": [
        {"name": "shoulder", "type": "revolute", "child": "upper_arm",
         "axis": [0, 0, 1], "limits": {"lower": -3.0, "upper": 3.0}, "link_radius": 0.05},
        {"name": "elbow", "type": "revolute", "child": "forearm",
         "origin": {"xyz": [0.3, 0, 0]}, "axis": [0, 0, 1],
         "limits": {"lower": -2.5, "upper": 2.5}, "link_radius": 0.04}
    ],
    "tool_offset": {"xyz": [0.25, 0, 0]},
    "groups": [{"name": "arm", "joints": ["shoulder", "elbow"]}]
}"#;

/// Two revolute joints stacked on the same vertical axis.
pub const ALIGNED_JSON: &str = r#"{
    "name": "aligned",
    "joints": [
        {"name": "j1", "type": "revolute", "child": "l1",
         "axis": [0, 0, 1], "limits": {"lower": -3.0, "upper": 3.0}},
        {"name": "j2", "type": "revolute", "child": "l2",
         "origin": {"xyz": [0, 0, 0.3]}, "axis": [0, 0, 1],
         "limits": {"lower": -3.0, "upper": 3.0}}
    ],
    "tool_offset": {"xyz": [0.4, 0, 0]},
    "groups": [{"name": "arm", "joints": ["j1", "j2"]}]
}"#;

pub fn chain(json: &str) -> ChainModel {
    let desc: ChainDescription = serde_json::from_str(json).unwrap();
    ChainModel::from_description(desc).unwrap()
}

pub fn pose_map(entries: &[(&str, f64)]) -> PoseMap {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Groups only, no kinematics or collision world.
pub struct StaticModel {
    groups: HashMap<String, JointGroup>,
}

impl StaticModel {
    pub fn new(groups: Vec<JointGroup>) -> Self {
        Self {
            groups: groups.into_iter().map(|g| (g.name.clone(), g)).collect(),
        }
    }

    /// One group `arm` with joints `j0..jn` and the given bounds.
    pub fn with_bounds(bounds: &[(f64, f64)]) -> Self {
        let joints = bounds
            .iter()
            .enumerate()
            .map(|(i, &(lo, hi))| JointModel::single(format!("j{}", i), lo, hi))
            .collect();
        Self::new(vec![JointGroup::new("arm", joints).unwrap()])
    }

    /// Group `mobile` whose first joint has two variables.
    pub fn with_planar_base() -> Self {
        let base = JointModel {
            name: "base".to_string(),
            bounds: vec![VariableBounds::new(-1.0, 1.0), VariableBounds::new(-5.0, 5.0)],
        };
        let lift = JointModel::single("lift", 0.0, 1.0);
        Self::new(vec![JointGroup::new("mobile", vec![base, lift]).unwrap()])
    }
}

impl RobotModel for StaticModel {
    fn name(&self) -> &str {
        "static"
    }

    fn joint_group(&self, name: &str) -> Option<&JointGroup> {
        self.groups.get(name)
    }

    fn knows_frame(&self, _frame: &str) -> bool {
        false
    }

    fn jacobian(&self, _group: &JointGroup, _positions: &[f64]) -> ReachResult<DMatrix<f64>> {
        Err(ReachError::Kinematics("static model has no kinematics".into()))
    }

    fn create_scene(&self) -> ReachResult<Box<dyn PlanningScene>> {
        Err(ReachError::Scene("static model has no scene".into()))
    }
}

pub fn record(id: &str, reached: bool, score: f64) -> ReachRecord {
    let goal = Pose::new(
        [0.1 * id.len() as f64, -0.25, 0.7],
        Quaternion {
            x: 0.0,
            y: 0.7071067811865476,
            z: 0.0,
            w: 0.7071067811865476,
        },
    );
    let seed = JointState::new(vec!["j1".into(), "j2".into()], vec![0.0, 0.0]);
    let goal_state = if reached {
        JointState::new(vec!["j1".into(), "j2".into()], vec![0.31, -1.17])
    } else {
        JointState::default()
    };
    ReachRecord::new(id, reached, goal, "manipulator", seed, goal_state, score)
}
