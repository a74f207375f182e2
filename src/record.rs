use crate::joints::PoseMap;
use nalgebra::{Isometry3, Quaternion as NaQuaternion, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

/// Target end-effector pose: position plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: [f64; 3],
    pub orientation: Quaternion,
}

impl Pose {
    pub fn new(position: [f64; 3], orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn from_isometry(iso: &Isometry3<f64>) -> Self {
        let t = iso.translation.vector;
        let q = iso.rotation.quaternion();
        Self {
            position: [t.x, t.y, t.z],
            orientation: Quaternion {
                x: q.i,
                y: q.j,
                z: q.k,
                w: q.w,
            },
        }
    }

    /// Normalizes the stored quaternion.
    pub fn to_isometry(&self) -> Isometry3<f64> {
        let [x, y, z] = self.position;
        let q = self.orientation;
        let rotation = UnitQuaternion::from_quaternion(NaQuaternion::new(q.w, q.x, q.y, q.z));
        Isometry3::from_parts(Translation3::new(x, y, z), rotation)
    }
}

/// Joint names with matching positions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointState {
    pub name: Vec<String>,
    pub position: Vec<f64>,
}

impl JointState {
    pub fn new(name: Vec<String>, position: Vec<f64>) -> Self {
        Self { name, position }
    }

    pub fn from_map(map: &PoseMap) -> Self {
        let (name, position) = map.iter().map(|(k, v)| (k.clone(), *v)).unzip();
        Self { name, position }
    }

    /// Pairs names with positions; a trailing name without a position is
    /// dropped.
    pub fn to_map(&self) -> PoseMap {
        self.name
            .iter()
            .cloned()
            .zip(self.position.iter().copied())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

/// Outcome of evaluating one target pose for one planning group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReachRecord {
    pub id: String,
    pub reached: bool,
    pub goal_pose: Pose,
    pub planning_group: String,
    pub seed_state: JointState,
    pub goal_state: JointState,
    pub score: f64,
}

impl ReachRecord {
    pub fn new<S: Into<String>, G: Into<String>>(
        id: S,
        reached: bool,
        goal_pose: Pose,
        planning_group: G,
        seed_state: JointState,
        goal_state: JointState,
        score: f64,
    ) -> Self {
        Self {
            id: id.into(),
            reached,
            goal_pose,
            planning_group: planning_group.into(),
            seed_state,
            goal_state,
            score,
        }
    }

    /// A record for a pose that could not be reached.
    pub fn unreached<S: Into<String>, G: Into<String>>(
        id: S,
        goal_pose: Pose,
        planning_group: G,
        seed_state: JointState,
    ) -> Self {
        Self::new(
            id,
            false,
            goal_pose,
            planning_group,
            seed_state,
            JointState::default(),
            0.0,
        )
    }
}
