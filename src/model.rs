//! Seams to the robot stack.
//!
//! The kinematic model and the collision scene are external capabilities.
//! Scorers only see them through [`RobotModel`] and [`PlanningScene`], so a
//! different backend can be plugged in without touching the scoring code.
//! [`crate::kinematics::ChainModel`] and [`crate::scene::PointCloudScene`]
//! are the built-in implementations.

use crate::config::PACKAGE_SCHEME;
use crate::error::{ReachError, ReachResult};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Identifier under which the reach object is added to a planning scene.
pub const REACH_OBJECT_ID: &str = "reach_object";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableBounds {
    pub min_position: f64,
    pub max_position: f64,
}

impl VariableBounds {
    pub fn new(min_position: f64, max_position: f64) -> Self {
        Self {
            min_position,
            max_position,
        }
    }

    pub fn range(&self) -> f64 {
        self.max_position - self.min_position
    }
}

/// An active joint and the bounds of each of its variables.
///
/// Revolute and prismatic joints carry exactly one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct JointModel {
    pub name: String,
    pub bounds: Vec<VariableBounds>,
}

impl JointModel {
    pub fn single<S: Into<String>>(name: S, min_position: f64, max_position: f64) -> Self {
        Self {
            name: name.into(),
            bounds: vec![VariableBounds::new(min_position, max_position)],
        }
    }

    pub fn variable_count(&self) -> usize {
        self.bounds.len()
    }
}

/// A named planning group: its active joints in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct JointGroup {
    pub name: String,
    joints: Vec<JointModel>,
}

impl JointGroup {
    pub fn new<S: Into<String>>(name: S, joints: Vec<JointModel>) -> ReachResult<Self> {
        let name = name.into();
        let mut seen = HashSet::new();
        for joint in &joints {
            if !seen.insert(joint.name.as_str()) {
                return Err(ReachError::Validation(format!(
                    "Group '{}' lists joint '{}' twice",
                    name, joint.name
                )));
            }
            if joint.bounds.is_empty() {
                return Err(ReachError::Validation(format!(
                    "Joint '{}' in group '{}' has no variable bounds",
                    joint.name, name
                )));
            }
        }
        Ok(Self { name, joints })
    }

    pub fn joints(&self) -> &[JointModel] {
        &self.joints
    }

    pub fn active_joint_names(&self) -> Vec<String> {
        self.joints.iter().map(|j| j.name.clone()).collect()
    }

    pub fn active_joint_bounds(&self) -> impl Iterator<Item = (&str, &[VariableBounds])> + '_ {
        self.joints
            .iter()
            .map(|j| (j.name.as_str(), j.bounds.as_slice()))
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

/// A mesh placed in the scene at a named frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionObject {
    pub id: String,
    pub frame: String,
    pub mesh_resource: String,
}

impl CollisionObject {
    pub fn from_package(package: &str, relative_path: &str, frame: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            frame: frame.to_string(),
            mesh_resource: format!(
                "{}{}/{}",
                PACKAGE_SCHEME,
                package,
                relative_path.trim_start_matches('/')
            ),
        }
    }
}

/// Read-only kinematic model of a robot.
///
/// Implementations must be safe for concurrent reads: scorers call into the
/// model from many worker threads at once.
pub trait RobotModel: Send + Sync {
    fn name(&self) -> &str;

    fn joint_group(&self, name: &str) -> Option<&JointGroup>;

    fn knows_frame(&self, frame: &str) -> bool;

    /// Geometric Jacobian (6 x n, linear rows first) of `group` with its
    /// active joints at `positions`; every other joint sits at zero.
    fn jacobian(&self, group: &JointGroup, positions: &[f64]) -> ReachResult<DMatrix<f64>>;

    /// Fresh planning scene containing only the robot.
    fn create_scene(&self) -> ReachResult<Box<dyn PlanningScene>>;
}

/// Collision world around the robot.
pub trait PlanningScene: Send + Sync {
    fn knows_frame_transform(&self, frame: &str) -> bool;

    fn process_collision_object(&mut self, object: &CollisionObject) -> ReachResult<()>;

    /// Marks contact between `object` and each of `links` as allowed (or not).
    fn allow_collision(&mut self, object: &str, links: &[String], allowed: bool);

    /// Signed clearance between the posed robot and the scene geometry,
    /// honoring the allowed-collision entries. Negative means penetration.
    fn distance_to_collision(&self, group: &JointGroup, positions: &[f64]) -> ReachResult<f64>;
}
