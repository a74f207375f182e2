//! Serial-chain robot model.
//!
//! A [`ChainModel`] is an ordered list of single-DOF joints from the base
//! frame to the tool. It stores each joint's static origin and axis, which
//! is all that forward kinematics and the geometric Jacobian need. Chains
//! are described in JSON (see [`ChainDescription`]).

use crate::config::ResourcePaths;
use crate::error::{ReachError, ReachResult};
use crate::model::{JointGroup, JointModel, PlanningScene, RobotModel};
use crate::scene::PointCloudScene;
use nalgebra::{DMatrix, Isometry3, Translation3, Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointKind {
    Revolute,
    Continuous,
    Prismatic,
}

/// Translation + roll/pitch/yaw, as found in URDF `<origin>` tags.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Origin {
    pub xyz: [f64; 3],
    pub rpy: [f64; 3],
}

impl Origin {
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            xyz: [x, y, z],
            rpy: [0.0; 3],
        }
    }

    pub fn to_isometry(&self) -> Isometry3<f64> {
        let translation = Translation3::new(self.xyz[0], self.xyz[1], self.xyz[2]);
        let rotation = UnitQuaternion::from_euler_angles(self.rpy[0], self.rpy[1], self.rpy[2]);
        Isometry3::from_parts(translation, rotation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainJointSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: JointKind,
    /// Link frame that moves with this joint.
    pub child: String,
    #[serde(default)]
    pub origin: Origin,
    pub axis: [f64; 3],
    #[serde(default)]
    pub limits: Option<Limits>,
    /// Collision radius of the child link, used by the point-cloud scene.
    #[serde(default)]
    pub link_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    pub joints: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDescription {
    pub name: String,
    #[serde(default = "default_base_frame")]
    pub base_frame: String,
    pub joints: Vec<ChainJointSpec>,
    #[serde(default)]
    pub tool_offset: Origin,
    pub groups: Vec<GroupSpec>,
}

fn default_base_frame() -> String {
    "base_link".to_string()
}

impl ChainDescription {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ReachResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[derive(Debug, Clone)]
struct ChainJoint {
    name: String,
    child: String,
    origin: Isometry3<f64>,
    axis: Unit<Vector3<f64>>,
    is_prismatic: bool,
    link_radius: f64,
}

#[derive(Debug, Clone)]
struct GroupEntry {
    group: JointGroup,
    chain_indices: Vec<usize>,
}

/// Pose of a link frame together with its collision radius.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkFrame {
    pub link: String,
    pub pose: Isometry3<f64>,
    pub radius: f64,
}

#[derive(Debug, Clone)]
pub struct ChainModel {
    name: String,
    base_frame: String,
    joints: Vec<ChainJoint>,
    tool_offset: Isometry3<f64>,
    groups: HashMap<String, GroupEntry>,
    resources: ResourcePaths,
}

impl ChainModel {
    pub fn from_description(desc: ChainDescription) -> ReachResult<Self> {
        if desc.joints.is_empty() {
            return Err(ReachError::Validation(format!(
                "Chain '{}' has no joints",
                desc.name
            )));
        }

        let mut joints = Vec::with_capacity(desc.joints.len());
        let mut joint_models = HashMap::new();
        let mut index_of = HashMap::new();

        for (idx, joint) in desc.joints.iter().enumerate() {
            let axis = Vector3::new(joint.axis[0], joint.axis[1], joint.axis[2]);
            let axis = Unit::try_new(axis, 1e-9).ok_or_else(|| {
                ReachError::Validation(format!("Joint '{}' has a zero-length axis", joint.name))
            })?;

            let (lower, upper) = match (joint.kind, joint.limits) {
                (JointKind::Continuous, _) => (-PI, PI),
                (_, Some(l)) => (l.lower, l.upper),
                (_, None) => {
                    return Err(ReachError::Validation(format!(
                        "Joint '{}' requires limits",
                        joint.name
                    )))
                }
            };
            if lower > upper {
                return Err(ReachError::Validation(format!(
                    "Joint '{}' has lower limit {} above upper limit {}",
                    joint.name, lower, upper
                )));
            }

            if index_of.insert(joint.name.clone(), idx).is_some() {
                return Err(ReachError::Validation(format!(
                    "Joint '{}' is defined twice",
                    joint.name
                )));
            }
            joint_models.insert(joint.name.clone(), JointModel::single(&joint.name, lower, upper));

            joints.push(ChainJoint {
                name: joint.name.clone(),
                child: joint.child.clone(),
                origin: joint.origin.to_isometry(),
                axis,
                is_prismatic: joint.kind == JointKind::Prismatic,
                link_radius: joint.link_radius,
            });
        }

        let mut groups = HashMap::new();
        for g in &desc.groups {
            if g.joints.is_empty() {
                return Err(ReachError::Validation(format!("Group '{}' is empty", g.name)));
            }
            let mut members = Vec::with_capacity(g.joints.len());
            let mut chain_indices = Vec::with_capacity(g.joints.len());
            for joint_name in &g.joints {
                let idx = *index_of.get(joint_name).ok_or_else(|| {
                    ReachError::Validation(format!(
                        "Group '{}' references unknown joint '{}'",
                        g.name, joint_name
                    ))
                })?;
                members.push(joint_models[joint_name].clone());
                chain_indices.push(idx);
            }
            let group = JointGroup::new(&g.name, members)?;
            groups.insert(
                g.name.clone(),
                GroupEntry {
                    group,
                    chain_indices,
                },
            );
        }

        Ok(Self {
            name: desc.name,
            base_frame: desc.base_frame,
            joints,
            tool_offset: desc.tool_offset.to_isometry(),
            groups,
            resources: ResourcePaths::default(),
        })
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ReachResult<Self> {
        Self::from_description(ChainDescription::load_from_file(path)?)
    }

    /// Resource roots used by scenes created from this model.
    pub fn with_resources(mut self, resources: ResourcePaths) -> Self {
        self.resources = resources;
        self
    }

    pub fn resources(&self) -> &ResourcePaths {
        &self.resources
    }

    pub fn base_frame(&self) -> &str {
        &self.base_frame
    }

    pub fn dof(&self) -> usize {
        self.joints.len()
    }

    /// Expands group positions to a full chain configuration; joints outside
    /// the group stay at zero.
    fn full_positions(&self, group: &JointGroup, positions: &[f64]) -> ReachResult<Vec<f64>> {
        let entry = self
            .groups
            .get(&group.name)
            .ok_or_else(|| ReachError::UnknownGroup(group.name.clone()))?;
        if positions.len() != entry.chain_indices.len() {
            return Err(ReachError::Kinematics(format!(
                "Group '{}' expects {} positions, got {}",
                group.name,
                entry.chain_indices.len(),
                positions.len()
            )));
        }

        let mut q = vec![0.0; self.joints.len()];
        for (&idx, &value) in entry.chain_indices.iter().zip(positions) {
            q[idx] = value;
        }
        Ok(q)
    }

    fn joint_motion(joint: &ChainJoint, value: f64) -> Isometry3<f64> {
        if joint.is_prismatic {
            Isometry3::from_parts(
                Translation3::from(joint.axis.into_inner() * value),
                UnitQuaternion::identity(),
            )
        } else {
            Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&joint.axis, value),
            )
        }
    }

    /// Tool pose in the base frame for a full chain configuration.
    pub fn forward_kinematics(&self, q: &[f64]) -> ReachResult<Isometry3<f64>> {
        self.check_dof(q)?;
        let mut transform = Isometry3::identity();
        for (joint, &value) in self.joints.iter().zip(q) {
            transform *= joint.origin;
            transform *= Self::joint_motion(joint, value);
        }
        Ok(transform * self.tool_offset)
    }

    /// Poses of every child link for a full chain configuration.
    pub fn link_frames(&self, q: &[f64]) -> ReachResult<Vec<LinkFrame>> {
        self.check_dof(q)?;
        let mut transform = Isometry3::identity();
        let mut frames = Vec::with_capacity(self.joints.len());
        for (joint, &value) in self.joints.iter().zip(q) {
            transform *= joint.origin;
            transform *= Self::joint_motion(joint, value);
            frames.push(LinkFrame {
                link: joint.child.clone(),
                pose: transform,
                radius: joint.link_radius,
            });
        }
        Ok(frames)
    }

    pub fn group_link_frames(
        &self,
        group: &JointGroup,
        positions: &[f64],
    ) -> ReachResult<Vec<LinkFrame>> {
        let q = self.full_positions(group, positions)?;
        self.link_frames(&q)
    }

    /// Pose of a named frame with every joint at zero.
    pub fn frame_transform(&self, frame: &str) -> Option<Isometry3<f64>> {
        if frame == self.base_frame {
            return Some(Isometry3::identity());
        }
        let zero = vec![0.0; self.joints.len()];
        self.link_frames(&zero)
            .ok()?
            .into_iter()
            .find(|f| f.link == frame)
            .map(|f| f.pose)
    }

    fn check_dof(&self, q: &[f64]) -> ReachResult<()> {
        if q.len() != self.joints.len() {
            return Err(ReachError::Kinematics(format!(
                "Chain '{}' has {} joints, got {} positions",
                self.name,
                self.joints.len(),
                q.len()
            )));
        }
        Ok(())
    }
}

impl RobotModel for ChainModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn joint_group(&self, name: &str) -> Option<&JointGroup> {
        self.groups.get(name).map(|e| &e.group)
    }

    fn knows_frame(&self, frame: &str) -> bool {
        frame == self.base_frame || self.joints.iter().any(|j| j.child == frame)
    }

    fn jacobian(&self, group: &JointGroup, positions: &[f64]) -> ReachResult<DMatrix<f64>> {
        let q = self.full_positions(group, positions)?;
        let entry = &self.groups[&group.name];

        // Joint origins and axes in the base frame, before each joint moves
        let mut transform = Isometry3::identity();
        let mut origins = Vec::with_capacity(self.joints.len());
        let mut axes = Vec::with_capacity(self.joints.len());
        for (joint, &value) in self.joints.iter().zip(&q) {
            transform *= joint.origin;
            origins.push(transform.translation.vector);
            axes.push(transform.rotation * joint.axis.into_inner());
            transform *= Self::joint_motion(joint, value);
        }
        let ee_pos = (transform * self.tool_offset).translation.vector;

        let mut jacobian = DMatrix::zeros(6, entry.chain_indices.len());
        for (col, &idx) in entry.chain_indices.iter().enumerate() {
            let z = axes[idx];
            if self.joints[idx].is_prismatic {
                jacobian[(0, col)] = z.x;
                jacobian[(1, col)] = z.y;
                jacobian[(2, col)] = z.z;
            } else {
                let linear = z.cross(&(ee_pos - origins[idx]));
                jacobian[(0, col)] = linear.x;
                jacobian[(1, col)] = linear.y;
                jacobian[(2, col)] = linear.z;
                jacobian[(3, col)] = z.x;
                jacobian[(4, col)] = z.y;
                jacobian[(5, col)] = z.z;
            }
        }
        Ok(jacobian)
    }

    fn create_scene(&self) -> ReachResult<Box<dyn PlanningScene>> {
        Ok(Box::new(PointCloudScene::new(
            Arc::new(self.clone()),
            self.resources.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn planar_two_link() -> ChainModel {
        let json = r#"{
            "name": "planar",
            "joints": [
                {"name": "shoulder", "type": "revolute", "child": "upper_arm",
                 "axis": [0, 0, 1], "limits": {"lower": -3.0, "upper": 3.0}},
                {"name": "elbow", "type": "revolute", "child": "forearm",
                 "origin": {"xyz": [0.3, 0, 0]}, "axis": [0, 0, 1],
                 "limits": {"lower": -2.5, "upper": 2.5}}
            ],
            "tool_offset": {"xyz": [0.25, 0, 0]},
            "groups": [{"name": "arm", "joints": ["shoulder", "elbow"]}]
        }"#;
        let desc: ChainDescription = serde_json::from_str(json).unwrap();
        ChainModel::from_description(desc).unwrap()
    }

    #[test]
    fn test_forward_kinematics_planar() {
        let model = planar_two_link();
        let tip = model.forward_kinematics(&[0.0, std::f64::consts::FRAC_PI_2]).unwrap();
        assert_relative_eq!(tip.translation.x, 0.3, epsilon = 1e-12);
        assert_relative_eq!(tip.translation.y, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_jacobian_matches_finite_difference() {
        let model = planar_two_link();
        let group = model.joint_group("arm").unwrap().clone();
        let q = [0.4, -0.7];
        let jac = model.jacobian(&group, &q).unwrap();

        let h = 1e-7;
        for col in 0..2 {
            let mut plus = q;
            let mut minus = q;
            plus[col] += h;
            minus[col] -= h;
            let p1 = model.forward_kinematics(&plus).unwrap().translation.vector;
            let p0 = model.forward_kinematics(&minus).unwrap().translation.vector;
            let numeric = (p1 - p0) / (2.0 * h);
            for row in 0..3 {
                assert_relative_eq!(jac[(row, col)], numeric[row], epsilon = 1e-6);
            }
            assert_relative_eq!(jac[(5, col)], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_frames_are_known() {
        let model = planar_two_link();
        assert!(model.knows_frame("base_link"));
        assert!(model.knows_frame("forearm"));
        assert!(!model.knows_frame("table"));
        let forearm = model.frame_transform("forearm").unwrap();
        assert_relative_eq!(forearm.translation.x, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_group_referencing_unknown_joint_is_rejected() {
        let mut desc: ChainDescription = serde_json::from_str(
            r#"{"name": "bad", "joints": [{"name": "j1", "type": "continuous", "child": "l1", "axis": [0,0,1]}],
                "groups": [{"name": "arm", "joints": ["j2"]}]}"#,
        )
        .unwrap();
        assert!(ChainModel::from_description(desc.clone()).is_err());

        desc.groups[0].joints = vec!["j1".into()];
        let model = ChainModel::from_description(desc).unwrap();
        let group = model.joint_group("arm").unwrap();
        assert_relative_eq!(group.joints()[0].bounds[0].min_position, -PI);
    }
}
