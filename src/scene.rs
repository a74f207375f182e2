//! Point-cloud collision scene for a [`ChainModel`].
//!
//! Objects are vertex clouds read from CSV files (`x,y,z` per row). Each
//! robot link is a sphere around its frame origin, so clearance is the
//! distance from that origin to the closest vertex minus the link radius.

use crate::config::ResourcePaths;
use crate::error::{ReachError, ReachResult};
use crate::kinematics::ChainModel;
use crate::model::{CollisionObject, JointGroup, PlanningScene};
use nalgebra::Point3;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Reads vertices from a headerless or headed CSV file. Rows that do not
/// hold three numbers are skipped.
pub fn load_vertex_cloud<P: AsRef<Path>>(path: P) -> ReachResult<Vec<Point3<f64>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        ReachError::Scene(format!("Could not open mesh '{}': {}", path.display(), e))
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut vertices = Vec::new();
    let mut skipped = 0usize;
    for result in rdr.records() {
        let rec = result?;
        if rec.len() < 3 {
            skipped += 1;
            continue;
        }
        let coords: Result<Vec<f64>, _> = (0..3).map(|i| rec[i].parse::<f64>()).collect();
        match coords {
            Ok(c) => vertices.push(Point3::new(c[0], c[1], c[2])),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(mesh = %path.display(), skipped, "Skipped non-vertex rows");
    }
    if vertices.is_empty() {
        return Err(ReachError::Scene(format!(
            "Mesh '{}' contains no vertices",
            path.display()
        )));
    }
    Ok(vertices)
}

pub struct PointCloudScene {
    model: Arc<ChainModel>,
    resources: ResourcePaths,
    // Object id -> vertices in the base frame
    objects: HashMap<String, Vec<Point3<f64>>>,
    allowed: HashSet<(String, String)>,
}

impl PointCloudScene {
    pub fn new(model: Arc<ChainModel>, resources: ResourcePaths) -> Self {
        Self {
            model,
            resources,
            objects: HashMap::new(),
            allowed: HashSet::new(),
        }
    }

    pub fn object_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.objects.keys().map(String::as_str)
    }

    pub fn is_allowed(&self, object: &str, link: &str) -> bool {
        self.allowed
            .contains(&(object.to_string(), link.to_string()))
    }
}

impl PlanningScene for PointCloudScene {
    fn knows_frame_transform(&self, frame: &str) -> bool {
        self.model.frame_transform(frame).is_some()
    }

    fn process_collision_object(&mut self, object: &CollisionObject) -> ReachResult<()> {
        let frame = self
            .model
            .frame_transform(&object.frame)
            .ok_or_else(|| ReachError::UnknownFrame(object.frame.clone()))?;
        let path = self.resources.resolve(&object.mesh_resource)?;
        let vertices = load_vertex_cloud(&path)?
            .into_iter()
            .map(|v| frame * v)
            .collect::<Vec<_>>();

        debug!(
            object = %object.id,
            frame = %object.frame,
            vertices = vertices.len(),
            "Attached collision object"
        );
        self.objects.insert(object.id.clone(), vertices);
        Ok(())
    }

    fn allow_collision(&mut self, object: &str, links: &[String], allowed: bool) {
        for link in links {
            let key = (object.to_string(), link.clone());
            if allowed {
                self.allowed.insert(key);
            } else {
                self.allowed.remove(&key);
            }
        }
    }

    fn distance_to_collision(&self, group: &JointGroup, positions: &[f64]) -> ReachResult<f64> {
        if self.objects.is_empty() {
            return Err(ReachError::Scene(
                "no collision objects in planning scene".to_string(),
            ));
        }

        let links = self.model.group_link_frames(group, positions)?;
        let mut clearance = f64::INFINITY;
        for (id, vertices) in &self.objects {
            for link in &links {
                if self.is_allowed(id, &link.link) {
                    continue;
                }
                let origin = Point3::from(link.pose.translation.vector);
                let nearest = vertices
                    .iter()
                    .map(|v| nalgebra::distance(&origin, v))
                    .fold(f64::INFINITY, f64::min);
                clearance = clearance.min(nearest - link.radius);
            }
        }
        Ok(clearance)
    }
}
