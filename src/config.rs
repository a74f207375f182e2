use crate::error::{ReachError, ReachResult};
use crate::scorer::ScorerKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const PACKAGE_SCHEME: &str = "package://";
pub const FILE_SCHEME: &str = "file://";

/// Runtime parameters handed to a scorer at initialization.
///
/// Every field is optional at parse time. Each scorer checks for the
/// fields it depends on and fails initialization when one is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerParams {
    pub planning_groups: Option<Vec<String>>,

    // === Distance scorer ===
    pub distance_threshold: Option<f64>,
    pub collision_mesh_package: Option<String>,
    pub collision_mesh_filename_path: Option<String>,
    pub collision_mesh_frame: Option<String>,
    pub touch_links: Option<Vec<String>>,
    pub exponent: Option<f64>,
}

/// Fully-validated distance scorer parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceParams {
    pub distance_threshold: f64,
    pub collision_mesh_package: String,
    pub collision_mesh_filename_path: String,
    pub collision_mesh_frame: String,
    pub touch_links: Vec<String>,
    pub exponent: f64,
}

impl ScorerParams {
    pub fn with_planning_groups<S: Into<String>>(groups: impl IntoIterator<Item = S>) -> Self {
        Self {
            planning_groups: Some(groups.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn planning_groups(&self, scorer: &str) -> ReachResult<&[String]> {
        self.planning_groups.as_deref().ok_or_else(|| {
            ReachError::Config(format!(
                "{} is missing 'planning_groups' parameter",
                scorer
            ))
        })
    }

    pub fn distance_params(&self, scorer: &str) -> ReachResult<DistanceParams> {
        let missing =
            || ReachError::Config(format!("{} is missing one or more configuration parameters", scorer));

        let distance_threshold = self.distance_threshold.ok_or_else(missing)?;
        if !distance_threshold.is_finite() || distance_threshold <= 0.0 {
            return Err(ReachError::Config(format!(
                "{}: distance_threshold must be a positive finite number, got {}",
                scorer, distance_threshold
            )));
        }

        let exponent = self.exponent.ok_or_else(missing)?;
        if !exponent.is_finite() {
            return Err(ReachError::Config(format!(
                "{}: exponent must be finite, got {}",
                scorer, exponent
            )));
        }

        Ok(DistanceParams {
            distance_threshold,
            collision_mesh_package: self.collision_mesh_package.clone().ok_or_else(missing)?,
            collision_mesh_filename_path: self
                .collision_mesh_filename_path
                .clone()
                .ok_or_else(missing)?,
            collision_mesh_frame: self.collision_mesh_frame.clone().ok_or_else(missing)?,
            touch_links: self.touch_links.clone().ok_or_else(missing)?,
            exponent,
        })
    }
}

/// Which scorer to build and with what parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub name: ScorerKind,
    #[serde(default)]
    pub params: ScorerParams,
    // Only read by the multiplicative scorer
    #[serde(default)]
    pub plugins: Vec<ScorerKind>,
}

impl EvaluationConfig {
    pub fn new(name: ScorerKind, params: ScorerParams) -> Self {
        Self {
            name,
            params,
            plugins: Vec::new(),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ReachResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Maps package names to directories so `package://` resources resolve
/// to files on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePaths {
    pub package_roots: BTreeMap<String, PathBuf>,
}

impl ResourcePaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package<S: Into<String>, P: Into<PathBuf>>(mut self, package: S, root: P) -> Self {
        self.package_roots.insert(package.into(), root.into());
        self
    }

    /// Parses a `name=dir` pair as given on the command line.
    pub fn parse_package_root(arg: &str) -> ReachResult<(String, PathBuf)> {
        match arg.split_once('=') {
            Some((name, dir)) if !name.trim().is_empty() && !dir.trim().is_empty() => {
                Ok((name.trim().to_string(), PathBuf::from(dir.trim())))
            }
            _ => Err(ReachError::Config(format!(
                "Invalid package root '{}', expected <package>=<directory>",
                arg
            ))),
        }
    }

    pub fn resolve(&self, resource: &str) -> ReachResult<PathBuf> {
        if let Some(rest) = resource.strip_prefix(PACKAGE_SCHEME) {
            let (package, relative) = rest.split_once('/').ok_or_else(|| {
                ReachError::Scene(format!("Malformed package resource '{}'", resource))
            })?;
            let root = self.package_roots.get(package).ok_or_else(|| {
                ReachError::Scene(format!(
                    "Package '{}' is not registered (resource '{}')",
                    package, resource
                ))
            })?;
            Ok(root.join(relative))
        } else if let Some(path) = resource.strip_prefix(FILE_SCHEME) {
            Ok(PathBuf::from(path))
        } else {
            Ok(PathBuf::from(resource))
        }
    }
}
