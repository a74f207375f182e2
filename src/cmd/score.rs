use crate::reports;
use clap::Args;
use reach_study::config::{EvaluationConfig, ResourcePaths};
use reach_study::diagnostics::TracingDiagnostics;
use reach_study::joints::PoseMap;
use reach_study::kinematics::ChainModel;
use reach_study::model::RobotModel;
use reach_study::record::JointState;
use reach_study::scorer;
use reach_study::ReachResult;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    /// Serial-chain robot description (JSON)
    #[arg(long)]
    pub model: PathBuf,

    /// Scorer configuration (JSON)
    #[arg(long)]
    pub config: PathBuf,

    /// Joint state to score: `{"name": [...], "position": [...]}` or a name -> position map
    #[arg(long)]
    pub state: PathBuf,

    /// Planning group to score
    #[arg(long)]
    pub group: String,

    /// Package root as `package=directory`, used to resolve package:// meshes
    #[arg(long = "package-root")]
    pub package_roots: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StateFile {
    State(JointState),
    Map(PoseMap),
}

fn load_state(path: &Path) -> ReachResult<PoseMap> {
    let content = fs::read_to_string(path)?;
    Ok(match serde_json::from_str::<StateFile>(&content)? {
        StateFile::State(state) => state.to_map(),
        StateFile::Map(map) => map,
    })
}

pub fn run(args: ScoreArgs) -> ReachResult<()> {
    let mut resources = ResourcePaths::new();
    for root in &args.package_roots {
        let (name, dir) = ResourcePaths::parse_package_root(root)?;
        resources = resources.with_package(name, dir);
    }

    let model = ChainModel::load_from_file(&args.model)?.with_resources(resources);
    debug!(model = model.name(), dof = model.dof(), "Loaded robot model");
    let model: Arc<dyn RobotModel> = Arc::new(model);

    let config = EvaluationConfig::load_from_file(&args.config)?;
    let scorer = scorer::build(&config, model, TracingDiagnostics::shared("reach::score"))?;

    let state = load_state(&args.state)?;
    let score = scorer.calculate_score(&state, &args.group);

    reports::print_score_report(&config.name.to_string(), &args.group, &state, score);
    println!("score = {}", score);
    Ok(())
}
