mod common;

use common::{record, PLANAR_JSON};
use reach_study::ReachDatabase;
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct TestContext {
    dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Saves a database with one reached (0.8) and one unreached record.
    fn half_reached_db(&self, name: &str) -> PathBuf {
        let db = ReachDatabase::new();
        db.put(record("0", true, 0.8));
        db.put(record("1", false, 0.0));
        let path = self.path(name);
        db.save(&path).unwrap();
        path
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_reach"))
            .args(args)
            .current_dir(self.dir.path())
            .output()
            .expect("Failed to execute reach binary")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_summary_prints_results() {
    let ctx = TestContext::new();
    let db = ctx.half_reached_db("reach.db");

    let output = ctx.run(&["summary", db.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let out = stdout(&output);
    assert!(Regex::new(r"Percent Reached\s*\|\s*50\.00%").unwrap().is_match(&out));
    assert!(Regex::new(r"Normalized Total Pose Score\s*\|\s*1\.6000").unwrap().is_match(&out));
}

#[test]
fn test_summary_save_writes_results_back() {
    let ctx = TestContext::new();
    let db_path = ctx.half_reached_db("reach.db");

    let output = ctx.run(&["summary", db_path.to_str().unwrap(), "--save"]);
    assert!(output.status.success());

    let db = ReachDatabase::new();
    assert!(db.load(&db_path));
    assert_eq!(db.results().reach_percentage, 50.0);
}

#[test]
fn test_summary_missing_database_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["summary", "missing.db"]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_compare_tables_every_database() {
    let ctx = TestContext::new();
    let a = ctx.half_reached_db("a.db");
    let b = ctx.half_reached_db("b.db");

    let output = ctx.run(&[
        "compare",
        &format!("first={}", a.display()),
        &format!("second={}", b.display()),
    ]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("first"));
    assert!(out.contains("second"));
    assert!(out.contains("Comparison vs Best"));
}

#[test]
fn test_compare_needs_two_loadable_databases() {
    let ctx = TestContext::new();
    let a = ctx.half_reached_db("a.db");
    let output = ctx.run(&["compare", a.to_str().unwrap(), "ghost.db"]);
    assert!(!output.status.success());
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains("cannot compare fewer than 2 databases"));
}

#[test]
fn test_merge_combines_inputs() {
    let ctx = TestContext::new();
    let a = ctx.half_reached_db("a.db");

    let other = ReachDatabase::new();
    other.put(record("1", true, 0.4));
    other.put(record("2", true, 0.6));
    let b = ctx.path("b.db");
    other.save(&b).unwrap();

    let out_path = ctx.path("merged.db");
    let output = ctx.run(&[
        "merge",
        out_path.to_str().unwrap(),
        a.to_str().unwrap(),
        b.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let merged = ReachDatabase::new();
    assert!(merged.load(&out_path));
    assert_eq!(merged.size(), 3);
    assert!(merged.get("1").unwrap().reached);
    assert_eq!(merged.results().reach_percentage, 100.0);
}

#[test]
fn test_score_joint_limit() {
    let ctx = TestContext::new();
    let model = ctx.write("robot.json", PLANAR_JSON);
    let config = ctx.write(
        "scorer.json",
        r#"{"name": "JointLimitScorer", "params": {"planning_groups": ["arm"]}}"#,
    );
    let state = ctx.write("state.json", r#"{"shoulder": 0.0, "elbow": 0.0}"#);

    let output = ctx.run(&[
        "score",
        "--model",
        model.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--state",
        state.to_str().unwrap(),
        "--group",
        "arm",
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let re = Regex::new(r"score = ([0-9.eE+-]+)").unwrap();
    let out = stdout(&output);
    let caps = re.captures(&out).expect("score line");
    let score: f64 = caps[1].parse().unwrap();
    let expected = 1.0 - (-0.0625f64).exp();
    assert!((score - expected).abs() < 1e-12);
}

#[test]
fn test_score_distance_with_package_root() {
    let ctx = TestContext::new();
    let model = ctx.write("robot.json", PLANAR_JSON);
    ctx.write("cell/meshes/part.csv", "0.5,0,0\n");
    let config = ctx.write(
        "scorer.json",
        r#"{
            "name": "DistanceScorer",
            "params": {
                "planning_groups": ["arm"],
                "distance_threshold": 0.16,
                "collision_mesh_package": "cell",
                "collision_mesh_filename_path": "meshes/part.csv",
                "collision_mesh_frame": "base_link",
                "touch_links": [],
                "exponent": 1.0
            }
        }"#,
    );
    let state = ctx.write(
        "state.json",
        r#"{"name": ["shoulder", "elbow"], "position": [0.0, 0.0]}"#,
    );
    let root = format!("cell={}", ctx.path("cell").display());

    let output = ctx.run(&[
        "score",
        "--model",
        model.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--state",
        state.to_str().unwrap(),
        "--group",
        "arm",
        "--package-root",
        &root,
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let re = Regex::new(r"score = ([0-9.eE+-]+)").unwrap();
    let out = stdout(&output);
    let score: f64 = re.captures(&out).expect("score line")[1].parse().unwrap();
    assert!((score - 1.0).abs() < 1e-9);
}

#[test]
fn test_score_with_unknown_group_fails() {
    let ctx = TestContext::new();
    let model = ctx.write("robot.json", PLANAR_JSON);
    let config = ctx.write(
        "scorer.json",
        r#"{"name": "ManipulabilityScorer", "params": {"planning_groups": ["torso"]}}"#,
    );
    let state = ctx.write("state.json", r#"{"shoulder": 0.0}"#);

    let output = ctx.run(&[
        "score",
        "--model",
        model.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--state",
        state.to_str().unwrap(),
        "--group",
        "torso",
    ]);
    assert_eq!(output.status.code(), Some(1));
}
