mod common;

use common::{chain, pose_map, record, StaticModel, PLANAR_JSON};
use rayon::prelude::*;
use reach_study::config::ScorerParams;
use reach_study::diagnostics::MemoryDiagnostics;
use reach_study::joints::PoseMap;
use reach_study::model::RobotModel;
use reach_study::scorer::{JointLimitScorer, ManipulabilityScorer, Scorer};
use reach_study::study::par_score;
use reach_study::ReachDatabase;
use std::sync::Arc;
use std::thread;

#[test]
fn test_parallel_puts_keep_every_record() {
    let db = ReachDatabase::new();
    (0..2000).into_par_iter().for_each(|i| {
        db.put(record(&i.to_string(), i % 2 == 0, 0.5));
    });
    assert_eq!(db.size(), 2000);

    db.calculate_results();
    assert_eq!(db.results().reach_percentage, 50.0);
}

#[test]
fn test_parallel_overwrites_converge_to_one_record_per_id() {
    let db = ReachDatabase::new();
    (0..4000).into_par_iter().for_each(|i| {
        db.put(record(&(i % 100).to_string(), true, 1.0));
    });
    assert_eq!(db.size(), 100);
}

#[test]
fn test_readers_and_writers_interleave() {
    let db = Arc::new(ReachDatabase::new());
    let writers: Vec<_> = (0..4)
        .map(|t| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for i in 0..250 {
                    db.put(record(&format!("{t}-{i}"), true, 0.1));
                }
            })
        })
        .collect();
    let reader = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            let mut last = 0;
            for _ in 0..500 {
                let n = db.size();
                assert!(n >= last);
                last = n;
                db.calculate_results();
            }
        })
    };

    for w in writers {
        w.join().unwrap();
    }
    reader.join().unwrap();
    assert_eq!(db.size(), 1000);
}

#[test]
fn test_concurrent_scoring_matches_sequential() {
    let model: Arc<dyn RobotModel> = Arc::new(chain(PLANAR_JSON));
    let scorer = ManipulabilityScorer::new(
        &ScorerParams::with_planning_groups(["arm"]),
        model,
        Arc::new(MemoryDiagnostics::new()),
    )
    .unwrap();

    let configs: Vec<PoseMap> = (0..500)
        .map(|i| {
            let t = i as f64 / 500.0;
            pose_map(&[("shoulder", -2.0 + 4.0 * t), ("elbow", 2.0 - 4.0 * t)])
        })
        .collect();

    let sequential: Vec<f64> = configs
        .iter()
        .map(|c| scorer.calculate_score(c, "arm"))
        .collect();
    let parallel = par_score(&scorer, &configs, "arm");
    assert_eq!(parallel, sequential);
}

#[test]
fn test_scorer_shared_across_threads() {
    let model = StaticModel::with_bounds(&[(-1.0, 1.0), (-2.0, 2.0)]);
    let scorer: Arc<dyn Scorer> = Arc::new(
        JointLimitScorer::new(
            &ScorerParams::with_planning_groups(["arm"]),
            &model,
            Arc::new(MemoryDiagnostics::new()),
        )
        .unwrap(),
    );
    let expected = scorer.calculate_score(&pose_map(&[("j0", 0.1), ("j1", -0.3)]), "arm");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let scorer = Arc::clone(&scorer);
            thread::spawn(move || {
                (0..100)
                    .map(|_| scorer.calculate_score(&pose_map(&[("j0", 0.1), ("j1", -0.3)]), "arm"))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for h in handles {
        assert!(h.join().unwrap().iter().all(|&s| s == expected));
    }
}
