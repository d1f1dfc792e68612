//! Result store tests
//!
//! File-backed snapshots: atomic replacement, schema round trip and resume.

mod common;

use std::sync::atomic::Ordering;

use common::{outcome, FnTrainer, MockHarness};
use sweepstat::collaborator::{CollaboratorError, TrainOutcome, TrainRequest};
use sweepstat::record::{ResultRecord, RunResult, SweepState};
use sweepstat::store::{JsonFileStore, ResultStore, DEFAULT_FILE_NAME};
use sweepstat::{Error, ExperimentConfiguration, Orchestrator, SweepPlan};
use tempfile::TempDir;

fn losses(request: &TrainRequest) -> Result<TrainOutcome, CollaboratorError> {
    outcome(2.0 - request.alpha, 2.2 - request.alpha)
}

fn plan() -> SweepPlan {
    SweepPlan::new(vec![
        ExperimentConfiguration::new(0.0, "Baseline"),
        ExperimentConfiguration::new(0.5, "Gated"),
    ])
    .with_seeds(vec![42, 123])
    .with_max_steps(20)
    .with_profiling(0, 2)
}

#[test]
fn test_load_missing_file_is_none() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    assert!(store.load().unwrap().is_none());
}

#[test]
fn test_persist_creates_parent_dirs_and_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("paper_results").join("nested");
    let mut store = JsonFileStore::in_dir(&target);

    let mut record = ResultRecord::new("cpu", vec![42], 20);
    record.record_run(RunResult::success(0.0, 42, "Baseline", 20, 1.9, 2.0, 3.0));
    store.persist(&record).unwrap();
    store.persist(&record).unwrap();

    let names: Vec<String> = std::fs::read_dir(&target)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![DEFAULT_FILE_NAME.to_string()]);

    let loaded = store.load().unwrap().unwrap();
    assert_eq!(loaded.runs_for("alpha_0.0").len(), 1);
    assert_eq!(loaded.metadata().seeds, vec![42]);
}

#[test]
fn test_snapshot_schema_sections() {
    let dir = TempDir::new().unwrap();
    let mut harness = MockHarness::new(None);
    let store = JsonFileStore::in_dir(dir.path());
    let mut sweep = Orchestrator::builder(plan(), FnTrainer::new(losses), store)
        .build()
        .unwrap();
    sweep.run_all(&mut harness).unwrap();

    let raw = std::fs::read_to_string(dir.path().join(DEFAULT_FILE_NAME)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();

    let sections = [
        "metadata",
        "runs",
        "nlp_results",
        "statistical_analysis",
        "efficiency_results",
    ];
    for section in sections {
        assert!(json.get(section).is_some(), "missing section {section}");
    }
    assert_eq!(json["metadata"]["state"], "completed");
    assert_eq!(json["metadata"]["seeds"], serde_json::json!([42, 123]));

    let summary = &json["nlp_results"]["alpha_0.5"];
    assert_eq!(summary["num_seeds"], 2);
    assert_eq!(summary["individual_results"].as_array().unwrap().len(), 2);
    assert_eq!(summary["individual_results"][0]["status"], "success");

    let comparison = &json["statistical_analysis"]["alpha_0.5"];
    assert!(comparison.get("cohens_d").is_some());
    assert!(comparison.get("effect_size").is_some());
    assert!(json["statistical_analysis"].get("alpha_0.0").is_none());

    assert!(json["efficiency_results"]["alpha_0.0"]["memory_mb"].is_null());
}

#[test]
fn test_corrupt_snapshot_is_an_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(DEFAULT_FILE_NAME), "{ truncated").unwrap();
    let store = JsonFileStore::in_dir(dir.path());
    assert!(matches!(store.load(), Err(Error::Serialization(_))));
}

#[test]
fn test_unwritable_target_is_persistence_error() {
    let dir = TempDir::new().unwrap();
    // a regular file where the parent directory should be
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "x").unwrap();
    let mut store = JsonFileStore::new(blocker.join(DEFAULT_FILE_NAME));

    let record = ResultRecord::new("cpu", vec![1], 1);
    assert!(matches!(store.persist(&record), Err(Error::Persistence(_))));
}

#[test]
fn test_failed_replace_keeps_previous_snapshot_and_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join(DEFAULT_FILE_NAME);
    let mut store = JsonFileStore::new(&target);
    let mut record = ResultRecord::new("cpu", vec![42], 20);
    store.persist(&record).unwrap();

    // swap the snapshot for a non-empty directory so the rename fails
    std::fs::remove_file(&target).unwrap();
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("previous"), "kept").unwrap();

    record.record_run(RunResult::success(0.0, 42, "Baseline", 20, 1.9, 2.0, 3.0));
    assert!(matches!(store.persist(&record), Err(Error::Persistence(_))));

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec![DEFAULT_FILE_NAME.to_string()]);
    assert_eq!(std::fs::read_to_string(target.join("previous")).unwrap(), "kept");
}

#[test]
fn test_overflowing_losses_still_reload() {
    let dir = TempDir::new().unwrap();
    let mut harness = MockHarness::new(None);
    let trainer = FnTrainer::new(|request: &TrainRequest| {
        if request.alpha == 0.5 {
            outcome(1e308, 1e308)
        } else {
            losses(request)
        }
    });
    let store = JsonFileStore::in_dir(dir.path());
    let mut sweep = Orchestrator::builder(plan(), trainer, store)
        .build()
        .unwrap();
    sweep.run_all(&mut harness).unwrap();

    let loaded = JsonFileStore::in_dir(dir.path()).load().unwrap().unwrap();
    assert!(loaded.summary(0.5).is_none());
    assert!(loaded.summary(0.0).is_some());
    let runs = loaded.runs_for("alpha_0.5");
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|run| run.eval_perplexity().is_none()));
    assert!(loaded.statistical_analysis().is_empty());
}

#[test]
fn test_resume_rejects_configurations_missing_from_plan() {
    let dir = TempDir::new().unwrap();
    let mut harness = MockHarness::new(None);
    let first_plan = SweepPlan::new(vec![
        ExperimentConfiguration::new(0.0, "Baseline"),
        ExperimentConfiguration::new(0.3, "Gated"),
    ])
    .with_seeds(vec![42, 123])
    .with_max_steps(20)
    .with_profiling(0, 2);
    let store = JsonFileStore::in_dir(dir.path());
    let mut sweep = Orchestrator::builder(first_plan, FnTrainer::new(losses), store)
        .build()
        .unwrap();
    sweep.run_all(&mut harness).unwrap();

    let store = JsonFileStore::in_dir(dir.path());
    let result = Orchestrator::builder(plan(), FnTrainer::new(losses), store)
        .resume(true)
        .build();
    match result {
        Err(Error::InvalidPlan(message)) => {
            assert!(message.contains("alpha_0.3"), "unexpected message: {message}");
            assert!(!message.contains("alpha_0.0"));
        }
        Err(other) => panic!("expected InvalidPlan, got {other}"),
        Ok(_) => panic!("resume accepted a snapshot with an unplanned alpha"),
    }
}

#[test]
fn test_resume_from_file_skips_completed_work() {
    let dir = TempDir::new().unwrap();
    let mut harness = MockHarness::new(None);

    let trainer = FnTrainer::new(losses);
    let first_calls = trainer.calls();
    let mut sweep = Orchestrator::builder(plan(), trainer, JsonFileStore::in_dir(dir.path()))
        .build()
        .unwrap();
    sweep.run_all(&mut harness).unwrap();
    assert_eq!(first_calls.load(Ordering::SeqCst), 4);
    let loads_after_first = harness.loads;

    let trainer = FnTrainer::new(losses);
    let second_calls = trainer.calls();
    let mut resumed = Orchestrator::builder(plan(), trainer, JsonFileStore::in_dir(dir.path()))
        .resume(true)
        .build()
        .unwrap();
    let report = resumed.run_all(&mut harness).unwrap();

    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    assert_eq!(harness.loads, loads_after_first);
    assert_eq!(report.state, SweepState::Completed);
    assert_eq!(report.attempted_runs(), 4);
}

#[test]
fn test_resume_with_partial_snapshot_runs_remaining_seeds() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonFileStore::in_dir(dir.path());

    // a snapshot with the baseline complete and one treatment seed done
    let mut record = ResultRecord::new("cpu", vec![42, 123], 20);
    record.record_run(RunResult::success(0.0, 42, "Baseline", 20, 2.0, 2.2, 1.0));
    record.record_run(RunResult::success(0.0, 123, "Baseline", 20, 2.0, 2.2, 1.0));
    let baseline = sweepstat::aggregate::aggregate(
        &ExperimentConfiguration::new(0.0, "Baseline"),
        record.runs_for("alpha_0.0"),
    );
    record.complete_configuration("alpha_0.0", baseline);
    record.record_run(RunResult::success(0.5, 42, "Gated", 20, 1.5, 1.7, 1.0));
    store.persist(&record).unwrap();

    let trainer = FnTrainer::new(losses);
    let calls = trainer.calls();
    let mut resumed = Orchestrator::builder(plan(), trainer, store)
        .resume(true)
        .build()
        .unwrap();
    resumed.run_matrix().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let seeds: Vec<u64> = resumed
        .record()
        .runs_for("alpha_0.5")
        .iter()
        .map(RunResult::seed)
        .collect();
    assert_eq!(seeds, vec![42, 123]);
    assert_eq!(resumed.record().summary(0.5).unwrap().num_seeds, 2);
}
