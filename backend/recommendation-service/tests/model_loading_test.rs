use std::fs;
use std::path::Path;

use recommendation_service::config::Config;
use recommendation_service::models::{ModelKind, ModelStatus};
use recommendation_service::services::{ModelRegistry, RecoEngine};

const INTERACTIONS: &str = "user_id,item_id,last_watch_dt,total_dur,watched_pct
100,1,2021-08-22,3600,80
200,5,2021-08-21,1200,40
200,6,2021-08-20,600,10
300,6,2021-08-20,5400,100
300,7,2021-08-19,60,1
";

const KNN_INDEX: &str = r#"{
    "users_mapping": {"100": 0, "200": 1, "300": 2},
    "neighbors": {"0": [[0, 1.0], [1, 0.9], [2, 0.8]]}
}"#;

const OFFLINE_TABLE: &str = r#"{"100": [9, 8], "300": []}"#;

fn write_fixtures(dir: &Path, with_interactions: bool) -> String {
    if with_interactions {
        fs::write(dir.join("interactions.csv"), INTERACTIONS).unwrap();
    }
    fs::write(dir.join("knn.json"), KNN_INDEX).unwrap();
    fs::write(dir.join("userknn.json"), OFFLINE_TABLE).unwrap();

    let config = format!(
        r#"
reco:
  k_recs: 5
data:
  interactions_path: {dir}/interactions.csv
models:
  popular:
    kind: popular
    days: 30
    max_k: 10
  knn:
    kind: knn
    model_path: {dir}/knn.json
    n_users: 10
  userknn:
    kind: offline
    model_path: {dir}/userknn.json
  dssm:
    kind: offline
    model_path: {dir}/missing/dssm.json
"#,
        dir = dir.display()
    );

    let config_path = dir.join("config.yml");
    fs::write(&config_path, config).unwrap();
    config_path.display().to_string()
}

fn load_engine(with_interactions: bool) -> (tempfile::TempDir, RecoEngine) {
    let dir = tempfile::tempdir().expect("temp dir");
    let config_path = write_fixtures(dir.path(), with_interactions);

    let config = Config::from_file(&config_path).expect("config loads");
    config.validate().expect("config is valid");

    let engine = RecoEngine::new(ModelRegistry::from_config(&config));
    (dir, engine)
}

#[test]
fn popular_table_is_built_from_interaction_log() {
    let (_dir, engine) = load_engine(true);

    assert_eq!(engine.registry().fallback().top(10), vec![6, 1, 5, 7]);
    assert_eq!(engine.get_reco("popular", 1, 2).unwrap(), vec![6, 1]);
}

#[test]
fn knn_model_recommends_neighbor_items_then_backfills() {
    let (_dir, engine) = load_engine(true);

    // Neighbors 200 and 300 give [5, 6, 7]; popular adds 1 and the pool ends.
    assert_eq!(engine.get_reco("knn", 100, 5).unwrap(), vec![5, 6, 7, 1]);
    assert_eq!(engine.get_reco("knn", 100, 2).unwrap(), vec![5, 6]);
}

#[test]
fn offline_model_serves_stored_lists() {
    let (_dir, engine) = load_engine(true);

    assert_eq!(engine.get_reco("userknn", 100, 3).unwrap(), vec![9, 8, 6]);
    assert_eq!(engine.get_reco("userknn", 300, 3).unwrap(), vec![6, 1, 5]);
    assert_eq!(engine.get_reco("userknn", 12345, 3).unwrap(), vec![6, 1, 5]);
}

#[test]
fn missing_artifact_degrades_only_that_model() {
    let (_dir, engine) = load_engine(true);

    let info = engine.registry().models_info();
    let dssm = info.iter().find(|m| m.name == "dssm").unwrap();
    assert_eq!(dssm.kind, ModelKind::Offline);
    assert!(matches!(dssm.status, ModelStatus::Degraded(_)));

    let ready = info.iter().filter(|m| m.status.is_ready()).count();
    assert_eq!(ready, 3);

    assert_eq!(engine.get_reco("dssm", 100, 2).unwrap(), vec![6, 1]);
}

#[test]
fn missing_interaction_log_degrades_dependent_models() {
    let (_dir, engine) = load_engine(false);

    let info = engine.registry().models_info();
    let status_of = |name: &str| info.iter().find(|m| m.name == name).unwrap().status.clone();

    assert!(!status_of("popular").is_ready());
    assert!(!status_of("knn").is_ready());
    assert!(status_of("userknn").is_ready());

    // Nothing to backfill from, but known users still get their own lists.
    assert_eq!(engine.get_reco("userknn", 100, 5).unwrap(), vec![9, 8]);
    assert!(engine.get_reco("knn", 100, 5).unwrap().is_empty());
}
