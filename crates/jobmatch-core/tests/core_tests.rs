use std::fs;

use tempfile::TempDir;

use jobmatch_core::config::{Config, EmbeddingBackend};
use jobmatch_core::corpus::{load_job_records, load_job_records_or_empty, read_job_records};
use jobmatch_core::session_details::{load_session_details, load_session_details_or_empty};
use jobmatch_core::{ChatRequest, JobRecord};

const CSV: &str = "\
id,title,redirect_url,company,location,description,category,salary_max,contract_type,salary_min,contract_time
1,Data Analyst,https://jobs.example/1,Acme,\"{'display_name': 'Pune'}\",Analyse data,\"{'label': 'IT Jobs'}\",90000,permanent,60000,full_time
2,Backend Engineer,,Globex,Remote,Rust services,IT Jobs,,,,
";

#[test]
fn csv_rows_map_onto_job_records_by_header() {
    let records = read_job_records(CSV.as_bytes()).expect("parse");
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first.title, "Data Analyst");
    assert_eq!(first.location, "Pune", "nested location flattened");
    assert_eq!(first.category, "IT Jobs", "nested category flattened");
    assert_eq!(first.salary_min, "60000");
    assert_eq!(first.contract_time, "full_time");

    let second = &records[1];
    assert_eq!(second.redirect_url, "", "absent values are empty strings");
    assert_eq!(second.contract_type, "");
}

#[test]
fn missing_columns_default_to_empty() {
    let records = read_job_records("title,company\nWriter,Initech\n".as_bytes()).expect("parse");
    assert_eq!(records, vec![JobRecord { title: "Writer".into(), company: "Initech".into(), ..JobRecord::default() }]);
}

#[test]
fn embedding_text_skips_empty_fields_in_fixed_order() {
    let job = JobRecord {
        title: "Data Analyst".into(),
        company: String::new(),
        description: "SQL and dashboards".into(),
        category: "IT Jobs".into(),
        location: "Pune".into(),
        ..JobRecord::default()
    };
    assert_eq!(job.embedding_text(), "Data Analyst SQL and dashboards IT Jobs");
}

#[test]
fn missing_corpus_is_an_error_but_degrades_to_empty() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("absent.csv");
    assert!(load_job_records(&path).is_err());
    assert!(load_job_records_or_empty(&path).is_empty());
}

#[test]
fn session_details_keep_file_order() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("session_details.json");
    fs::write(&path, r#"{"Resume clinic": "Mon 10:00", "Mentor hour": "Wed 17:00", "Seats": 12}"#).unwrap();

    let details = load_session_details(&path).expect("load");
    let entries: Vec<(String, String)> = details.entries().map(|(k, v)| (k.to_string(), v)).collect();
    assert_eq!(entries, vec![
        ("Resume clinic".to_string(), "Mon 10:00".to_string()),
        ("Mentor hour".to_string(), "Wed 17:00".to_string()),
        ("Seats".to_string(), "12".to_string()),
    ]);
}

#[test]
fn missing_session_details_file_is_created_empty() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("data").join("session_details.json");
    let details = load_session_details_or_empty(&path, true);
    assert!(details.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
}

#[test]
fn corrupt_session_details_degrade_to_empty() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("session_details.json");
    fs::write(&path, "[1, 2").unwrap();
    assert!(load_session_details(&path).is_err());
    assert!(load_session_details_or_empty(&path, false).is_empty());
}

#[test]
fn config_layers_file_over_defaults_and_resolves_paths() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("config.toml"),
        "[retrieval]\nthreshold = 0.45\n\n[data]\ncorpus_csv = \"jobs.csv\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("config.test.toml"), "[retrieval]\npreview_limit = 5\n").unwrap();

    let config = Config::load_for_env(tmp.path(), "test").expect("config");
    let settings = config.settings().expect("settings");
    assert!((settings.retrieval.threshold - 0.45).abs() < 1e-6);
    assert_eq!(settings.retrieval.preview_limit, 5);
    assert_eq!(settings.retrieval.ready_timeout_secs, 10, "untouched keys keep defaults");
    assert_eq!(settings.data.corpus_csv, tmp.path().join("jobs.csv"));
    assert_eq!(settings.embedding.backend, EmbeddingBackend::Hash);
    assert_eq!(settings.moderation.phrases.len(), 4);
}

#[test]
fn config_rejects_out_of_range_threshold() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("config.toml"), "[retrieval]\nthreshold = 1.5\n").unwrap();
    assert!(Config::load_for_env(tmp.path(), "test").is_err());
}

#[test]
fn chat_request_fills_contract_defaults() {
    let req: ChatRequest = serde_json::from_str("{}").unwrap();
    assert_eq!(req.message, " ");
    assert_eq!(req.session_id, "default");
}
