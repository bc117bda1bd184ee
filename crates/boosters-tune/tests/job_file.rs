//! Job file + CSV data through to written result tables.

use std::fs;
use std::io::Write;

use boosters_tune::config::{ConfigError, TuneConfig};
use boosters_tune::data::{DatasetError, load_csv};
use boosters_tune::testing::synthetic_regression;
use boosters_tune::training::Verbosity;
use tempfile::TempDir;

const JOB: &str = r#"
objective = "reg:squarederror"
n_threads = 2

[cv]
n_folds = 3
n_rounds = 40
early_stopping_rounds = 5
seed = 9

[base]
lambda = 1.0

[[grid]]
name = "eta"
values = [0.3, 0.1]

[[grid]]
name = "max_depth"
values = [2, 3, -4]
"#;

fn write_data(dir: &TempDir) -> std::path::PathBuf {
    let dataset = synthetic_regression(90, 2, 0.1, 1);
    let path = dir.path().join("train.csv");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "a,b,y").unwrap();
    for i in 0..dataset.n_samples() {
        writeln!(file, "{},{},{}", dataset.get(i, 0), dataset.get(i, 1), dataset.targets()[i]).unwrap();
    }
    path
}

#[test]
fn job_runs_from_files_and_writes_tables() {
    let dir = TempDir::new().unwrap();
    let job_path = dir.path().join("job.toml");
    fs::write(&job_path, JOB).unwrap();
    let data_path = write_data(&dir);

    let job = TuneConfig::from_path(&job_path).unwrap();
    let dataset = load_csv(&data_path, "y").unwrap();
    assert_eq!(dataset.n_samples(), 90);
    assert_eq!(dataset.feature_names(), ["a", "b"]);

    let table = job
        .runner(Verbosity::Silent)
        .unwrap()
        .run(&job.combinations(), &dataset, &job.cv_config().unwrap())
        .unwrap();
    assert_eq!(table.len(), 6);
    assert!(table.records().iter().all(|r| r.seed == 9));

    // CSV
    let csv_path = dir.path().join("results.csv");
    table.write_csv(fs::File::create(&csv_path).unwrap()).unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, table.columns());
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 6);
    // The two max_depth = -4 rows are last and unavailable.
    for row in &rows[4..] {
        assert_eq!(&row[1], "-4");
        assert!(row.iter().skip(2).all(|cell| cell == "NA"));
    }
    for row in &rows[..4] {
        assert!(row[2].parse::<usize>().is_ok());
        assert!(row[5].parse::<f64>().is_ok());
    }

    // JSON
    let json: serde_json::Value = serde_json::from_str(&table.to_json().to_string()).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 6);
    assert!(records[5]["test_rmse_mean"].is_null());
    assert!(records[5]["error"].as_str().unwrap().contains("max_depth"));
    assert!(records[0]["test_rmse_mean"].as_f64().unwrap() > 0.0);

    // Markdown
    let markdown = table.to_markdown();
    assert_eq!(markdown.lines().count(), 8);
    assert!(markdown.starts_with("| eta | max_depth | iteration |"));
}

#[test]
fn missing_job_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let err = TuneConfig::from_path(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn explicit_descending_flag_is_kept() {
    let job: TuneConfig = "metric = \"mae\"\ndescending = true\n[[grid]]\nname = \"eta\"\nvalues = [0.2]\n"
        .parse()
        .unwrap();
    let dataset = synthetic_regression(60, 2, 0.1, 3);
    let table = job
        .runner(Verbosity::Silent)
        .unwrap()
        .run(&job.combinations(), &dataset, &job.cv_config().unwrap())
        .unwrap();
    assert!(table.is_descending());
    assert_eq!(table.metric(), "mae");
}

#[test]
fn missing_label_fails_loading_instead_of_every_combination() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("train.csv");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "a,y").unwrap();
    for i in 0..40 {
        let label = if i == 6 { "NA".to_string() } else { format!("{}", i as f32 * 0.1) };
        writeln!(file, "{i},{label}").unwrap();
    }
    drop(file);

    let err = load_csv(&path, "y").unwrap_err();
    assert!(matches!(err, DatasetError::MissingTargetValue { row: 7 }));
    assert!(err.to_string().contains("row 7"));
}
