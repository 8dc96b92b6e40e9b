use analyzer::Analyzer;
use chrono::NaiveDate;
use configuration::{Config, Metric};
use core_types::AnalysisWindow;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const EPS: f64 = 1e-9;

struct Fixture {
    _dir: TempDir,
    data_dir: PathBuf,
    results_root: PathBuf,
    analyzer: Analyzer,
}

impl Fixture {
    fn new(files: &[(&str, &[(&str, f64)])]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let results_root = dir.path().join("results");
        fs::create_dir_all(&data_dir).unwrap();

        for (name, rows) in files {
            write_prices(&data_dir, name, rows);
        }

        let mut config = Config::default();
        config.paths.data_dir = data_dir.clone();
        config.paths.results_root = results_root.clone();
        config.chart.width = 320;
        config.chart.height = 240;

        Self {
            _dir: dir,
            analyzer: Analyzer::from_config(&config),
            data_dir,
            results_root,
        }
    }

    fn record(&self, dir_name: &str, file_name: &str) -> Value {
        let raw = fs::read_to_string(self.results_root.join(dir_name).join(file_name)).unwrap();
        serde_json::from_str(&raw).unwrap()
    }
}

fn write_prices(data_dir: &Path, name: &str, rows: &[(&str, f64)]) {
    let records: Vec<Value> = rows
        .iter()
        .map(|(date, close)| serde_json::json!({ "Date": date, "Close": close, "Volume": 1000 }))
        .collect();
    fs::write(
        data_dir.join(format!("{name}.json")),
        serde_json::to_string(&records).unwrap(),
    )
    .unwrap();
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn window(start: &str, end: &str) -> AnalysisWindow {
    AnalysisWindow::new(date(start), date(end)).unwrap()
}

const AAA: &[(&str, f64)] = &[("2020-01-01", 100.0), ("2020-01-02", 110.0), ("2020-01-03", 99.0)];
const BBB: &[(&str, f64)] = &[("2020-01-01", 50.0), ("2020-01-02", 45.0), ("2020-01-03", 60.0)];

#[test]
fn investment_return_is_printed_and_persisted() {
    let fx = Fixture::new(&[("aaa", AAA), ("bbb", BBB)]);
    let w = window("2020-01-01", "2020-01-03");

    let report = fx.analyzer.investment_return(&w, "aaa", "bbb").unwrap();

    assert!((report.investment_return1.unwrap() - -1.0).abs() < EPS);
    assert!((report.investment_return2.unwrap() - 20.0).abs() < EPS);

    let record = fx.record("aaa_bbb_20200101_20200103", "aaa_bbb_results.json");
    assert_eq!(record["instrument1"], "aaa");
    assert_eq!(record["instrument2"], "bbb");
    assert_eq!(record["start_date"], "2020-01-01");
    assert!((record["investment_return1"].as_f64().unwrap() - -1.0).abs() < EPS);
}

#[test]
fn successive_operations_merge_into_one_record() {
    let fx = Fixture::new(&[("aaa", AAA), ("bbb", BBB)]);
    let w = window("2020-01-01", "2020-01-03");

    assert!(fx.analyzer.investment_return(&w, "aaa", "bbb").is_some());
    assert!(fx.analyzer.correlation(&w, "aaa", "bbb").is_some());
    assert!(fx.analyzer.risk_indicators(&w, "aaa", "bbb").is_some());

    let record = fx.record("aaa_bbb_20200101_20200103", "aaa_bbb_results.json");
    let object = record.as_object().unwrap();
    for key in ["investment_return1", "correlation", "risk_indicators1", "risk_indicators2"] {
        assert!(object.contains_key(key), "missing {key}");
    }
}

#[test]
fn identical_prices_correlate_perfectly() {
    let fx = Fixture::new(&[("aaa", AAA), ("copy", AAA)]);
    let w = window("2020-01-01", "2020-01-03");

    let level = fx.analyzer.correlation(&w, "aaa", "copy").unwrap();
    let moves = fx.analyzer.moves_correlation(&w, "aaa", "copy").unwrap();

    assert!((level.correlation.unwrap() - 1.0).abs() < EPS);
    assert!((moves.correlation_between_declines_increases.unwrap() - 1.0).abs() < EPS);
}

#[test]
fn undefined_values_are_persisted_as_null() {
    let flat: &[(&str, f64)] = &[("2020-01-01", 10.0), ("2020-01-02", 10.0), ("2020-01-03", 10.0)];
    let fx = Fixture::new(&[("aaa", AAA), ("flat", flat)]);
    let w = window("2020-01-01", "2020-01-03");

    let report = fx.analyzer.correlation(&w, "aaa", "flat").unwrap();
    assert_eq!(report.correlation, None);

    let record = fx.record("aaa_flat_20200101_20200103", "aaa_flat_results.json");
    assert_eq!(record["correlation"], Value::Null);
}

#[test]
fn infeasible_window_aborts_without_writing() {
    let fx = Fixture::new(&[("aaa", AAA), ("bbb", BBB)]);
    let w = window("2019-12-31", "2020-01-03");

    assert!(!fx.analyzer.feasible(&w, "aaa"));
    assert!(fx.analyzer.investment_return(&w, "aaa", "bbb").is_none());
    assert!(fx.analyzer.basic_statistics(&w, "aaa", "bbb").is_none());
    assert!(!fx.results_root.exists());
}

#[test]
fn missing_files_are_infeasible_and_abort() {
    let fx = Fixture::new(&[("aaa", AAA)]);
    let w = window("2020-01-01", "2020-01-03");

    assert!(fx.analyzer.feasible(&w, "aaa"));
    assert!(!fx.analyzer.feasible(&w, "nope"));
    assert!(fx.analyzer.correlation(&w, "aaa", "nope").is_none());
}

#[test]
fn sources_may_be_paths() {
    let fx = Fixture::new(&[("aaa", AAA), ("bbb", BBB)]);
    let w = window("2020-01-01", "2020-01-03");
    let path_a = fx.data_dir.join("aaa.json");

    let report = fx
        .analyzer
        .investment_return(&w, path_a.to_str().unwrap(), "bbb")
        .unwrap();

    assert_eq!(report.instrument1.as_str(), "aaa");
}

#[test]
fn unsorted_files_give_the_same_results() {
    let shuffled: &[(&str, f64)] = &[("2020-01-03", 99.0), ("2020-01-01", 100.0), ("2020-01-02", 110.0)];
    let fx = Fixture::new(&[("aaa", AAA), ("shuffled", shuffled), ("bbb", BBB)]);
    let w = window("2020-01-01", "2020-01-03");

    let sorted = fx.analyzer.basic_statistics(&w, "aaa", "bbb").unwrap();
    let unsorted = fx.analyzer.basic_statistics(&w, "shuffled", "bbb").unwrap();
    assert_eq!(sorted.basic_statistics1, unsorted.basic_statistics1);

    let ret = fx.analyzer.investment_return(&w, "shuffled", "bbb").unwrap();
    assert!((ret.investment_return1.unwrap() - -1.0).abs() < EPS);
}

#[test]
fn weekend_only_window_is_not_enough_data() {
    let rows: &[(&str, f64)] = &[("2021-01-01", 1.0), ("2021-01-04", 2.0), ("2021-01-05", 3.0)];
    let fx = Fixture::new(&[("aaa", rows), ("bbb", rows)]);
    let w = window("2021-01-02", "2021-01-03");

    assert!(fx.analyzer.feasible(&w, "aaa"));
    assert!(fx.analyzer.investment_return(&w, "aaa", "bbb").is_none());
    assert!(!fx.results_root.exists());
}

#[test]
fn correlation_with_an_empty_side_is_persisted_as_null() {
    let aaa: &[(&str, f64)] = &[("2021-01-01", 1.0), ("2021-01-02", 2.0), ("2021-01-03", 3.0)];
    let bbb: &[(&str, f64)] = &[("2021-01-01", 5.0), ("2021-01-04", 6.0)];
    let fx = Fixture::new(&[("aaa", aaa), ("bbb", bbb)]);
    let w = window("2021-01-02", "2021-01-03");

    let level = fx.analyzer.correlation(&w, "aaa", "bbb").unwrap();
    let moves = fx.analyzer.moves_correlation(&w, "aaa", "bbb").unwrap();
    assert_eq!(level.correlation, None);
    assert_eq!(moves.correlation_between_declines_increases, None);

    let record = fx.record("aaa_bbb_20210102_20210103", "aaa_bbb_results.json");
    assert_eq!(record["correlation"], Value::Null);
    assert_eq!(record["correlation_between_declines_increases"], Value::Null);
}

#[test]
fn chart_rejects_identical_sources() {
    let fx = Fixture::new(&[("aaa", AAA)]);
    let w = window("2020-01-01", "2020-01-03");

    assert!(fx.analyzer.price_chart(&w, "aaa", "aaa").is_none());
    assert!(!fx.results_root.exists());
}

#[test]
fn chart_is_written_beside_the_result_record() {
    let fx = Fixture::new(&[("aaa", AAA), ("bbb", BBB)]);
    let w = window("2020-01-01", "2020-01-03");

    assert!(fx.analyzer.investment_return(&w, "aaa", "bbb").is_some());
    let chart = fx.analyzer.price_chart(&w, "aaa", "bbb").unwrap();

    let dir = fx.results_root.join("aaa_bbb_20200101_20200103");
    let png_path = dir.join("aaa_bbb_chart.png");
    assert_eq!(PathBuf::from(&chart.chart_path), png_path);
    assert!(fs::read(&png_path).unwrap().starts_with(b"\x89PNG"));
    assert!(!chart.image.is_empty());

    let record = fx.record("aaa_bbb_20200101_20200103", "aaa_bbb_results.json");
    assert_eq!(record["image"], chart.image.as_str());
    assert!(record.get("investment_return1").is_some());
}

#[test]
fn batch_continues_after_a_failed_step() {
    let fx = Fixture::new(&[("aaa", AAA)]);
    let w = window("2020-01-01", "2020-01-03");
    let mut seen = Vec::new();

    let outcome = fx.analyzer.run_all(
        &w,
        "aaa",
        "aaa",
        &[Metric::Chart, Metric::Return, Metric::Stats],
        |metric, ok| seen.push((metric, ok)),
    );

    assert_eq!(outcome.failed, vec![Metric::Chart]);
    assert_eq!(outcome.completed, vec![Metric::Return, Metric::Stats]);
    assert_eq!(
        seen,
        vec![(Metric::Chart, false), (Metric::Return, true), (Metric::Stats, true)]
    );
}

#[test]
fn coverage_lists_every_instrument() {
    let fx = Fixture::new(&[("bbb", BBB), ("aaa", &AAA[..2])]);
    fs::write(fx.data_dir.join("broken.json"), "not json").unwrap();

    let listing = fx.analyzer.coverage_all().unwrap();
    let names: Vec<&str> = listing.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(names, vec!["aaa", "bbb", "broken"]);

    let aaa = listing[0].1.as_ref().unwrap();
    assert_eq!((aaa.first_date, aaa.last_date, aaa.rows), (date("2020-01-01"), date("2020-01-02"), 2));
    assert!(listing[2].1.is_err());
}
