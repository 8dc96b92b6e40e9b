use crate::error::StorageError;
use core_types::AnalysisKey;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// A persisted analysis record: metric names mapped to their values.
pub type ResultRecord = Map<String, Value>;

/// Persists analysis results as one JSON record per [`AnalysisKey`] under a results root.
///
/// Layout: `{root}/{a}_{b}_{start}_{end}/{a}_{b}_results.json`, with chart images
/// and other artifacts stored beside the record. Writes are read-modify-write
/// without locking, so concurrent writers to the same key may lose updates.
#[derive(Debug, Clone)]
pub struct ResultSink {
    results_root: PathBuf,
}

impl ResultSink {
    pub fn new(results_root: impl Into<PathBuf>) -> Self {
        Self {
            results_root: results_root.into(),
        }
    }

    pub fn results_root(&self) -> &Path {
        &self.results_root
    }

    /// Creates the results root if it does not exist yet.
    pub fn ensure_root(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.results_root).map_err(|e| StorageError::io(&self.results_root, e))
    }

    pub fn analysis_dir(&self, key: &AnalysisKey) -> PathBuf {
        self.results_root.join(key.directory_name())
    }

    pub fn record_path(&self, key: &AnalysisKey) -> PathBuf {
        self.analysis_dir(key).join(key.results_file_name())
    }

    pub fn chart_path(&self, key: &AnalysisKey) -> PathBuf {
        self.analysis_dir(key).join(key.chart_file_name())
    }

    /// Reads the record for `key`, or `None` if nothing has been saved yet.
    pub fn load(&self, key: &AnalysisKey) -> Result<Option<ResultRecord>, StorageError> {
        let path = self.record_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
        match serde_json::from_str::<Value>(&raw).map_err(|e| StorageError::json(&path, e))? {
            Value::Object(record) => Ok(Some(record)),
            _ => Err(StorageError::NotAnObject(path)),
        }
    }

    /// Merges `result` into the record for `key`.
    ///
    /// Top-level keys of `result` overwrite same-named keys of the stored record;
    /// all other stored keys are kept. The first save creates the directory and file.
    pub fn save<T: Serialize>(&self, key: &AnalysisKey, result: &T) -> Result<PathBuf, StorageError> {
        let path = self.record_path(key);
        let update = match serde_json::to_value(result).map_err(|e| StorageError::json(&path, e))? {
            Value::Object(update) => update,
            _ => return Err(StorageError::NotAnObject(path)),
        };

        let mut record = self.load(key)?.unwrap_or_default();
        record.extend(update);

        let dir = self.analysis_dir(key);
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;

        let bytes = serde_json::to_vec_pretty(&record).map_err(|e| StorageError::json(&path, e))?;
        fs::write(&path, bytes).map_err(|e| StorageError::io(&path, e))?;

        tracing::debug!(path = %path.display(), keys = record.len(), "Saved analysis record.");
        Ok(path)
    }

    /// Writes a binary artifact (e.g. the chart PNG) into the analysis directory.
    pub fn write_artifact(
        &self,
        key: &AnalysisKey,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StorageError> {
        let dir = self.analysis_dir(key);
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;

        let path = dir.join(file_name);
        fs::write(&path, bytes).map_err(|e| StorageError::io(&path, e))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{AnalysisWindow, InstrumentId};
    use serde_json::json;

    fn key() -> AnalysisKey {
        let window = AnalysisWindow::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
        )
        .unwrap();
        AnalysisKey::new(InstrumentId::new("a"), InstrumentId::new("b"), window)
    }

    #[test]
    fn saves_with_distinct_keys_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ResultSink::new(dir.path());

        sink.save(&key(), &json!({"a": 1})).unwrap();
        sink.save(&key(), &json!({"b": 2})).unwrap();

        let record = sink.load(&key()).unwrap().unwrap();
        assert_eq!(Value::Object(record), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn colliding_keys_are_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ResultSink::new(dir.path());

        sink.save(&key(), &json!({"a": 1})).unwrap();
        sink.save(&key(), &json!({"a": 2})).unwrap();

        let record = sink.load(&key()).unwrap().unwrap();
        assert_eq!(Value::Object(record), json!({"a": 2}));
    }

    #[test]
    fn record_lives_in_the_key_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ResultSink::new(dir.path());

        let path = sink.save(&key(), &json!({"x": null})).unwrap();
        assert_eq!(path, dir.path().join("a_b_20200101_20201231").join("a_b_results.json"));
        assert!(path.exists());
    }

    #[test]
    fn non_object_results_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ResultSink::new(dir.path());
        assert!(matches!(sink.save(&key(), &json!([1, 2])), Err(StorageError::NotAnObject(_))));
        assert!(sink.load(&key()).unwrap().is_none());
    }

    #[test]
    fn artifacts_share_the_record_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ResultSink::new(dir.path());

        let path = sink.write_artifact(&key(), &key().chart_file_name(), b"png").unwrap();
        assert_eq!(path, sink.chart_path(&key()));
        assert_eq!(path.parent(), sink.record_path(&key()).parent());
    }
}
