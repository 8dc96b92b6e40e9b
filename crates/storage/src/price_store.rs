use crate::error::StorageError;
use core_types::{InstrumentId, PricePoint, PriceSeries};
use std::fs;
use std::path::{Path, PathBuf};

/// Read access to instrument price histories.
///
/// Implementations load the complete series on every call; nothing is cached
/// between calls.
pub trait PriceStore {
    /// Loads the full series for `source`, which is either a path to a price file
    /// or a bare instrument id.
    fn load(&self, source: &str) -> Result<PriceSeries, StorageError>;

    /// Lists every instrument the store can load, sorted by id.
    fn instruments(&self) -> Result<Vec<InstrumentId>, StorageError>;
}

/// A directory of `{instrument}.json` files, each a JSON array of
/// `{"Date": "YYYY-MM-DD", "Close": number}` records.
#[derive(Debug, Clone)]
pub struct JsonPriceStore {
    data_dir: PathBuf,
}

impl JsonPriceStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Maps a source to a file path. Anything that looks like a path (has a
    /// directory component or a `.json` extension) is used as given; a bare id
    /// is looked up in the data directory.
    pub fn resolve(&self, source: &str) -> PathBuf {
        let path = Path::new(source);
        let is_path = path.components().count() > 1
            || path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_path {
            path.to_path_buf()
        } else {
            self.data_dir.join(format!("{source}.json"))
        }
    }
}

impl PriceStore for JsonPriceStore {
    fn load(&self, source: &str) -> Result<PriceSeries, StorageError> {
        let path = self.resolve(source);
        let raw = fs::read_to_string(&path).map_err(|e| StorageError::io(&path, e))?;
        let points: Vec<PricePoint> =
            serde_json::from_str(&raw).map_err(|e| StorageError::json(&path, e))?;

        if points.is_empty() {
            return Err(StorageError::EmptySeries(path));
        }

        let series = PriceSeries::new(InstrumentId::from_source(source), points)?;
        tracing::debug!(path = %path.display(), rows = series.len(), "Loaded price series.");
        Ok(series)
    }

    fn instruments(&self) -> Result<Vec<InstrumentId>, StorageError> {
        let entries = fs::read_dir(&self.data_dir).map_err(|e| StorageError::io(&self.data_dir, e))?;

        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StorageError::io(&self.data_dir, e))?.path();
            let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if path.is_file() && is_json {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(InstrumentId::new(stem));
                }
            }
        }

        ids.sort();
        Ok(ids)
    }
}
