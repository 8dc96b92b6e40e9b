use crate::window::AnalysisWindow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The short symbol identifying an instrument, e.g. `btc-usd`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentId(String);

impl InstrumentId {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self(symbol.into())
    }

    /// Derives the identifier from a price-file source: the file name without
    /// its directory and extension (`data/btc-usd.json` -> `btc-usd`).
    pub fn from_source(source: &str) -> Self {
        let stem = Path::new(source)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(source);
        Self(stem.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies one persisted analysis record: an ordered instrument pair plus a window.
///
/// Both the result files and the chart artifacts derive their locations from here,
/// so every writer for the same analysis lands in the same directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnalysisKey {
    pub instrument1: InstrumentId,
    pub instrument2: InstrumentId,
    pub window: AnalysisWindow,
}

impl AnalysisKey {
    pub fn new(instrument1: InstrumentId, instrument2: InstrumentId, window: AnalysisWindow) -> Self {
        Self {
            instrument1,
            instrument2,
            window,
        }
    }

    /// `{a}_{b}_{start:%Y%m%d}_{end:%Y%m%d}`
    pub fn directory_name(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.instrument1,
            self.instrument2,
            self.window.start().format("%Y%m%d"),
            self.window.end().format("%Y%m%d")
        )
    }

    /// `{a}_{b}_results.json`
    pub fn results_file_name(&self) -> String {
        format!("{}_{}_results.json", self.instrument1, self.instrument2)
    }

    /// `{a}_{b}_chart.png`
    pub fn chart_file_name(&self) -> String {
        format!("{}_{}_chart.png", self.instrument1, self.instrument2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn instrument_id_is_the_file_stem() {
        assert_eq!(InstrumentId::from_source("financial_data_json/xlm-usd.json").as_str(), "xlm-usd");
        assert_eq!(InstrumentId::from_source("btc-usd").as_str(), "btc-usd");
    }

    #[test]
    fn key_names_strip_date_dashes() {
        let window = AnalysisWindow::new(
            NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
        )
        .unwrap();
        let key = AnalysisKey::new(InstrumentId::new("btc-usd"), InstrumentId::new("ltc-usd"), window);

        assert_eq!(key.directory_name(), "btc-usd_ltc-usd_20190101_20210101");
        assert_eq!(key.results_file_name(), "btc-usd_ltc-usd_results.json");
        assert_eq!(key.chart_file_name(), "btc-usd_ltc-usd_chart.png");
    }
}
