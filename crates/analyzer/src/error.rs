use chrono::NaiveDate;
use core_types::{AnalysisWindow, InstrumentId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),

    #[error("Chart error: {0}")]
    Chart(#[from] charting::ChartError),

    #[error(
        "Analysis for {window} is not possible: data for {instrument} covers {first_date} to {last_date}"
    )]
    OutOfRange {
        instrument: InstrumentId,
        window: AnalysisWindow,
        first_date: NaiveDate,
        last_date: NaiveDate,
    },

    #[error("No price data for {0}")]
    NoData(InstrumentId),

    #[error("Both sources are '{0}'; a chart needs two different files")]
    IdenticalSources(String),
}
