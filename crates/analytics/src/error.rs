use core_types::{AnalysisWindow, InstrumentId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// The window holds no prices for an instrument, e.g. a weekend-only window.
    #[error("No prices for {instrument} from {window}")]
    EmptyWindow {
        instrument: InstrumentId,
        window: AnalysisWindow,
    },
}
