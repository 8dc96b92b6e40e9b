pub mod error;
pub mod instrument;
pub mod structs;
pub mod window;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use instrument::{AnalysisKey, InstrumentId};
pub use structs::{PricePoint, PriceSeries};
pub use window::AnalysisWindow;
