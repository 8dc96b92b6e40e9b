//! # Storage Crate
//!
//! File-backed adapters for everything the analytics read and write.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** This crate encapsulates all file-format and directory-layout
//!   logic. The rest of the application sees `PriceSeries` values and result
//!   records, never paths or raw JSON.
//! - **No Caching:** Every load reads the file from disk again, and every save
//!   re-reads the existing record before merging into it.
//!
//! ## Public API
//!
//! - `PriceStore`: The read interface for instrument price histories.
//! - `JsonPriceStore`: A directory of `{instrument}.json` price files.
//! - `ResultSink`: Merges analysis results into per-analysis JSON records and
//!   stores artifacts such as chart images beside them.
//! - `StorageError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod price_store;
pub mod results;

// Re-export the key components to create a clean, public-facing API.
pub use error::StorageError;
pub use price_store::{JsonPriceStore, PriceStore};
pub use results::{ResultRecord, ResultSink};
