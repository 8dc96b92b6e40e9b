//! # Pairwise Analyzer
//!
//! The operation boundary of the application. Each operation takes a window and
//! two price sources, and then:
//!
//! 1. loads both series and checks the window against each of them,
//! 2. hands them to the `AnalyticsEngine` (or the `ChartRenderer`),
//! 3. prints a short summary and merges the result into the analysis record.
//!
//! Failures stop at this boundary. They are logged through `tracing` and the
//! operation returns `None`, so a batch keeps going after one step fails.

pub mod error;
pub mod pipeline;
pub mod summary;

pub use error::AnalyzerError;
pub use pipeline::{Analyzer, BatchOutcome, ChartRecord};
pub use summary::{Summary, format_value};
