//! # Pairwise Analytics Engine
//!
//! This crate computes the comparative metrics for a pair of instruments over a
//! date window: investment return, correlation of price levels and of daily
//! moves, descriptive statistics, and the Sharpe and Sortino ratios.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No file access and no knowledge of where series come from or
//!   where reports go. It depends only on `core-types`.
//! - **Stateless Calculation:** The `AnalyticsEngine` takes two `PriceSeries` and an
//!   `AnalysisWindow` and produces a report. Identical inputs give identical reports.
//! - **Explicit Undefinedness:** A metric that cannot be computed (no variance, too
//!   few aligned rows, zero base price) is `None`, never a substituted zero.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `feasibility::check`: Decides whether a window lies inside a series' data.
//! - `stats`: The numeric kernels (percentage change, Pearson, describe, ratios).
//! - The report structs, which double as the persisted result layout.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod feasibility;
pub mod report;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{AnalyticsEngine, DEFAULT_RISK_FREE_RATE};
pub use error::AnalyticsError;
pub use feasibility::{Coverage, Feasibility};
pub use report::{
    BasicStatistics, InvestmentReturn, LevelCorrelation, MovesCorrelation, RiskIndicators,
    RiskReport, StatisticsReport,
};
