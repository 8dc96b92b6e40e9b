//! # Chart Rendering
//!
//! Draws two instruments' closing prices on one chart, each rescaled so its
//! first close inside the window is 100, and encodes the result as PNG.
//!
//! Text is rendered from a TrueType font loaded at runtime. When none can be
//! found the chart is still drawn, just without any text.

pub mod error;
pub mod font;
pub mod renderer;

pub use error::ChartError;
pub use renderer::{Chart, ChartRenderer, TickGranularity, normalize};
