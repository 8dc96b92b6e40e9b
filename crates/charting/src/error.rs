use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No prices for '{0}' inside the chart window")]
    EmptySeries(String),

    #[error("Cannot normalize '{0}': its first close in the window is zero")]
    ZeroBase(String),

    #[error("Normalized values have no finite positive maximum")]
    InvalidRange,

    #[error("Failed to draw chart: {0}")]
    Drawing(String),

    #[error("Failed to encode chart as PNG: {0}")]
    Encoding(#[from] image::ImageError),
}
