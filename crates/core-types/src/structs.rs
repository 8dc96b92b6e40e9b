use crate::error::CoreError;
use crate::instrument::InstrumentId;
use crate::window::AnalysisWindow;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily closing price, in the flat record layout of the price files:
/// `{"Date": "YYYY-MM-DD", "Close": 123.45}`. Any other keys in a record are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Close", with = "rust_decimal::serde::float")]
    pub close: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: Decimal) -> Self {
        Self { date, close }
    }

    /// The close as a float for statistical work. Out-of-range decimals become NaN.
    pub fn close_f64(&self) -> f64 {
        self.close.to_f64().unwrap_or(f64::NAN)
    }
}

/// The full price history of one instrument, sorted by date with unique dates.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    instrument: InstrumentId,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series from points in any order.
    ///
    /// Points are sorted by date; a date appearing twice is rejected since the
    /// series could not then be joined against another one unambiguously.
    pub fn new(instrument: InstrumentId, mut points: Vec<PricePoint>) -> Result<Self, CoreError> {
        points.sort_by_key(|p| p.date);

        if let Some(pair) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(CoreError::DuplicateDate {
                instrument: instrument.to_string(),
                date: pair[0].date,
            });
        }

        Ok(Self { instrument, points })
    }

    pub fn instrument(&self) -> &InstrumentId {
        &self.instrument
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Earliest and latest date in the series, or `None` when it is empty.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.points.first()?.date, self.points.last()?.date))
    }

    /// Restricts the series to the points inside `window`.
    pub fn within(&self, window: &AnalysisWindow) -> PriceSeries {
        PriceSeries {
            instrument: self.instrument.clone(),
            points: self
                .points
                .iter()
                .filter(|p| window.contains(p.date))
                .copied()
                .collect(),
        }
    }

    /// `(date, close)` pairs with closes converted to `f64`.
    pub fn observations(&self) -> Vec<(NaiveDate, f64)> {
        self.points.iter().map(|p| (p.date, p.close_f64())).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(PricePoint::close_f64).collect()
    }
}
