use chrono::NaiveDate;
use core_types::{AnalysisWindow, InstrumentId, PriceSeries};
use serde::Serialize;

/// The span of dates an instrument has prices for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub instrument: InstrumentId,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub rows: usize,
}

impl Coverage {
    /// `None` for an empty series.
    pub fn of(series: &PriceSeries) -> Option<Self> {
        let (first_date, last_date) = series.date_range()?;
        Some(Self {
            instrument: series.instrument().clone(),
            first_date,
            last_date,
            rows: series.len(),
        })
    }

    /// A window is covered when it starts no earlier and ends no later than the data.
    pub fn covers(&self, window: &AnalysisWindow) -> bool {
        window.start() >= self.first_date && window.end() <= self.last_date
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feasibility {
    Feasible,
    /// The window reaches outside the available data.
    OutOfRange(Coverage),
    /// The series has no prices at all.
    NoData,
}

impl Feasibility {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Feasibility::Feasible)
    }
}

/// Decides whether `window` can be analysed with `series`.
///
/// Only the bounds are checked: gaps inside the range (weekends, holidays) do
/// not make a window infeasible.
pub fn check(series: &PriceSeries, window: &AnalysisWindow) -> Feasibility {
    match Coverage::of(series) {
        None => Feasibility::NoData,
        Some(coverage) if coverage.covers(window) => Feasibility::Feasible,
        Some(coverage) => Feasibility::OutOfRange(coverage),
    }
}
