use chrono::NaiveDate;
use core_types::InstrumentId;
use serde::{Deserialize, Serialize};

// Field names double as the keys of the persisted result record, so they are
// part of the on-disk format. Undefined values serialize as `null`.

/// Percentage return of each instrument between the first and last close in the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentReturn {
    pub instrument1: InstrumentId,
    pub instrument2: InstrumentId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub investment_return1: Option<f64>,
    pub investment_return2: Option<f64>,
}

/// Pearson correlation of the date-aligned close prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCorrelation {
    pub instrument1: InstrumentId,
    pub instrument2: InstrumentId,
    pub correlation: Option<f64>,
}

/// Pearson correlation of the date-aligned daily percentage changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovesCorrelation {
    pub instrument1: InstrumentId,
    pub instrument2: InstrumentId,
    pub correlation_between_declines_increases: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicStatistics {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub instrument1: InstrumentId,
    pub instrument2: InstrumentId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub basic_statistics1: BasicStatistics,
    pub basic_statistics2: BasicStatistics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskIndicators {
    pub sharpe_ratio: Option<f64>,
    pub sortino_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub instrument1: InstrumentId,
    pub instrument2: InstrumentId,
    pub risk_indicators1: RiskIndicators,
    pub risk_indicators2: RiskIndicators,
}
