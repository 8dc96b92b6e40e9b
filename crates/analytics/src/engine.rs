use crate::error::AnalyticsError;
use crate::report::{
    InvestmentReturn, LevelCorrelation, MovesCorrelation, RiskReport, StatisticsReport,
};
use crate::stats;
use core_types::{AnalysisWindow, PriceSeries};

/// Risk-free rate used when none is configured, in percentage points per period.
pub const DEFAULT_RISK_FREE_RATE: f64 = 5.0;

/// A stateless calculator for the pairwise metrics.
///
/// Every method takes the two complete series plus the window, restricts both
/// series to the window itself, and never mutates its inputs.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    risk_free_rate: f64,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(DEFAULT_RISK_FREE_RATE)
    }
}

impl AnalyticsEngine {
    pub fn new(risk_free_rate: f64) -> Self {
        Self { risk_free_rate }
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Percentage change between the earliest and latest close of each series in the window.
    ///
    /// The two series are not aligned with each other; each uses its own first
    /// and last day inside the window.
    pub fn investment_return(
        &self,
        a: &PriceSeries,
        b: &PriceSeries,
        window: &AnalysisWindow,
    ) -> Result<InvestmentReturn, AnalyticsError> {
        let a = in_window(a, window)?;
        let b = in_window(b, window)?;

        Ok(InvestmentReturn {
            instrument1: a.instrument().clone(),
            instrument2: b.instrument().clone(),
            start_date: window.start(),
            end_date: window.end(),
            investment_return1: window_return(&a),
            investment_return2: window_return(&b),
        })
    }

    /// Pearson correlation of the close prices on the dates both series share.
    pub fn level_correlation(
        &self,
        a: &PriceSeries,
        b: &PriceSeries,
        window: &AnalysisWindow,
    ) -> Result<LevelCorrelation, AnalyticsError> {
        // An empty side leaves nothing to align, which is an undefined correlation
        // rather than a failure.
        let a = a.within(window);
        let b = b.within(window);

        let (x, y) = stats::align_on_date(&a.observations(), &b.observations());
        let correlation = stats::pearson(&x, &y);
        if correlation.is_none() {
            tracing::warn!(
                aligned_rows = x.len(),
                "Correlation of {} and {} is undefined for {window}.",
                a.instrument(),
                b.instrument()
            );
        }

        Ok(LevelCorrelation {
            instrument1: a.instrument().clone(),
            instrument2: b.instrument().clone(),
            correlation,
        })
    }

    /// Pearson correlation of daily percentage changes on the dates both series share.
    ///
    /// Each series' changes are taken against its own previous row inside the
    /// window before the join, so a date missing from one series makes that
    /// series' next change span the gap.
    pub fn moves_correlation(
        &self,
        a: &PriceSeries,
        b: &PriceSeries,
        window: &AnalysisWindow,
    ) -> Result<MovesCorrelation, AnalyticsError> {
        let a = a.within(window);
        let b = b.within(window);

        let returns_a = stats::dated_pct_change(&a.observations());
        let returns_b = stats::dated_pct_change(&b.observations());
        let (x, y) = stats::align_on_date(&returns_a, &returns_b);
        let correlation = stats::pearson(&x, &y);
        if correlation.is_none() {
            tracing::warn!(
                aligned_rows = x.len(),
                "Correlation of daily moves of {} and {} is undefined for {window}.",
                a.instrument(),
                b.instrument()
            );
        }

        Ok(MovesCorrelation {
            instrument1: a.instrument().clone(),
            instrument2: b.instrument().clone(),
            correlation_between_declines_increases: correlation,
        })
    }

    /// Descriptive statistics of each series' closes in the window.
    pub fn basic_statistics(
        &self,
        a: &PriceSeries,
        b: &PriceSeries,
        window: &AnalysisWindow,
    ) -> Result<StatisticsReport, AnalyticsError> {
        let a = a.within(window);
        let b = b.within(window);

        Ok(StatisticsReport {
            instrument1: a.instrument().clone(),
            instrument2: b.instrument().clone(),
            start_date: window.start(),
            end_date: window.end(),
            basic_statistics1: stats::describe(&a.closes()),
            basic_statistics2: stats::describe(&b.closes()),
        })
    }

    /// Sharpe and Sortino ratios of each series' daily excess returns in the window.
    pub fn risk_indicators(
        &self,
        a: &PriceSeries,
        b: &PriceSeries,
        window: &AnalysisWindow,
    ) -> Result<RiskReport, AnalyticsError> {
        let a = a.within(window);
        let b = b.within(window);

        Ok(RiskReport {
            instrument1: a.instrument().clone(),
            instrument2: b.instrument().clone(),
            risk_indicators1: stats::risk_ratios(&a.closes(), self.risk_free_rate),
            risk_indicators2: stats::risk_ratios(&b.closes(), self.risk_free_rate),
        })
    }
}

/// The part of `series` inside `window`, for metrics that need at least one row.
fn in_window(series: &PriceSeries, window: &AnalysisWindow) -> Result<PriceSeries, AnalyticsError> {
    let filtered = series.within(window);
    if filtered.is_empty() {
        return Err(AnalyticsError::EmptyWindow {
            instrument: series.instrument().clone(),
            window: *window,
        });
    }
    Ok(filtered)
}

fn window_return(series: &PriceSeries) -> Option<f64> {
    let first = series.first()?;
    let last = series.last()?;
    stats::percent_change(first.close, last.close)
}
