//! Numeric kernels shared by the metrics.
//!
//! Conventions: returns are percentages (`0.5` means half a percent), standard
//! deviations are sample deviations (ddof = 1), and anything mathematically
//! undefined comes back as `None` rather than NaN or a substituted zero.

use crate::report::{BasicStatistics, RiskIndicators};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use statrs::statistics::{Data, Median, Statistics};
use std::collections::HashMap;

/// Maps NaN and infinities to `None`.
pub fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// `numerator / denominator`, undefined when the denominator is zero or not finite.
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    defined(numerator / denominator)
}

/// Percentage change from `first` to `last`, computed exactly on decimals.
pub fn percent_change(first: Decimal, last: Decimal) -> Option<f64> {
    (last - first)
        .checked_div(first)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_f64()
}

/// Row-over-row percentage changes. The first row has no predecessor and is
/// dropped, so the output is one element shorter than the input.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0] * 100.0)
        .collect()
}

/// Like [`pct_change`], keeping the date of the later row of each pair.
pub fn dated_pct_change(observations: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    observations
        .windows(2)
        .map(|w| (w[1].0, (w[1].1 - w[0].1) / w[0].1 * 100.0))
        .collect()
}

/// Inner join of two dated sequences. The output keeps the order of `left`.
pub fn align_on_date(left: &[(NaiveDate, f64)], right: &[(NaiveDate, f64)]) -> (Vec<f64>, Vec<f64>) {
    let lookup: HashMap<NaiveDate, f64> = right.iter().copied().collect();

    left.iter()
        .filter_map(|(date, l)| lookup.get(date).map(|r| (*l, *r)))
        .unzip()
}

/// Pearson correlation coefficient.
///
/// Undefined for fewer than two pairs or when either side has no variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let mean_x = x.mean();
    let mean_y = y.mean();
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    ratio(sxy, (sxx * syy).sqrt()).map(|r| r.clamp(-1.0, 1.0))
}

/// Mean, median, sample standard deviation, min and max.
pub fn describe(values: &[f64]) -> BasicStatistics {
    if values.is_empty() {
        return BasicStatistics::default();
    }

    BasicStatistics {
        mean: defined(values.mean()),
        median: median(values),
        std_dev: defined(values.std_dev()),
        min_price: defined(Statistics::min(values)),
        max_price: defined(Statistics::max(values)),
    }
}

/// Middle value, or the average of the two middle values for an even count.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    defined(Data::new(values.to_vec()).median())
}

/// Sharpe and Sortino ratios of per-period excess returns over `risk_free_rate`.
///
/// The rate is subtracted as-is from each daily percentage return, with no
/// conversion from an annual yield. For Sortino, every non-negative excess
/// return is replaced by zero and the sample deviation of the whole clamped
/// sequence is used as the downside deviation; zeros stay in the sample.
pub fn risk_ratios(closes: &[f64], risk_free_rate: f64) -> RiskIndicators {
    let excess: Vec<f64> = pct_change(closes)
        .into_iter()
        .map(|r| r - risk_free_rate)
        .collect();

    if excess.is_empty() {
        return RiskIndicators::default();
    }

    let mean = excess.as_slice().mean();
    let downside: Vec<f64> = excess.iter().map(|r| r.min(0.0)).collect();

    RiskIndicators {
        sharpe_ratio: ratio(mean, excess.as_slice().std_dev()),
        sortino_ratio: ratio(mean, downside.as_slice().std_dev()),
    }
}
