use analytics::{
    BasicStatistics, InvestmentReturn, LevelCorrelation, MovesCorrelation, RiskIndicators,
    RiskReport, StatisticsReport,
};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use core_types::AnalysisWindow;

use crate::pipeline::ChartRecord;

/// Two decimals, or `NaN` for an undefined value.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}"),
        None => "NaN".to_string(),
    }
}

/// The console text printed after an operation completes.
pub trait Summary {
    fn summary(&self, window: &AnalysisWindow) -> String;
}

impl Summary for InvestmentReturn {
    fn summary(&self, _window: &AnalysisWindow) -> String {
        format!(
            "Investment return for {}: {}%\nInvestment return for {}: {}%",
            self.instrument1,
            format_value(self.investment_return1),
            self.instrument2,
            format_value(self.investment_return2),
        )
    }
}

impl Summary for LevelCorrelation {
    fn summary(&self, window: &AnalysisWindow) -> String {
        format!(
            "Correlation between {} and {} ({window}): {}",
            self.instrument1,
            self.instrument2,
            format_value(self.correlation),
        )
    }
}

impl Summary for MovesCorrelation {
    fn summary(&self, window: &AnalysisWindow) -> String {
        format!(
            "Correlation between declines and increases of {} and {} ({window}): {}",
            self.instrument1,
            self.instrument2,
            format_value(self.correlation_between_declines_increases),
        )
    }
}

impl Summary for StatisticsReport {
    fn summary(&self, window: &AnalysisWindow) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL).set_header(vec![
            Cell::new("Statistic"),
            Cell::new(self.instrument1.as_str()),
            Cell::new(self.instrument2.as_str()),
        ]);

        let rows: [(&str, fn(&BasicStatistics) -> Option<f64>); 5] = [
            ("mean", |s| s.mean),
            ("median", |s| s.median),
            ("std_dev", |s| s.std_dev),
            ("min_price", |s| s.min_price),
            ("max_price", |s| s.max_price),
        ];
        for (name, field) in rows {
            table.add_row(vec![
                Cell::new(name),
                Cell::new(format_value(field(&self.basic_statistics1))),
                Cell::new(format_value(field(&self.basic_statistics2))),
            ]);
        }

        format!("Basic statistics ({window}):\n{table}")
    }
}

impl Summary for RiskReport {
    fn summary(&self, window: &AnalysisWindow) -> String {
        let block = |name: &str, risk: &RiskIndicators| {
            format!(
                "Risk indicators for {name} ({window}):\nSharpe ratio: {}\nSortino ratio: {}",
                format_value(risk.sharpe_ratio),
                format_value(risk.sortino_ratio),
            )
        };
        format!(
            "{}\n\n{}",
            block(self.instrument1.as_str(), &self.risk_indicators1),
            block(self.instrument2.as_str(), &self.risk_indicators2),
        )
    }
}

impl Summary for ChartRecord {
    fn summary(&self, _window: &AnalysisWindow) -> String {
        format!(
            "Chart for {} and {} saved to {}",
            self.instrument1, self.instrument2, self.chart_path
        )
    }
}
