use analytics::{
    AnalyticsEngine, AnalyticsError, Coverage, Feasibility, InvestmentReturn, LevelCorrelation,
    MovesCorrelation, RiskReport, StatisticsReport, feasibility,
};
use charting::ChartRenderer;
use configuration::{Config, Metric};
use core_types::{AnalysisKey, AnalysisWindow, InstrumentId, PriceSeries};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use storage::{JsonPriceStore, PriceStore, ResultSink};

use crate::error::AnalyzerError;
use crate::summary::Summary;

/// What the chart operation adds to the result record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub instrument1: InstrumentId,
    pub instrument2: InstrumentId,
    /// Base64-encoded PNG.
    pub image: String,
    pub chart_path: String,
}

/// Which steps of a batch finished and which were abandoned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub completed: Vec<Metric>,
    pub failed: Vec<Metric>,
}

/// Runs analyses for a pair of instruments and persists their results.
///
/// Every public operation is self-contained: it reloads both series, checks the
/// window against them, and absorbs its own failures. A failed operation logs the
/// cause and returns `None` (or `false`) without touching the result file.
pub struct Analyzer {
    store: Box<dyn PriceStore>,
    sink: ResultSink,
    engine: AnalyticsEngine,
    renderer: ChartRenderer,
}

impl Analyzer {
    pub fn new(
        store: Box<dyn PriceStore>,
        sink: ResultSink,
        engine: AnalyticsEngine,
        renderer: ChartRenderer,
    ) -> Self {
        Self {
            store,
            sink,
            engine,
            renderer,
        }
    }

    /// Wires up the JSON price store, result sink and chart renderer described by `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(JsonPriceStore::new(&config.paths.data_dir)),
            ResultSink::new(&config.paths.results_root),
            AnalyticsEngine::new(config.analysis.risk_free_rate),
            ChartRenderer::new(
                config.chart.width,
                config.chart.height,
                config.chart.font_path.clone(),
            ),
        )
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    /// Whether `window` lies inside the data available for `source`.
    ///
    /// Fails closed: a file that cannot be loaded makes every window infeasible.
    pub fn feasible(&self, window: &AnalysisWindow, source: &str) -> bool {
        match self.load_checked(window, source) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(source, "{e}");
                false
            }
        }
    }

    /// Date range and row count of the data behind `source`.
    pub fn coverage(&self, source: &str) -> Result<Coverage, AnalyzerError> {
        let series = self.store.load(source)?;
        Coverage::of(&series).ok_or_else(|| AnalyzerError::NoData(series.instrument().clone()))
    }

    /// Coverage of every instrument in the store. Unreadable files are reported
    /// alongside the rest rather than aborting the listing.
    pub fn coverage_all(&self) -> Result<Vec<(InstrumentId, Result<Coverage, AnalyzerError>)>, AnalyzerError> {
        let instruments = self.store.instruments()?;
        Ok(instruments
            .into_iter()
            .map(|id| {
                let coverage = self.coverage(id.as_str());
                (id, coverage)
            })
            .collect())
    }

    pub fn investment_return(
        &self,
        window: &AnalysisWindow,
        source_a: &str,
        source_b: &str,
    ) -> Option<InvestmentReturn> {
        self.run_metric(Metric::Return, window, source_a, source_b, |e, a, b, w| {
            e.investment_return(a, b, w)
        })
    }

    pub fn correlation(
        &self,
        window: &AnalysisWindow,
        source_a: &str,
        source_b: &str,
    ) -> Option<LevelCorrelation> {
        self.run_metric(Metric::Correlation, window, source_a, source_b, |e, a, b, w| {
            e.level_correlation(a, b, w)
        })
    }

    pub fn moves_correlation(
        &self,
        window: &AnalysisWindow,
        source_a: &str,
        source_b: &str,
    ) -> Option<MovesCorrelation> {
        self.run_metric(Metric::Moves, window, source_a, source_b, |e, a, b, w| {
            e.moves_correlation(a, b, w)
        })
    }

    pub fn basic_statistics(
        &self,
        window: &AnalysisWindow,
        source_a: &str,
        source_b: &str,
    ) -> Option<StatisticsReport> {
        self.run_metric(Metric::Stats, window, source_a, source_b, |e, a, b, w| {
            e.basic_statistics(a, b, w)
        })
    }

    pub fn risk_indicators(
        &self,
        window: &AnalysisWindow,
        source_a: &str,
        source_b: &str,
    ) -> Option<RiskReport> {
        self.run_metric(Metric::Risk, window, source_a, source_b, |e, a, b, w| {
            e.risk_indicators(a, b, w)
        })
    }

    /// Draws the normalized price chart, writes it next to the result file and
    /// records it (base64 and path) in the result record.
    pub fn price_chart(
        &self,
        window: &AnalysisWindow,
        source_a: &str,
        source_b: &str,
    ) -> Option<ChartRecord> {
        let outcome = self.try_price_chart(window, source_a, source_b);
        self.finish(Metric::Chart, window, outcome)
    }

    /// Runs one operation by name. Returns whether it completed.
    pub fn run(&self, metric: Metric, window: &AnalysisWindow, source_a: &str, source_b: &str) -> bool {
        match metric {
            Metric::Return => self.investment_return(window, source_a, source_b).is_some(),
            Metric::Correlation => self.correlation(window, source_a, source_b).is_some(),
            Metric::Moves => self.moves_correlation(window, source_a, source_b).is_some(),
            Metric::Stats => self.basic_statistics(window, source_a, source_b).is_some(),
            Metric::Risk => self.risk_indicators(window, source_a, source_b).is_some(),
            Metric::Chart => self.price_chart(window, source_a, source_b).is_some(),
        }
    }

    /// Runs `metrics` in order. A failing step does not stop the ones after it.
    /// `on_step` is called after each step, whatever its outcome.
    pub fn run_all(
        &self,
        window: &AnalysisWindow,
        source_a: &str,
        source_b: &str,
        metrics: &[Metric],
        mut on_step: impl FnMut(Metric, bool),
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for &metric in metrics {
            let ok = self.run(metric, window, source_a, source_b);
            if ok {
                outcome.completed.push(metric);
            } else {
                outcome.failed.push(metric);
            }
            on_step(metric, ok);
        }
        outcome
    }

    fn run_metric<R, F>(
        &self,
        metric: Metric,
        window: &AnalysisWindow,
        source_a: &str,
        source_b: &str,
        compute: F,
    ) -> Option<R>
    where
        R: Serialize + Summary,
        F: FnOnce(&AnalyticsEngine, &PriceSeries, &PriceSeries, &AnalysisWindow) -> Result<R, AnalyticsError>,
    {
        let outcome = self.load_pair(window, source_a, source_b).and_then(|(a, b)| {
            let report = compute(&self.engine, &a, &b, window)?;
            Ok((key_for(&a, &b, window), report))
        });
        self.finish(metric, window, outcome)
    }

    /// Prints and persists a computed result, or logs why there is none.
    fn finish<R>(
        &self,
        metric: Metric,
        window: &AnalysisWindow,
        outcome: Result<(AnalysisKey, R), AnalyzerError>,
    ) -> Option<R>
    where
        R: Serialize + Summary,
    {
        let (key, report) = match outcome {
            Ok(done) => done,
            Err(e) => {
                tracing::error!(metric = metric.label(), %window, "Error while computing {}: {e}", metric.label());
                return None;
            }
        };

        println!("{}", report.summary(window));

        // The result was computed; a failed write is reported but does not undo it.
        match self.sink.save(&key, &report) {
            Ok(path) => tracing::info!(metric = metric.label(), path = %path.display(), "Result saved."),
            Err(e) => tracing::error!(metric = metric.label(), "Error while saving results: {e}"),
        }
        Some(report)
    }

    fn try_price_chart(
        &self,
        window: &AnalysisWindow,
        source_a: &str,
        source_b: &str,
    ) -> Result<(AnalysisKey, ChartRecord), AnalyzerError> {
        if source_a == source_b {
            return Err(AnalyzerError::IdenticalSources(source_a.to_string()));
        }

        let (a, b) = self.load_pair(window, source_a, source_b)?;
        let key = key_for(&a, &b, window);
        let chart = self.renderer.render(window, &a, &b)?;
        let path: PathBuf = self
            .sink
            .write_artifact(&key, &key.chart_file_name(), &chart.png)?;

        let record = ChartRecord {
            instrument1: a.instrument().clone(),
            instrument2: b.instrument().clone(),
            image: chart.to_base64(),
            chart_path: path.display().to_string(),
        };
        Ok((key, record))
    }

    fn load_pair(
        &self,
        window: &AnalysisWindow,
        source_a: &str,
        source_b: &str,
    ) -> Result<(PriceSeries, PriceSeries), AnalyzerError> {
        let a = self.load_checked(window, source_a)?;
        let b = self.load_checked(window, source_b)?;
        Ok((a, b))
    }

    /// Loads the full series and rejects it if `window` reaches outside its data.
    fn load_checked(&self, window: &AnalysisWindow, source: &str) -> Result<PriceSeries, AnalyzerError> {
        let series = self.store.load(source)?;
        tracing::debug!(source, rows = series.len(), "Loaded price series.");

        match feasibility::check(&series, window) {
            Feasibility::Feasible => Ok(series),
            Feasibility::NoData => Err(AnalyzerError::NoData(series.instrument().clone())),
            Feasibility::OutOfRange(coverage) => Err(AnalyzerError::OutOfRange {
                instrument: coverage.instrument,
                window: *window,
                first_date: coverage.first_date,
                last_date: coverage.last_date,
            }),
        }
    }
}

fn key_for(a: &PriceSeries, b: &PriceSeries, window: &AnalysisWindow) -> AnalysisKey {
    AnalysisKey::new(a.instrument().clone(), b.instrument().clone(), *window)
}
