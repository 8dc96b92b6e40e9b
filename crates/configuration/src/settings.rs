use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; missing values fall back to the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub analysis: AnalysisSettings,
    pub chart: ChartSettings,
    pub logging: Logging,
}

/// Where price files are read from and where analysis records are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Directory holding one `{instrument}.json` price file per instrument.
    pub data_dir: PathBuf,
    /// Root under which one directory per analysis is created.
    pub results_root: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("financial_data_json"),
            results_root: PathBuf::from("results"),
        }
    }
}

/// Parameters shared by the metric computations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Subtracted from every daily percentage return before the Sharpe and
    /// Sortino ratios are taken. Expressed in percentage points per period.
    pub risk_free_rate: f64,
    /// The steps run by the batch `analyze` command, in order.
    pub metrics: Vec<Metric>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            risk_free_rate: 5.0,
            metrics: Metric::ALL.to_vec(),
        }
    }
}

/// Output size and font of the normalized comparison chart.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
    /// A TrueType font for titles and labels. When unset, a few common system
    /// locations are searched; without any font the chart is drawn unlabeled.
    pub font_path: Option<PathBuf>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            font_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Logging {
    /// When set, diagnostics are also written to a daily-rotated file in this directory.
    pub directory: Option<PathBuf>,
}

/// One analysis step of the batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Percentage change between the first and last close in the window.
    Return,
    /// Pearson correlation of the aligned close prices.
    Correlation,
    /// Pearson correlation of the aligned daily percentage changes.
    Moves,
    /// Mean, median, standard deviation, min and max of the closes.
    Stats,
    /// Sharpe and Sortino ratios of the daily excess returns.
    Risk,
    /// Normalized comparison chart.
    Chart,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::Return,
        Metric::Correlation,
        Metric::Moves,
        Metric::Stats,
        Metric::Risk,
        Metric::Chart,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Return => "investment return",
            Metric::Correlation => "correlation",
            Metric::Moves => "correlation between declines and increases",
            Metric::Stats => "basic statistics",
            Metric::Risk => "risk indicators",
            Metric::Chart => "price chart",
        }
    }
}
