use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{Datelike, Duration, NaiveDate};
use core_types::{AnalysisWindow, PriceSeries};
use plotters::prelude::*;
use std::ops::Range;

use crate::error::ChartError;
use crate::font::{FONT_FAMILY, ensure_registered};

const TITLE: &str = "Normalized Price Chart";
const X_AXIS_LABEL: &str = "Date";
const Y_AXIS_LABEL: &str = "Percent Change (%)";

const FIRST_COLOR: RGBColor = RGBColor(0x34, 0x8d, 0xc1);
const SECOND_COLOR: RGBColor = RGBColor(0xff, 0x99, 0x33);

/// Windows shorter than this get monthly ticks, longer ones yearly.
const MONTHLY_TICK_LIMIT_DAYS: i64 = 730;
const MAX_X_LABELS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickGranularity {
    Monthly,
    Yearly,
}

impl TickGranularity {
    pub fn for_window(window: &AnalysisWindow) -> Self {
        if window.span_days() < MONTHLY_TICK_LIMIT_DAYS {
            TickGranularity::Monthly
        } else {
            TickGranularity::Yearly
        }
    }

    pub fn date_format(self) -> &'static str {
        match self {
            TickGranularity::Monthly => "%Y-%m",
            TickGranularity::Yearly => "%Y",
        }
    }

    /// Number of month or year boundaries the window touches.
    fn label_count(self, window: &AnalysisWindow) -> usize {
        let (start, end) = (window.start(), window.end());
        let count = match self {
            TickGranularity::Monthly => {
                (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32 + 1
            }
            TickGranularity::Yearly => end.year() - start.year() + 1,
        };
        (count.max(2) as usize).min(MAX_X_LABELS)
    }
}

/// Rescales a series so its first close is 100.
pub fn normalize(series: &PriceSeries) -> Result<Vec<(NaiveDate, f64)>, ChartError> {
    let name = series.instrument().as_str();
    let first = series
        .first()
        .ok_or_else(|| ChartError::EmptySeries(name.to_string()))?;
    if first.close.is_zero() {
        return Err(ChartError::ZeroBase(name.to_string()));
    }
    let base = first.close_f64();

    Ok(series
        .points()
        .iter()
        .map(|p| (p.date, p.close_f64() / base * 100.0))
        .collect())
}

/// Value axis from 0 up to the largest normalized value of either line.
fn y_range(lines: &[(&str, Vec<(NaiveDate, f64)>, RGBColor)]) -> Result<Range<f64>, ChartError> {
    let y_max = lines
        .iter()
        .flat_map(|(_, points, _)| points.iter().map(|(_, v)| *v))
        .fold(f64::NEG_INFINITY, f64::max);
    if !y_max.is_finite() || y_max <= 0.0 {
        return Err(ChartError::InvalidRange);
    }
    Ok(0.0..y_max)
}

/// An encoded chart image.
#[derive(Debug, Clone)]
pub struct Chart {
    pub png: Vec<u8>,
}

impl Chart {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }
}

/// Draws the normalized price chart of two instruments.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
    font_path: Option<std::path::PathBuf>,
}

impl ChartRenderer {
    pub fn new(width: u32, height: u32, font_path: Option<std::path::PathBuf>) -> Self {
        Self {
            width,
            height,
            font_path,
        }
    }

    pub fn render(
        &self,
        window: &AnalysisWindow,
        first: &PriceSeries,
        second: &PriceSeries,
    ) -> Result<Chart, ChartError> {
        let lines = [
            (first.instrument().as_str(), normalize(&first.within(window))?, FIRST_COLOR),
            (second.instrument().as_str(), normalize(&second.within(window))?, SECOND_COLOR),
        ];

        let y_range = y_range(&lines)?;

        let labelled = ensure_registered(self.font_path.as_deref());
        let granularity = TickGranularity::for_window(window);

        let mut buffer = vec![0u8; self.width as usize * self.height as usize * 3];
        self.draw(&mut buffer, window, granularity, &lines, y_range, labelled)?;

        let image = image::RgbImage::from_raw(self.width, self.height, buffer)
            .ok_or_else(|| ChartError::Drawing("pixel buffer size mismatch".to_string()))?;
        let mut png = Vec::new();
        image.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;

        tracing::debug!(bytes = png.len(), labelled, "Rendered chart.");
        Ok(Chart { png })
    }

    fn draw(
        &self,
        buffer: &mut [u8],
        window: &AnalysisWindow,
        granularity: TickGranularity,
        lines: &[(&str, Vec<(NaiveDate, f64)>, RGBColor)],
        y_range: Range<f64>,
        labelled: bool,
    ) -> Result<(), ChartError> {
        let drawing = |e: &dyn std::fmt::Display| ChartError::Drawing(e.to_string());

        let root = BitMapBackend::with_buffer(buffer, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| drawing(&e))?;

        // A single-day window still needs a non-empty x range.
        let x_end = if window.end() > window.start() {
            window.end()
        } else {
            window.start() + Duration::days(1)
        };

        let label_area = if labelled { 50 } else { 0 };
        let mut builder = ChartBuilder::on(&root);
        builder
            .margin(15)
            .x_label_area_size(label_area)
            .y_label_area_size(label_area);
        if labelled {
            builder.caption(TITLE, (FONT_FAMILY, 20));
        }
        let mut chart = builder
            .build_cartesian_2d(window.start()..x_end, y_range)
            .map_err(|e| drawing(&e))?;

        let pattern = granularity.date_format();
        let x_labels = if labelled { granularity.label_count(window) } else { 0 };
        let y_labels = if labelled { 8 } else { 0 };
        let x_formatter = |d: &NaiveDate| d.format(pattern).to_string();
        let y_formatter = |v: &f64| format!("{v:.0}");

        let mut mesh = chart.configure_mesh();
        mesh.x_labels(x_labels)
            .y_labels(y_labels)
            .x_label_formatter(&x_formatter)
            .y_label_formatter(&y_formatter)
            .light_line_style(RGBColor(0xee, 0xee, 0xee));
        if labelled {
            mesh.x_desc(X_AXIS_LABEL)
                .y_desc(Y_AXIS_LABEL)
                .label_style((FONT_FAMILY, 12));
        }
        mesh.draw().map_err(|e| drawing(&e))?;

        for (name, points, color) in lines {
            let color = *color;
            let series = chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                .map_err(|e| drawing(&e))?;
            if labelled {
                series
                    .label(*name)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }
        }

        if labelled {
            chart
                .configure_series_labels()
                .label_font((FONT_FAMILY, 12))
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .position(SeriesLabelPosition::UpperLeft)
                .draw()
                .map_err(|e| drawing(&e))?;
        }

        root.present().map_err(|e| drawing(&e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{InstrumentId, PricePoint};
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn window(start: &str, end: &str) -> AnalysisWindow {
        AnalysisWindow::new(date(start), date(end)).unwrap()
    }

    fn series(name: &str, closes: &[(&str, rust_decimal::Decimal)]) -> PriceSeries {
        PriceSeries::new(
            InstrumentId::new(name),
            closes.iter().map(|(d, c)| PricePoint::new(date(d), *c)).collect(),
        )
        .unwrap()
    }

    #[test]
    fn normalization_starts_at_one_hundred() {
        let s = series(
            "btc",
            &[("2021-01-01", dec!(50)), ("2021-01-02", dec!(75)), ("2021-01-03", dec!(25))],
        );
        let values: Vec<f64> = normalize(&s).unwrap().into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![100.0, 150.0, 50.0]);
    }

    #[test]
    fn normalization_rejects_zero_base_and_empty_series() {
        let zero = series("z", &[("2021-01-01", dec!(0)), ("2021-01-02", dec!(1))]);
        assert!(matches!(normalize(&zero), Err(ChartError::ZeroBase(_))));

        let empty = PriceSeries::new(InstrumentId::new("e"), vec![]).unwrap();
        assert!(matches!(normalize(&empty), Err(ChartError::EmptySeries(_))));
    }

    #[test]
    fn value_axis_spans_zero_to_the_highest_line() {
        let d = date("2021-01-01");
        let lines = [
            ("a", vec![(d, 100.0), (d, 140.0)], FIRST_COLOR),
            ("b", vec![(d, 100.0), (d, 180.5)], SECOND_COLOR),
        ];
        assert_eq!(y_range(&lines).unwrap(), 0.0..180.5);

        let empty = [("a", Vec::new(), FIRST_COLOR)];
        assert!(matches!(y_range(&empty), Err(ChartError::InvalidRange)));
    }

    #[test]
    fn ticks_are_monthly_below_two_years() {
        let short = window("2020-01-01", "2021-12-30");
        let long = window("2020-01-01", "2021-12-31");
        assert_eq!(TickGranularity::for_window(&short), TickGranularity::Monthly);
        assert_eq!(TickGranularity::for_window(&long), TickGranularity::Yearly);
        assert_eq!(TickGranularity::Monthly.date_format(), "%Y-%m");
        assert_eq!(TickGranularity::Yearly.date_format(), "%Y");
    }

    #[test]
    fn label_count_is_bounded() {
        assert_eq!(TickGranularity::Monthly.label_count(&window("2020-01-15", "2020-03-02")), 3);
        assert_eq!(TickGranularity::Yearly.label_count(&window("2010-01-01", "2030-01-01")), 12);
        assert_eq!(TickGranularity::Monthly.label_count(&window("2020-01-01", "2020-01-05")), 2);
    }

    #[test]
    fn render_produces_a_png() {
        let a = series(
            "aaa",
            &[("2021-01-01", dec!(10)), ("2021-02-01", dec!(12)), ("2021-03-01", dec!(11))],
        );
        let b = series(
            "bbb",
            &[("2021-01-01", dec!(200)), ("2021-02-01", dec!(180)), ("2021-03-01", dec!(260))],
        );
        let renderer = ChartRenderer::new(320, 240, None);

        let chart = renderer.render(&window("2021-01-01", "2021-03-01"), &a, &b).unwrap();

        assert_eq!(&chart.png[..8], b"\x89PNG\r\n\x1a\n");
        assert!(!chart.to_base64().is_empty());
    }

    #[test]
    fn render_fails_when_a_series_has_no_rows_in_the_window() {
        let a = series("aaa", &[("2021-01-01", dec!(10)), ("2021-02-01", dec!(12))]);
        let b = series("bbb", &[("2022-01-01", dec!(10)), ("2022-02-01", dec!(12))]);
        let renderer = ChartRenderer::new(320, 240, None);

        let result = renderer.render(&window("2021-01-01", "2021-02-01"), &a, &b);

        assert!(matches!(result, Err(ChartError::EmptySeries(name)) if name == "bbb"));
    }
}
