use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::{Axis, Block, Chart, Dataset, GraphType, LegendPosition, Widget};
use serde::Deserialize;

use lustav_core::metrics::MetricKind;

use crate::result::RunOutcome;
use crate::OutputResult;

const PALETTE: [Color; 6] = [
    Color::LightBlue,
    Color::LightRed,
    Color::LightGreen,
    Color::LightMagenta,
    Color::LightCyan,
    Color::LightYellow,
];

#[derive(Deserialize, Debug, Clone)]
pub struct PlotSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricKind>,
    #[serde(default = "default_width")]
    pub width: u16,
    #[serde(default = "default_height")]
    pub height: u16,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            metrics: default_metrics(),
            width: default_width(),
            height: default_height(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_metrics() -> Vec<MetricKind> {
    vec![
        MetricKind::MeanSpeed,
        MetricKind::AverageTravelTime,
        MetricKind::CongestionLevels,
        MetricKind::TrafficFlowRate,
    ]
}

fn default_width() -> u16 {
    120
}

fn default_height() -> u16 {
    40
}

/// Time series of one metric, one line per penetration rate.
#[derive(Debug, Clone)]
pub struct MetricPlot {
    pub metric: MetricKind,
    lines: Vec<(String, Vec<(f64, f64)>)>,
}

impl MetricPlot {
    pub fn new(metric: MetricKind, outcomes: &[RunOutcome]) -> Self {
        let lines = outcomes
            .iter()
            .sorted_by_key(|outcome| outcome.rate)
            .map(|outcome| {
                let points = outcome
                    .series
                    .values(metric)
                    .iter()
                    .enumerate()
                    .map(|(step, value)| (step as f64, *value))
                    .collect();
                (format!("AV Rate {}", outcome.rate), points)
            })
            .collect();
        Self { metric, lines }
    }

    /// One plot per metric, in the given order.
    pub fn for_metrics(metrics: &[MetricKind], outcomes: &[RunOutcome]) -> Vec<Self> {
        metrics
            .iter()
            .map(|metric| Self::new(*metric, outcomes))
            .collect()
    }

    pub fn title(&self) -> String {
        format!(
            "{} Over Time for Different AV Penetration Rates",
            self.metric.title()
        )
    }

    fn x_bounds(&self) -> [f64; 2] {
        let last = self
            .lines
            .iter()
            .map(|(_, points)| points.len())
            .max()
            .unwrap_or(0);
        [0.0, last.saturating_sub(1).max(1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        let values = self.lines.iter().flat_map(|(_, points)| points.iter().map(|p| p.1));
        let (low, high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), v| {
            (low.min(v), high.max(v))
        });
        if !low.is_finite() || !high.is_finite() {
            return [0.0, 1.0];
        }
        let low = low.min(0.0);
        if high <= low {
            return [low, low + 1.0];
        }
        [low, high]
    }

    fn axis_labels(bounds: [f64; 2]) -> Vec<String> {
        let middle = (bounds[0] + bounds[1]) / 2.0;
        vec![
            format!("{:.1}", bounds[0]),
            format!("{:.1}", middle),
            format!("{:.1}", bounds[1]),
        ]
    }

    /// Builds the chart widget. The widget borrows the points held by this plot.
    pub fn chart(&self) -> Chart<'_> {
        let datasets = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, (name, points))| {
                Dataset::default()
                    .name(name.clone())
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                    .data(points)
            })
            .collect::<Vec<_>>();
        let x_bounds = self.x_bounds();
        let y_bounds = self.y_bounds();
        Chart::new(datasets)
            .block(Block::bordered().title(self.title()))
            .x_axis(
                Axis::default()
                    .title("Time Step")
                    .style(Style::default().fg(Color::Gray))
                    .bounds(x_bounds)
                    .labels(Self::axis_labels(x_bounds)),
            )
            .y_axis(
                Axis::default()
                    .title(self.metric.label())
                    .style(Style::default().fg(Color::Gray))
                    .bounds(y_bounds)
                    .labels(Self::axis_labels(y_bounds)),
            )
            .legend_position(Some(LegendPosition::TopRight))
            .hidden_legend_constraints((Constraint::Percentage(50), Constraint::Percentage(50)))
    }

    /// Renders the chart off-screen and returns it as plain text lines.
    pub fn render_text(&self, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        self.chart().render(area, &mut buffer);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .join("\n")
    }
}

/// Writes `plot_<metric><suffix>.txt` for every configured metric and returns the paths.
pub fn write_plots(
    output_path: &Path,
    suffix: &str,
    outcomes: &[RunOutcome],
    settings: &PlotSettings,
) -> OutputResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for plot in MetricPlot::for_metrics(&settings.metrics, outcomes) {
        let file = output_path.join(format!("plot_{}{}.txt", plot.metric.name(), suffix));
        fs::write(&file, plot.render_text(settings.width, settings.height) + "\n")?;
        written.push(file);
    }
    Ok(written)
}
