use std::fmt::{Display, Formatter};
use std::str::FromStr;

use indexmap::IndexMap;
use itertools::{Itertools, MinMaxResult};
use serde::Deserialize;
use typed_builder::TypedBuilder;

/// Aggregate quantities sampled from the running network once per step.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    NumberOfStops,
    FuelConsumption,
    AverageTravelTime,
    MeanTimeInNetwork,
    TrafficFlowRate,
    CongestionLevels,
    MeanSpeed,
}

impl MetricKind {
    pub const COUNT: usize = 7;

    /// Report order of the metrics.
    pub const ALL: [MetricKind; MetricKind::COUNT] = [
        MetricKind::NumberOfStops,
        MetricKind::FuelConsumption,
        MetricKind::AverageTravelTime,
        MetricKind::MeanTimeInNetwork,
        MetricKind::TrafficFlowRate,
        MetricKind::CongestionLevels,
        MetricKind::MeanSpeed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::NumberOfStops => "number_of_stops",
            MetricKind::FuelConsumption => "fuel_consumption",
            MetricKind::AverageTravelTime => "average_travel_time",
            MetricKind::MeanTimeInNetwork => "mean_time_in_network",
            MetricKind::TrafficFlowRate => "traffic_flow_rate",
            MetricKind::CongestionLevels => "congestion_levels",
            MetricKind::MeanSpeed => "mean_speed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::NumberOfStops => "Stopped Vehicles",
            MetricKind::FuelConsumption => "Fuel Consumption (mg/s)",
            MetricKind::AverageTravelTime => "Average Travel Time (s)",
            MetricKind::MeanTimeInNetwork => "Mean Time in Network (s)",
            MetricKind::TrafficFlowRate => "Traffic Flow Rate (veh/s)",
            MetricKind::CongestionLevels => "Congested Vehicles",
            MetricKind::MeanSpeed => "Mean Speed (m/s)",
        }
    }

    /// Title-cased name, `mean_speed` becomes `Mean Speed`.
    pub fn title(&self) -> String {
        self.name()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .join(" ")
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl Display for MetricKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .iter()
            .find(|kind| kind.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown metric {}", s))
    }
}

/// Values of every metric for a single step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepMetrics {
    values: [f64; MetricKind::COUNT],
}

impl StepMetrics {
    /// Metrics of a step without vehicles in the network.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: MetricKind) -> f64 {
        self.values[kind.index()]
    }

    pub fn set(&mut self, kind: MetricKind, value: f64) {
        self.values[kind.index()] = value;
    }

    pub fn with(mut self, kind: MetricKind, value: f64) -> Self {
        self.set(kind, value);
        self
    }
}

/// Summary of one metric's time series.
#[derive(Clone, Copy, Debug, PartialEq, TypedBuilder)]
pub struct SeriesStats {
    pub average: f64,
    pub maximum: f64,
    pub minimum: f64,
    pub final_value: f64,
}

impl SeriesStats {
    pub fn of(values: &[f64]) -> Option<Self> {
        let final_value = *values.last()?;
        let (minimum, maximum) = match values.iter().minmax_by(|a, b| a.total_cmp(b)) {
            MinMaxResult::NoElements => return None,
            MinMaxResult::OneElement(value) => (*value, *value),
            MinMaxResult::MinMax(min, max) => (*min, *max),
        };
        let average = values.iter().sum::<f64>() / values.len() as f64;
        Some(
            SeriesStats::builder()
                .average(average)
                .maximum(maximum)
                .minimum(minimum)
                .final_value(final_value)
                .build(),
        )
    }
}

/// Per-metric time series of one run, indexed by step.
#[derive(Clone, Debug)]
pub struct MetricSeries {
    series: IndexMap<MetricKind, Vec<f64>>,
}

impl Default for MetricSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSeries {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(steps: usize) -> Self {
        let series = MetricKind::ALL
            .iter()
            .map(|kind| (*kind, Vec::with_capacity(steps)))
            .collect();
        Self { series }
    }

    pub fn push(&mut self, metrics: StepMetrics) {
        for (kind, values) in self.series.iter_mut() {
            values.push(metrics.get(*kind));
        }
    }

    pub fn len(&self) -> usize {
        self.series.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self, kind: MetricKind) -> &[f64] {
        self.series.get(&kind).map_or(&[], Vec::as_slice)
    }

    pub fn stats(&self, kind: MetricKind) -> Option<SeriesStats> {
        SeriesStats::of(self.values(kind))
    }

    pub fn step(&self, index: usize) -> Option<StepMetrics> {
        if index >= self.len() {
            return None;
        }
        let mut metrics = StepMetrics::empty();
        for (kind, values) in self.series.iter() {
            metrics.set(*kind, values[index]);
        }
        Some(metrics)
    }
}
