use std::path::Path;

use csv::WriterBuilder;
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;

use lustav_core::metrics::MetricKind;

use crate::result::RunOutcome;
use crate::OutputResult;

/// Label of the trip row that covers every vehicle type.
pub const ALL_TYPES: &str = "all";

/// A row of one of the CSV reports. Files always start with the header, even without rows.
///
/// `av_rate` holds the shortest percentage form of the rate, `50%` and `12.5%`, never
/// `50.0%`. Compare rates numerically when joining with files that use another form.
pub trait CsvRow: Serialize {
    const HEADER: &'static [&'static str];
}

#[derive(Serialize, Debug, PartialEq)]
pub struct StatisticsRow {
    pub av_rate: String,
    pub metric: String,
    pub average: String,
    pub maximum: String,
    pub minimum: String,
    pub final_value: String,
}

impl CsvRow for StatisticsRow {
    const HEADER: &'static [&'static str] = &[
        "av_rate",
        "metric",
        "average",
        "maximum",
        "minimum",
        "final_value",
    ];
}

#[derive(Serialize, Debug, PartialEq)]
pub struct AdaptationRow {
    pub av_rate: String,
    pub total_adaptations: u64,
    pub autonomous_vehicles: u64,
}

impl CsvRow for AdaptationRow {
    const HEADER: &'static [&'static str] =
        &["av_rate", "total_adaptations", "autonomous_vehicles"];
}

#[derive(Serialize, Debug, PartialEq)]
pub struct TripRow {
    pub av_rate: String,
    pub v_type: String,
    pub trips: usize,
    pub mean_duration: String,
    pub mean_time_loss: String,
    pub mean_stops: String,
    pub total_fuel: String,
}

impl CsvRow for TripRow {
    const HEADER: &'static [&'static str] = &[
        "av_rate",
        "v_type",
        "trips",
        "mean_duration",
        "mean_time_loss",
        "mean_stops",
        "total_fuel",
    ];
}

fn two_decimals(value: f64) -> String {
    format!("{:.2}", value)
}

fn by_rate(outcomes: &[RunOutcome]) -> impl Iterator<Item = &RunOutcome> {
    outcomes.iter().sorted_by_key(|outcome| outcome.rate)
}

pub fn statistics_rows(outcomes: &[RunOutcome]) -> Vec<StatisticsRow> {
    let mut rows = Vec::new();
    for outcome in by_rate(outcomes) {
        for kind in MetricKind::ALL {
            let Some(stats) = outcome.series.stats(kind) else {
                debug!("No values for {} at rate {}", kind, outcome.rate);
                continue;
            };
            rows.push(StatisticsRow {
                av_rate: outcome.rate.label(),
                metric: kind.name().to_string(),
                average: two_decimals(stats.average),
                maximum: two_decimals(stats.maximum),
                minimum: two_decimals(stats.minimum),
                final_value: two_decimals(stats.final_value),
            });
        }
    }
    rows
}

pub fn adaptation_rows(outcomes: &[RunOutcome]) -> Vec<AdaptationRow> {
    by_rate(outcomes)
        .map(|outcome| AdaptationRow {
            av_rate: outcome.rate.label(),
            total_adaptations: outcome.adaptations,
            autonomous_vehicles: outcome.autonomous_vehicles,
        })
        .collect()
}

pub fn trip_rows(outcomes: &[RunOutcome]) -> Vec<TripRow> {
    let mut rows = Vec::new();
    for outcome in by_rate(outcomes) {
        let Some(trips) = &outcome.trips else {
            continue;
        };
        let groups = std::iter::once((ALL_TYPES, &trips.overall)).chain(
            trips
                .by_type
                .iter()
                .map(|(v_type, summary)| (v_type.as_str(), summary)),
        );
        for (v_type, summary) in groups {
            rows.push(TripRow {
                av_rate: outcome.rate.label(),
                v_type: v_type.to_string(),
                trips: summary.trips,
                mean_duration: two_decimals(summary.mean_duration),
                mean_time_loss: two_decimals(summary.mean_time_loss),
                mean_stops: two_decimals(summary.mean_stops),
                total_fuel: two_decimals(summary.total_fuel),
            });
        }
    }
    rows
}

pub fn write_rows<T: CsvRow>(output_file: &Path, rows: &[T]) -> OutputResult<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(output_file)?;
    writer.write_record(T::HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Wrote {} rows to {}", rows.len(), output_file.display());
    Ok(())
}
