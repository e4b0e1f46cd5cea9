use std::fs;

use lustav_core::metrics::{MetricKind, MetricSeries, StepMetrics};
use lustav_core::rate::PenetrationRate;
use lustav_input::tripinfo::TripRecord;
use lustav_output::plots::PlotSettings;
use lustav_output::report::{
    adaptation_rows, statistics_rows, trip_rows, write_rows, CsvRow, StatisticsRow, TripRow,
    ALL_TYPES,
};
use lustav_output::result::{OutputSettings, Results, RunOutcome, TripOutcome};
use lustav_testutils::scratch::scratch_dir;

fn outcome(rate: f64, speeds: &[f64]) -> RunOutcome {
    let mut series = MetricSeries::new();
    for speed in speeds {
        series.push(
            StepMetrics::empty()
                .with(MetricKind::MeanSpeed, *speed)
                .with(MetricKind::NumberOfStops, 1.0),
        );
    }
    RunOutcome {
        rate: PenetrationRate::new(rate).unwrap(),
        series,
        adaptations: 4,
        autonomous_vehicles: (rate * 10.0) as u64,
        trips: None,
    }
}

fn settings(output_path: &str) -> OutputSettings {
    OutputSettings {
        output_path: output_path.to_string(),
        timestamped: false,
        statistics_file: "simulation_metrics.csv".to_string(),
        adaptation_file: "traffic_light_adaptations.csv".to_string(),
        trip_file: None,
        series_file: None,
        plot_settings: PlotSettings {
            enabled: false,
            ..PlotSettings::default()
        },
    }
}

#[test]
fn test_statistics_rows_sorted_by_rate() {
    let outcomes = vec![outcome(1.0, &[8.0]), outcome(0.5, &[10.0, 12.0, 11.0])];
    let rows = statistics_rows(&outcomes);
    assert_eq!(rows.len(), 2 * MetricKind::COUNT);
    assert_eq!(rows[0].av_rate, "50%");
    assert_eq!(rows[0].metric, "number_of_stops");

    let speed = rows
        .iter()
        .find(|row| row.av_rate == "50%" && row.metric == "mean_speed")
        .unwrap();
    assert_eq!(speed.average, "11.00");
    assert_eq!(speed.maximum, "12.00");
    assert_eq!(speed.minimum, "10.00");
    assert_eq!(speed.final_value, "11.00");
    assert_eq!(rows[MetricKind::COUNT].av_rate, "100%");
}

#[test]
fn test_empty_series_has_no_rows() {
    let rows = statistics_rows(&[outcome(0.0, &[])]);
    assert!(rows.is_empty());
}

#[test]
fn test_adaptation_rows() {
    let rows = adaptation_rows(&[outcome(1.0, &[1.0]), outcome(0.0, &[1.0])]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].av_rate, "0%");
    assert_eq!(rows[0].autonomous_vehicles, 0);
    assert_eq!(rows[1].av_rate, "100%");
    assert_eq!(rows[1].total_adaptations, 4);
    assert_eq!(rows[1].autonomous_vehicles, 10);
}

#[test]
fn test_trip_rows_lead_with_all_types() {
    let trips = vec![
        TripRecord::builder()
            .id("a")
            .v_type("passenger")
            .duration(100.0)
            .waiting_count(2)
            .build(),
        TripRecord::builder()
            .id("b")
            .v_type("autonomous_passenger")
            .duration(50.0)
            .fuel(Some(30.0))
            .build(),
    ];
    let mut with_trips = outcome(0.5, &[1.0]);
    with_trips.trips = Some(TripOutcome::of(&trips));
    let rows = trip_rows(&[with_trips, outcome(0.0, &[1.0])]);

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].v_type, ALL_TYPES);
    assert_eq!(rows[0].trips, 2);
    assert_eq!(rows[0].mean_duration, "75.00");
    assert_eq!(rows[0].mean_stops, "1.00");
    assert_eq!(rows[0].total_fuel, "30.00");
    assert_eq!(rows[1].v_type, "passenger");
    assert_eq!(rows[2].v_type, "autonomous_passenger");
}

#[test]
fn test_write_all_creates_reports() {
    let output = scratch_dir("reports");
    let settings = settings(&output.display().to_string());
    let results = Results::new(output.clone(), &settings).unwrap();
    results
        .write_all(&[outcome(0.0, &[3.0, 5.0]), outcome(0.5, &[4.0])])
        .unwrap();

    let statistics = fs::read_to_string(output.join("simulation_metrics.csv")).unwrap();
    let lines: Vec<&str> = statistics.lines().collect();
    assert_eq!(lines[0], "av_rate,metric,average,maximum,minimum,final_value");
    assert_eq!(lines.len(), 1 + 2 * MetricKind::COUNT);
    assert!(lines.contains(&"0%,mean_speed,4.00,5.00,3.00,5.00"));

    let adaptations = fs::read_to_string(output.join("traffic_light_adaptations.csv")).unwrap();
    assert_eq!(
        adaptations.lines().collect::<Vec<_>>(),
        vec![
            "av_rate,total_adaptations,autonomous_vehicles",
            "0%,4,0",
            "50%,4,5"
        ]
    );
    assert!(results.trip_file().is_none());
    assert!(results.tripinfo_file(PenetrationRate::new(0.5).unwrap()).is_none());
}

#[test]
fn test_trip_file_without_trips_keeps_header() {
    let output = scratch_dir("reports_no_trips");
    let mut settings = settings(&output.display().to_string());
    settings.trip_file = Some("trips.csv".to_string());
    let results = Results::new(output.clone(), &settings).unwrap();
    results.write_all(&[outcome(0.0, &[1.0])]).unwrap();

    let trips = fs::read_to_string(output.join("trips.csv")).unwrap();
    assert_eq!(
        trips.lines().collect::<Vec<_>>(),
        vec!["av_rate,v_type,trips,mean_duration,mean_time_loss,mean_stops,total_fuel"]
    );
}

#[test]
fn test_header_matches_serialized_fields() {
    let output = scratch_dir("reports_header");
    let file = output.join("statistics.csv");
    write_rows(&file, &statistics_rows(&[outcome(0.5, &[2.0])])).unwrap();
    let written = fs::read_to_string(&file).unwrap();
    let mut lines = written.lines();
    assert_eq!(lines.next(), Some(StatisticsRow::HEADER.join(",").as_str()));
    assert_eq!(lines.count(), MetricKind::COUNT);

    let empty: Vec<TripRow> = Vec::new();
    write_rows(&file, &empty).unwrap();
    assert_eq!(
        fs::read_to_string(&file).unwrap().trim_end(),
        TripRow::HEADER.join(",")
    );
}
