use std::fs;
use std::fs::File;

use arrow::array::{Float64Array, UInt64Array};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use lustav_core::metrics::{MetricKind, MetricSeries, StepMetrics};
use lustav_core::rate::PenetrationRate;
use lustav_output::plots::PlotSettings;
use lustav_output::result::{OutputSettings, Results, RunOutcome};
use lustav_output::series::SeriesWriter;
use lustav_testutils::scratch::scratch_dir;

fn settings(timestamped: bool) -> OutputSettings {
    OutputSettings {
        output_path: "output".to_string(),
        timestamped,
        statistics_file: "metrics.csv".to_string(),
        adaptation_file: "adaptations.csv".to_string(),
        trip_file: Some("trips.csv".to_string()),
        series_file: Some("series.csv".to_string()),
        plot_settings: PlotSettings::default(),
    }
}

#[test]
fn test_plain_file_names() {
    let output = scratch_dir("plain_names");
    let results = Results::new(output.clone(), &settings(false)).unwrap();
    assert_eq!(results.statistics_file(), output.join("metrics.csv"));
    assert_eq!(results.trip_file(), Some(output.join("trips.csv")));
    assert_eq!(
        results.tripinfo_file(PenetrationRate::new(0.25).unwrap()),
        Some(output.join("tripinfo_25.xml"))
    );
}

#[test]
fn test_timestamped_file_names() {
    let output = scratch_dir("stamped_names");
    let results = Results::new(output.clone(), &settings(true)).unwrap();
    let name = results
        .adaptation_file()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    // adaptations_YYYYmmdd_HHMMSS.csv
    assert!(name.starts_with("adaptations_"));
    assert!(name.ends_with(".csv"));
    assert_eq!(name.len(), "adaptations_".len() + 15 + ".csv".len());
    assert_eq!(
        results.statistics_file().file_name().unwrap().len(),
        "metrics_".len() + 15 + ".csv".len()
    );
}

#[test]
fn test_output_directory_is_created() {
    let output = scratch_dir("nested").join("a").join("b");
    Results::new(output.clone(), &settings(false)).unwrap();
    assert!(output.is_dir());
}

#[test]
fn test_series_file_has_one_row_per_step_and_rate() {
    let output = scratch_dir("series");
    let file = output.join("series.csv");
    let mut series = MetricSeries::new();
    series.push(StepMetrics::empty().with(MetricKind::MeanSpeed, 3.5));
    series.push(StepMetrics::empty().with(MetricKind::MeanSpeed, 4.5));

    let mut writer = SeriesWriter::new(&file).unwrap();
    writer.add_run(PenetrationRate::new(0.0).unwrap(), &series).unwrap();
    writer.add_run(PenetrationRate::new(1.0).unwrap(), &series).unwrap();
    writer.close_file().unwrap();

    let content = fs::read_to_string(&file).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines[0],
        "time_step,av_rate,number_of_stops,fuel_consumption,average_travel_time,\
         mean_time_in_network,traffic_flow_rate,congestion_levels,mean_speed"
    );
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("0,0"));
    assert!(lines[4].starts_with("1,1"));
}

#[test]
fn test_unknown_series_extension_is_rejected() {
    let output = scratch_dir("series_ext");
    assert!(SeriesWriter::new(&output.join("series.json")).is_err());
}

#[test]
fn test_write_all_with_series_and_plots() {
    let output = scratch_dir("write_all");
    let mut settings = settings(false);
    settings.trip_file = None;
    let results = Results::new(output.clone(), &settings).unwrap();
    let mut series = MetricSeries::new();
    series.push(StepMetrics::empty().with(MetricKind::MeanSpeed, 2.0));
    let outcome = RunOutcome {
        rate: PenetrationRate::new(0.5).unwrap(),
        series,
        adaptations: 0,
        autonomous_vehicles: 0,
        trips: None,
    };
    results.write_all(&[outcome]).unwrap();

    assert!(output.join("series.csv").exists());
    for metric in results.plot_metrics() {
        assert!(output.join(format!("plot_{}.txt", metric.name())).exists());
    }
    assert!(!output.join("trips.csv").exists());
}

#[test]
fn test_parquet_series_reads_back() {
    let output = scratch_dir("series_parquet");
    let file = output.join("series.parquet");
    let mut slow = MetricSeries::new();
    slow.push(StepMetrics::empty().with(MetricKind::MeanSpeed, 3.0));
    slow.push(StepMetrics::empty().with(MetricKind::MeanSpeed, 4.0));
    slow.push(StepMetrics::empty().with(MetricKind::MeanSpeed, 5.0));
    let mut fast = MetricSeries::new();
    fast.push(StepMetrics::empty().with(MetricKind::MeanSpeed, 9.0));
    fast.push(StepMetrics::empty().with(MetricKind::MeanSpeed, 11.0));

    let mut writer = SeriesWriter::new(&file).unwrap();
    writer.add_run(PenetrationRate::new(0.0).unwrap(), &slow).unwrap();
    writer.add_run(PenetrationRate::new(0.5).unwrap(), &fast).unwrap();
    writer.close_file().unwrap();

    let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&file).unwrap())
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<_> = reader.map(|batch| batch.unwrap()).collect();
    let schema = batches[0].schema();
    let columns: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    let mut expected = vec!["time_step", "av_rate"];
    expected.extend(MetricKind::ALL.iter().map(|kind| kind.name()));
    assert_eq!(columns, expected);
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 5);

    let steps: Vec<u64> = batches
        .iter()
        .flat_map(|b| {
            let column = b.column_by_name("time_step").unwrap();
            column.as_any().downcast_ref::<UInt64Array>().unwrap().values().to_vec()
        })
        .collect();
    assert_eq!(steps, vec![0, 1, 2, 0, 1]);
    let rates: Vec<f64> = batches
        .iter()
        .flat_map(|b| {
            let column = b.column_by_name("av_rate").unwrap();
            column.as_any().downcast_ref::<Float64Array>().unwrap().values().to_vec()
        })
        .collect();
    assert_eq!(rates, vec![0.0, 0.0, 0.0, 0.5, 0.5]);
}
