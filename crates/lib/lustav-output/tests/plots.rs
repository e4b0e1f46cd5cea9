use crossterm::event::{KeyCode, KeyEvent};

use lustav_core::metrics::{MetricKind, MetricSeries, StepMetrics};
use lustav_core::rate::PenetrationRate;
use lustav_output::plots::{write_plots, MetricPlot, PlotSettings};
use lustav_output::result::RunOutcome;
use lustav_output::terminal::{handle_plot_key_events, PlotBrowser};
use lustav_testutils::scratch::scratch_dir;

fn outcome(rate: f64, speeds: &[f64]) -> RunOutcome {
    let mut series = MetricSeries::new();
    for speed in speeds {
        series.push(StepMetrics::empty().with(MetricKind::MeanSpeed, *speed));
    }
    RunOutcome {
        rate: PenetrationRate::new(rate).unwrap(),
        series,
        adaptations: 0,
        autonomous_vehicles: 0,
        trips: None,
    }
}

#[test]
fn test_default_plot_metrics() {
    let settings = PlotSettings::default();
    assert!(settings.enabled);
    assert_eq!(
        settings.metrics,
        vec![
            MetricKind::MeanSpeed,
            MetricKind::AverageTravelTime,
            MetricKind::CongestionLevels,
            MetricKind::TrafficFlowRate,
        ]
    );
}

#[test]
fn test_chart_renders_title_as_text() {
    let outcomes = vec![outcome(0.0, &[1.0, 4.0, 9.0]), outcome(1.0, &[2.0, 3.0, 4.0])];
    let plot = MetricPlot::new(MetricKind::MeanSpeed, &outcomes);
    assert_eq!(
        plot.title(),
        "Mean Speed Over Time for Different AV Penetration Rates"
    );
    let text = plot.render_text(100, 30);
    assert_eq!(text.lines().count(), 30);
    assert!(text.contains("Mean Speed Over Time"));
}

#[test]
fn test_chart_without_runs_still_renders() {
    let plot = MetricPlot::new(MetricKind::CongestionLevels, &[]);
    let text = plot.render_text(80, 20);
    assert!(text.contains("Congestion Levels"));
}

#[test]
fn test_write_plots_names_files_by_metric() {
    let output = scratch_dir("plots");
    let settings = PlotSettings {
        metrics: vec![MetricKind::MeanSpeed, MetricKind::TrafficFlowRate],
        ..PlotSettings::default()
    };
    let written = write_plots(&output, "_run", &[outcome(0.5, &[1.0, 2.0])], &settings).unwrap();
    assert_eq!(
        written,
        vec![
            output.join("plot_mean_speed_run.txt"),
            output.join("plot_traffic_flow_rate_run.txt"),
        ]
    );
    assert!(written.iter().all(|file| file.exists()));
}

#[test]
fn test_browser_wraps_around_and_quits() {
    let outcomes = vec![outcome(0.5, &[1.0])];
    let plots = MetricPlot::for_metrics(&PlotSettings::default().metrics, &outcomes);
    let mut browser = PlotBrowser::new(plots);
    assert!(browser.running);
    assert_eq!(browser.current().unwrap().metric, MetricKind::MeanSpeed);

    handle_plot_key_events(KeyEvent::from(KeyCode::Left), &mut browser);
    assert_eq!(browser.current().unwrap().metric, MetricKind::TrafficFlowRate);
    handle_plot_key_events(KeyEvent::from(KeyCode::Right), &mut browser);
    handle_plot_key_events(KeyEvent::from(KeyCode::Right), &mut browser);
    assert_eq!(browser.current().unwrap().metric, MetricKind::AverageTravelTime);

    handle_plot_key_events(KeyEvent::from(KeyCode::Char('q')), &mut browser);
    assert!(!browser.running);
}

#[test]
fn test_browser_without_plots_is_idle() {
    assert!(!PlotBrowser::new(Vec::new()).running);
}
