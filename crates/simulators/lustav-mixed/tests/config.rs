use std::fs;
use std::path::{Path, PathBuf};

use lustav_core::rate::PenetrationRate;
use lustav_core::step::Step;
use lustav_mixed::simulation::builder::SimulationBuilder;
use lustav_mixed::simulation::config::BaseConfigReader;
use lustav_testutils::scratch::scratch_dir;

const MINIMAL: &str = r#"
[simulation_settings]
scenario = "lust"
sumo_config = "scenario/due.actuated.sumocfg"
seed = 42

[log_settings]
log_path = "."
log_level = "info"
log_file_name = "lustav.log"
log_overwrite = true

[output_settings]
output_path = "results"
"#;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let scenario = dir.join("scenario");
    fs::create_dir_all(&scenario).unwrap();
    fs::write(scenario.join("due.actuated.sumocfg"), "<configuration/>").unwrap();
    let file = dir.join("config.toml");
    fs::write(&file, content).unwrap();
    file
}

#[test]
fn test_defaults_of_minimal_config() {
    let dir = scratch_dir("config_minimal");
    let file = write_config(&dir, MINIMAL);
    let config = BaseConfigReader::new(file.to_str().unwrap()).parse().unwrap();

    let settings = &config.simulation_settings;
    assert_eq!(settings.sumo_binary, "sumo");
    assert_eq!(settings.steps, Step(3600));
    assert_eq!(
        settings.penetration_rates,
        vec![
            PenetrationRate::new(0.0).unwrap(),
            PenetrationRate::new(0.5).unwrap(),
            PenetrationRate::new(1.0).unwrap(),
        ]
    );
    assert_eq!(settings.port, None);
    assert_eq!(settings.connect_timeout_ms, 30_000);
    assert_eq!(config.autonomy_settings.vehicle_type, "autonomous_passenger");
    assert!(config.signal_settings.enabled);
    assert_eq!(config.signal_settings.adaptation_interval, Step(30));
    assert_eq!(config.signal_settings.waiting_threshold, 120.0);
    assert_eq!(config.signal_settings.phase_duration, 10.0);
    assert_eq!(config.metric_settings.congestion_speed, 5.0);
    assert!(config.output_settings.timestamped);
    assert_eq!(config.output_settings.statistics_file, "simulation_metrics.csv");
    assert!(config.output_settings.plot_settings.enabled);
    assert!(!config.ui_settings.show_ui);
    assert!(config.validate(&dir).is_ok());
}

#[test]
fn test_overrides() {
    let dir = scratch_dir("config_overrides");
    let content = MINIMAL.replace(
        "seed = 42",
        "seed = 42\nsteps = 600\npenetration_rates = [0.25, 0.75]\nport = 8813\nextra_args = [\"--step-length\", \"1\"]\n\n[signal_settings]\nenabled = false\n\n[ui_settings]\nshow_ui = true",
    );
    let file = write_config(&dir, &content);
    let config = BaseConfigReader::new(file.to_str().unwrap()).parse().unwrap();
    assert_eq!(config.simulation_settings.steps, Step(600));
    assert_eq!(config.simulation_settings.penetration_rates.len(), 2);
    assert_eq!(config.simulation_settings.port, Some(8813));
    assert_eq!(config.simulation_settings.extra_args, vec!["--step-length", "1"]);
    assert!(!config.signal_settings.enabled);
    assert!(config.ui_settings.show_ui);
}

#[test]
fn test_rate_outside_unit_interval_is_rejected() {
    let dir = scratch_dir("config_rate");
    let content = MINIMAL.replace("seed = 42", "seed = 42\npenetration_rates = [0.5, 1.5]");
    let file = write_config(&dir, &content);
    let error = BaseConfigReader::new(file.to_str().unwrap())
        .parse()
        .unwrap_err();
    assert!(error.to_string().contains("penetration rate"));
}

#[test]
fn test_zero_steps_fail_validation() {
    let dir = scratch_dir("config_steps");
    let file = write_config(&dir, &MINIMAL.replace("seed = 42", "seed = 42\nsteps = 0"));
    let config = BaseConfigReader::new(file.to_str().unwrap()).parse().unwrap();
    assert!(config.validate(&dir).is_err());
}

#[test]
fn test_missing_sumo_config_fails_validation() {
    let dir = scratch_dir("config_sumocfg");
    let file = write_config(&dir, MINIMAL);
    fs::remove_file(dir.join("scenario").join("due.actuated.sumocfg")).unwrap();
    let config = BaseConfigReader::new(file.to_str().unwrap()).parse().unwrap();
    let error = config.validate(&dir).unwrap_err();
    assert!(error.to_string().contains("is not found"));
}

#[test]
fn test_builder_reports_missing_config_file() {
    assert!(SimulationBuilder::new("no/such/config.toml").is_err());
}

#[test]
fn test_builder_accepts_valid_config() {
    let dir = scratch_dir("config_builder");
    let file = write_config(&dir, MINIMAL);
    let builder = SimulationBuilder::new(file.to_str().unwrap()).unwrap();
    assert!(!builder.show_ui());
}
