use std::path::{Path, PathBuf};

use serde::Deserialize;

use lustav_core::rate::PenetrationRate;
use lustav_core::step::Step;
use lustav_output::logger::LogSettings;
use lustav_output::result::OutputSettings;

use crate::traffic::autonomy::AutonomySettings;
use crate::traffic::metrics::MetricSettings;
use crate::traffic::signals::SignalSettings;

pub type ConfigResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Deserialize, Debug, Clone)]
pub struct BaseConfig {
    pub simulation_settings: SimSettings,
    #[serde(default)]
    pub autonomy_settings: AutonomySettings,
    #[serde(default)]
    pub signal_settings: SignalSettings,
    #[serde(default)]
    pub metric_settings: MetricSettings,
    pub log_settings: LogSettings,
    pub output_settings: OutputSettings,
    #[serde(default)]
    pub ui_settings: UiSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SimSettings {
    pub scenario: String,
    #[serde(default = "default_sumo_binary")]
    pub sumo_binary: String,
    /// Path of the `.sumocfg`, relative to this configuration file.
    pub sumo_config: String,
    #[serde(default = "default_steps")]
    pub steps: Step,
    pub seed: u64,
    #[serde(default = "default_penetration_rates")]
    pub penetration_rates: Vec<PenetrationRate>,
    #[serde(default)]
    pub extra_args: Vec<String>,
    pub port: Option<u16>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct UiSettings {
    #[serde(default)]
    pub show_ui: bool,
}

fn default_sumo_binary() -> String {
    "sumo".to_string()
}

fn default_steps() -> Step {
    Step(3600)
}

fn default_penetration_rates() -> Vec<PenetrationRate> {
    [0.0, 0.5, 1.0]
        .into_iter()
        .filter_map(|rate| PenetrationRate::new(rate).ok())
        .collect()
}

fn default_connect_timeout_ms() -> u64 {
    30_000
}

impl BaseConfig {
    /// Checks what serde cannot, before any SUMO process is started.
    pub fn validate(&self, config_path: &Path) -> ConfigResult<()> {
        let settings = &self.simulation_settings;
        if settings.steps.as_u64() == 0 {
            return Err("simulation_settings.steps must be greater than zero".into());
        }
        if settings.penetration_rates.is_empty() {
            return Err("simulation_settings.penetration_rates must not be empty".into());
        }
        let sumo_config = self.sumo_config_file(config_path);
        if !sumo_config.exists() {
            return Err(format!("SUMO configuration {} is not found", sumo_config.display()).into());
        }
        if self.signal_settings.enabled && self.signal_settings.adaptation_interval.as_u64() == 0 {
            return Err("signal_settings.adaptation_interval must be greater than zero".into());
        }
        if self.autonomy_settings.vehicle_type.is_empty() {
            return Err("autonomy_settings.vehicle_type must not be empty".into());
        }
        Ok(())
    }

    pub fn sumo_config_file(&self, config_path: &Path) -> PathBuf {
        config_path.join(&self.simulation_settings.sumo_config)
    }
}

pub struct BaseConfigReader {
    file_path: PathBuf,
}

impl BaseConfigReader {
    pub fn new(file_name: &str) -> Self {
        let file_path = PathBuf::from(file_name);
        Self { file_path }
    }

    pub fn parse(&self) -> ConfigResult<BaseConfig> {
        let parsing_result = std::fs::read_to_string(&self.file_path)?;
        let config: BaseConfig = toml::from_str(&parsing_result)?;
        Ok(config)
    }
}
