use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};

use lustav_input::sumocfg::SumoInputs;
use lustav_output::logger::initiate_logger;
use lustav_output::plots::MetricPlot;
use lustav_output::result::{Results, RunOutcome};
use lustav_output::ui::SimUIMetadata;

use crate::simulation::config::{BaseConfig, BaseConfigReader, ConfigResult};
use crate::simulation::ui::SimRenderer;
use crate::traffic::sweep::{SumoSource, Sweep, SweepSettings};

pub struct SimulationBuilder {
    base_config: BaseConfig,
    config_path: PathBuf,
    config_file: String,
    results: Option<Results>,
    metadata: SimUIMetadata,
}

impl SimulationBuilder {
    /// Reads and validates the configuration. Nothing is written yet.
    pub fn new(base_config_file: &str) -> ConfigResult<Self> {
        if !Path::new(base_config_file).exists() {
            return Err(format!("Configuration file {} is not found", base_config_file).into());
        }
        let config_path = match Path::new(base_config_file).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let base_config = BaseConfigReader::new(base_config_file).parse()?;
        base_config.validate(&config_path)?;
        Ok(Self {
            base_config,
            config_path,
            config_file: base_config_file.to_owned(),
            results: None,
            metadata: SimUIMetadata::default(),
        })
    }

    /// Starts logging, prepares the output directory and sets up the sweep over all rates.
    pub fn build(&mut self) -> ConfigResult<Sweep<SumoSource>> {
        let log_file = initiate_logger(&self.config_path, &self.base_config.log_settings)?;
        info!("Building the study from {}", self.config_file);

        let sumo_config = self.base_config.sumo_config_file(&self.config_path);
        let inputs = SumoInputs::read(&sumo_config)?;
        let missing = inputs.missing();
        if !missing.is_empty() {
            warn!("{} SUMO input files are missing, SUMO may fail to start", missing.len());
        }

        let results = Results::new(self.output_path(), &self.base_config.output_settings)?;
        let sweep = Sweep::new(self.build_source(&sumo_config, &results), self.sweep_settings());
        self.metadata = self.build_metadata(&sweep, &log_file, &results);
        self.results = Some(results);
        Ok(sweep)
    }

    fn build_source(&self, sumo_config: &Path, results: &Results) -> SumoSource {
        let settings = &self.base_config.simulation_settings;
        SumoSource::builder()
            .binary(settings.sumo_binary.clone())
            .config_file(sumo_config.to_path_buf())
            .seed(settings.seed)
            .port(settings.port)
            .extra_args(settings.extra_args.clone())
            .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
            .results(results.clone())
            .build()
    }

    fn sweep_settings(&self) -> SweepSettings {
        let settings = &self.base_config.simulation_settings;
        SweepSettings::builder()
            .rates(settings.penetration_rates.clone())
            .steps(settings.steps)
            .seed(settings.seed)
            .autonomy(self.base_config.autonomy_settings.clone())
            .signals(self.base_config.signal_settings.clone())
            .metrics(self.base_config.metric_settings.clone())
            .build()
    }

    fn build_metadata(
        &self,
        sweep: &Sweep<SumoSource>,
        log_file: &Path,
        results: &Results,
    ) -> SimUIMetadata {
        SimUIMetadata {
            scenario: self.base_config.simulation_settings.scenario.clone(),
            input_file: self.config_file.clone(),
            output_path: results.output_path().display().to_string(),
            log_path: log_file.display().to_string(),
            rates: sweep.rates().iter().map(|rate| rate.label()).collect(),
        }
    }

    fn output_path(&self) -> PathBuf {
        self.config_path
            .join(&self.base_config.output_settings.output_path)
    }

    /// Writes the reports, series and plots of a finished study.
    pub fn write_results(&self, outcomes: &[RunOutcome]) -> ConfigResult<()> {
        let results = self
            .results
            .as_ref()
            .ok_or("the study must be built before results are written")?;
        results.write_all(outcomes)?;
        info!("Results written to {}", results.output_path().display());
        Ok(())
    }

    /// Charts to browse after the study, empty when plotting is off.
    pub fn plots(&self, outcomes: &[RunOutcome]) -> Vec<MetricPlot> {
        let plot_settings = &self.base_config.output_settings.plot_settings;
        match plot_settings.enabled {
            true => MetricPlot::for_metrics(&plot_settings.metrics, outcomes),
            false => Vec::new(),
        }
    }

    pub fn show_ui(&self) -> bool {
        self.base_config.ui_settings.show_ui
    }

    pub fn metadata(&self) -> SimUIMetadata {
        self.metadata.clone()
    }

    pub fn renderer(&self) -> SimRenderer {
        SimRenderer::new()
    }
}
