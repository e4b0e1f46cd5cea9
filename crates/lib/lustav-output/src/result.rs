use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use indexmap::IndexMap;
use log::info;
use serde::Deserialize;

use lustav_core::metrics::{MetricKind, MetricSeries};
use lustav_core::rate::PenetrationRate;
use lustav_input::tripinfo::{TripRecord, TripSummary};

use crate::plots::{write_plots, PlotSettings};
use crate::report::{adaptation_rows, statistics_rows, trip_rows, write_rows};
use crate::series::SeriesWriter;
use crate::OutputResult;

#[derive(Deserialize, Debug, Clone)]
pub struct OutputSettings {
    pub output_path: String,
    #[serde(default = "default_timestamped")]
    pub timestamped: bool,
    #[serde(default = "default_statistics_file")]
    pub statistics_file: String,
    #[serde(default = "default_adaptation_file")]
    pub adaptation_file: String,
    /// Enables SUMO's tripinfo output and the trip statistics derived from it.
    pub trip_file: Option<String>,
    /// Per-step values of every metric, `.csv` or `.parquet`.
    pub series_file: Option<String>,
    #[serde(default)]
    pub plot_settings: PlotSettings,
}

fn default_timestamped() -> bool {
    true
}

fn default_statistics_file() -> String {
    "simulation_metrics.csv".to_string()
}

fn default_adaptation_file() -> String {
    "traffic_light_adaptations.csv".to_string()
}

/// Trip statistics of one run, over all vehicles and per vehicle type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripOutcome {
    pub overall: TripSummary,
    pub by_type: IndexMap<String, TripSummary>,
}

impl TripOutcome {
    pub fn of(trips: &[TripRecord]) -> Self {
        Self {
            overall: TripSummary::of(trips),
            by_type: TripSummary::by_type(trips),
        }
    }
}

/// Everything one penetration-rate run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub rate: PenetrationRate,
    pub series: MetricSeries,
    pub adaptations: u64,
    pub autonomous_vehicles: u64,
    pub trips: Option<TripOutcome>,
}

/// Resolves the output file names of a study and writes every report into them.
#[derive(Debug, Clone)]
pub struct Results {
    output_path: PathBuf,
    settings: OutputSettings,
    suffix: String,
}

impl Results {
    pub fn new(output_path: PathBuf, settings: &OutputSettings) -> OutputResult<Self> {
        if !output_path.exists() {
            fs::create_dir_all(&output_path)?;
        }
        let suffix = match settings.timestamped {
            true => Local::now().format("_%Y%m%d_%H%M%S").to_string(),
            false => String::new(),
        };
        Ok(Self {
            output_path,
            settings: settings.clone(),
            suffix,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// `metrics.csv` becomes `<output>/metrics_<timestamp>.csv` when timestamps are on.
    pub fn file(&self, file_name: &str) -> PathBuf {
        let name = Path::new(file_name);
        let stem = name
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = match name.extension() {
            Some(ext) => format!("{}{}.{}", stem, self.suffix, ext.to_string_lossy()),
            None => format!("{}{}", stem, self.suffix),
        };
        self.output_path.join(file_name)
    }

    pub fn statistics_file(&self) -> PathBuf {
        self.file(&self.settings.statistics_file)
    }

    pub fn adaptation_file(&self) -> PathBuf {
        self.file(&self.settings.adaptation_file)
    }

    pub fn trip_file(&self) -> Option<PathBuf> {
        self.settings.trip_file.as_deref().map(|name| self.file(name))
    }

    pub fn series_file(&self) -> Option<PathBuf> {
        self.settings.series_file.as_deref().map(|name| self.file(name))
    }

    /// Raw SUMO tripinfo file of one run, when trip statistics are enabled.
    pub fn tripinfo_file(&self, rate: PenetrationRate) -> Option<PathBuf> {
        self.settings.trip_file.as_ref().map(|_| {
            self.output_path
                .join(format!("tripinfo_{}{}.xml", rate.as_percent(), self.suffix))
        })
    }

    pub fn plot_metrics(&self) -> &[MetricKind] {
        &self.settings.plot_settings.metrics
    }

    pub fn write_all(&self, outcomes: &[RunOutcome]) -> OutputResult<()> {
        write_rows(&self.statistics_file(), &statistics_rows(outcomes))?;
        write_rows(&self.adaptation_file(), &adaptation_rows(outcomes))?;
        if let Some(trip_file) = self.trip_file() {
            write_rows(&trip_file, &trip_rows(outcomes))?;
        }
        if let Some(series_file) = self.series_file() {
            let mut writer = SeriesWriter::new(&series_file)?;
            for outcome in outcomes {
                writer.add_run(outcome.rate, &outcome.series)?;
            }
            writer.close_file()?;
        }
        if self.settings.plot_settings.enabled {
            let written = write_plots(
                &self.output_path,
                &self.suffix,
                outcomes,
                &self.settings.plot_settings,
            )?;
            info!("Wrote {} plots to {}", written.len(), self.output_path.display());
        }
        Ok(())
    }
}
