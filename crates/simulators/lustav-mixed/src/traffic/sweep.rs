use std::path::PathBuf;
use std::time::Duration;

use itertools::Itertools;
use log::{info, warn};
use typed_builder::TypedBuilder;

use lustav_core::rate::PenetrationRate;
use lustav_core::step::Step;
use lustav_core::study::{Progress, Study, StudyResult};
use lustav_input::error::InputResult;
use lustav_input::tripinfo::{TripInfoReader, TripRecord};
use lustav_output::result::{Results, RunOutcome, TripOutcome};
use lustav_traci::control::TrafficControl;
use lustav_traci::error::TraciResult;
use lustav_traci::launcher::{SumoLauncher, SumoSession};

use crate::traffic::autonomy::{AutonomySettings, AvDesignator};
use crate::traffic::metrics::{MetricCollector, MetricSettings};
use crate::traffic::mixed::MixedTrafficRun;
use crate::traffic::signals::{SignalAdapter, SignalSettings};

/// Opens one traffic session per penetration rate.
pub trait TrafficSource: Send {
    type Control: TrafficControl + Send;

    fn open(&mut self, rate: PenetrationRate) -> TraciResult<Self::Control>;

    /// Trips of the closed run at `rate`, when trip output is enabled.
    fn trips(&self, rate: PenetrationRate) -> InputResult<Option<Vec<TripRecord>>>;
}

/// Starts a fresh SUMO process for every run.
#[derive(Debug, Clone, TypedBuilder)]
pub struct SumoSource {
    #[builder(setter(into))]
    binary: String,
    config_file: PathBuf,
    seed: u64,
    #[builder(default)]
    port: Option<u16>,
    #[builder(default)]
    extra_args: Vec<String>,
    connect_timeout: Duration,
    results: Results,
}

impl SumoSource {
    pub fn launcher(&self, rate: PenetrationRate) -> SumoLauncher {
        SumoLauncher::builder()
            .binary(self.binary.clone())
            .config_file(self.config_file.clone())
            .seed(self.seed)
            .port(self.port)
            .tripinfo_file(self.results.tripinfo_file(rate))
            .extra_args(self.extra_args.clone())
            .connect_timeout(self.connect_timeout)
            .build()
    }
}

impl TrafficSource for SumoSource {
    type Control = SumoSession;

    fn open(&mut self, rate: PenetrationRate) -> TraciResult<SumoSession> {
        self.launcher(rate).launch()
    }

    fn trips(&self, rate: PenetrationRate) -> InputResult<Option<Vec<TripRecord>>> {
        let Some(tripinfo_file) = self.results.tripinfo_file(rate) else {
            return Ok(None);
        };
        if !tripinfo_file.exists() {
            warn!("SUMO wrote no trips to {}", tripinfo_file.display());
            return Ok(None);
        }
        TripInfoReader::from_file(&tripinfo_file)?.read_all().map(Some)
    }
}

/// Runs the same scenario once per penetration rate, in ascending order.
pub struct Sweep<S: TrafficSource> {
    source: S,
    rates: Vec<PenetrationRate>,
    steps: Step,
    seed: u64,
    autonomy: AutonomySettings,
    signals: SignalSettings,
    metrics: MetricSettings,
    current: Option<MixedTrafficRun<S::Control>>,
    next_run: usize,
    now: Step,
    outcomes: Vec<RunOutcome>,
}

#[derive(TypedBuilder)]
pub struct SweepSettings {
    pub rates: Vec<PenetrationRate>,
    pub steps: Step,
    pub seed: u64,
    #[builder(default)]
    pub autonomy: AutonomySettings,
    #[builder(default)]
    pub signals: SignalSettings,
    #[builder(default)]
    pub metrics: MetricSettings,
}

impl<S: TrafficSource> Sweep<S> {
    pub fn new(source: S, settings: SweepSettings) -> Self {
        let rates: Vec<PenetrationRate> = settings.rates.into_iter().sorted().dedup().collect();
        Self {
            source,
            outcomes: Vec::with_capacity(rates.len()),
            rates,
            steps: settings.steps,
            seed: settings.seed,
            autonomy: settings.autonomy,
            signals: settings.signals,
            metrics: settings.metrics,
            current: None,
            next_run: 0,
            now: Step::default(),
        }
    }

    pub fn rates(&self) -> &[PenetrationRate] {
        &self.rates
    }

    fn start_next(&mut self) -> StudyResult<()> {
        let rate = self.rates[self.next_run];
        info!("Running simulation with AV penetration rate {}", rate);
        let traffic = self.source.open(rate)?;
        let run = MixedTrafficRun::builder()
            .traffic(traffic)
            .rate(rate)
            .steps(self.steps)
            .designator(AvDesignator::new(rate, &self.autonomy, self.seed))
            .adapter(SignalAdapter::new(&self.signals))
            .collector(MetricCollector::new(&self.metrics))
            .build();
        self.current = Some(run);
        self.next_run += 1;
        Ok(())
    }

    fn finish_current(&mut self) -> StudyResult<()> {
        let Some(run) = self.current.take() else {
            return Ok(());
        };
        let rate = run.rate();
        let mut outcome = run.finish()?;
        outcome.trips = self
            .source
            .trips(rate)?
            .map(|trips| TripOutcome::of(&trips));
        info!("Simulation completed for AV rate {}", rate);
        self.outcomes.push(outcome);
        Ok(())
    }

    fn is_finished(&self) -> bool {
        self.current.is_none() && self.next_run >= self.rates.len()
    }
}

impl<S: TrafficSource> Study for Sweep<S> {
    type Outcome = Vec<RunOutcome>;

    fn duration(&self) -> Step {
        Step(self.steps.as_u64() * self.rates.len() as u64)
    }

    fn initialize(&mut self) -> StudyResult<()> {
        info!(
            "Sweeping rates {} over {} steps each",
            self.rates.iter().join(", "),
            self.steps
        );
        Ok(())
    }

    fn advance(&mut self) -> StudyResult<Progress> {
        if self.current.is_none() && !self.is_finished() {
            self.start_next()?;
        }
        let Some(run) = self.current.as_mut() else {
            return Ok(Progress {
                now: self.now,
                run: self.next_run.saturating_sub(1),
                finished: true,
                ..Progress::default()
            });
        };
        let active_vehicles = run.step()?;
        let latest = run.latest();
        let adaptations = run.adaptations();
        let autonomous_vehicles = run.autonomous_vehicles();
        self.now += Step(1);
        if run.is_done() {
            self.finish_current()?;
        }
        Ok(Progress {
            now: self.now,
            run: self.next_run - 1,
            active_vehicles,
            latest,
            adaptations,
            autonomous_vehicles,
            finished: self.is_finished(),
        })
    }

    fn terminate(mut self) -> StudyResult<Self::Outcome> {
        if let Some(run) = self.current.as_ref() {
            warn!(
                "Closing run at rate {} early at step {}",
                run.rate(),
                run.now()
            );
            self.finish_current()?;
        }
        Ok(self.outcomes)
    }
}
