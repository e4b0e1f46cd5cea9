use log::{debug, info};
use typed_builder::TypedBuilder;

use lustav_core::metrics::{MetricSeries, StepMetrics};
use lustav_core::rate::PenetrationRate;
use lustav_core::step::Step;
use lustav_output::result::RunOutcome;
use lustav_traci::control::TrafficControl;
use lustav_traci::error::TraciResult;

use crate::traffic::autonomy::AvDesignator;
use crate::traffic::metrics::MetricCollector;
use crate::traffic::signals::SignalAdapter;

/// One SUMO run at a single penetration rate.
#[derive(TypedBuilder)]
pub struct MixedTrafficRun<T: TrafficControl> {
    traffic: T,
    rate: PenetrationRate,
    steps: Step,
    designator: AvDesignator,
    adapter: SignalAdapter,
    collector: MetricCollector,
    #[builder(default)]
    now: Step,
    #[builder(default)]
    series: MetricSeries,
}

impl<T: TrafficControl> MixedTrafficRun<T> {
    pub fn rate(&self) -> PenetrationRate {
        self.rate
    }

    pub fn now(&self) -> Step {
        self.now
    }

    /// Metrics of the last completed step.
    pub fn latest(&self) -> StepMetrics {
        self.series
            .step(self.series.len().saturating_sub(1))
            .unwrap_or_default()
    }

    pub fn adaptations(&self) -> u64 {
        self.adapter.adaptations()
    }

    pub fn autonomous_vehicles(&self) -> u64 {
        self.designator.designated()
    }

    pub fn is_done(&self) -> bool {
        self.now >= self.steps
    }

    /// Advances SUMO by one step, designates AVs among the departures, adapts the traffic
    /// lights when due and records the metrics. Returns the vehicles in the network.
    pub fn step(&mut self) -> TraciResult<u64> {
        self.traffic.simulation_step()?;

        let departed = self.traffic.departed_vehicles()?;
        self.designator.designate(&mut self.traffic, &departed)?;
        self.adapter.adapt(self.now, &mut self.traffic)?;

        let metrics = self.collector.collect(&mut self.traffic)?;
        self.series.push(metrics);
        self.now += Step(1);

        let active = self.traffic.min_expected_vehicles()?.max(0) as u64;
        debug!("Rate {} step {}: {} expected vehicles", self.rate, self.now, active);
        Ok(active)
    }

    /// Closes the connection and hands back what the run measured. Trip statistics are added
    /// by the caller once SUMO has written them.
    pub fn finish(mut self) -> TraciResult<RunOutcome> {
        self.traffic.close()?;
        info!(
            "Run at rate {} finished after {} steps with {} adaptations and {} AVs",
            self.rate,
            self.now,
            self.adapter.adaptations(),
            self.designator.designated()
        );
        Ok(RunOutcome {
            rate: self.rate,
            series: self.series,
            adaptations: self.adapter.adaptations(),
            autonomous_vehicles: self.designator.designated(),
            trips: None,
        })
    }
}
