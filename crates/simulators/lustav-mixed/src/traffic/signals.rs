use log::debug;
use serde::Deserialize;

use lustav_core::step::Step;
use lustav_traci::control::TrafficControl;
use lustav_traci::error::TraciResult;

#[derive(Deserialize, Debug, Clone)]
pub struct SignalSettings {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Steps between two checks. The first check happens on step 0.
    #[serde(default = "default_adaptation_interval")]
    pub adaptation_interval: Step,
    /// Summed waiting time (s) on the controlled lanes above which a light is adapted.
    #[serde(default = "default_waiting_threshold")]
    pub waiting_threshold: f64,
    /// Duration (s) given to the current phase of an adapted light.
    #[serde(default = "default_phase_duration")]
    pub phase_duration: f64,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            adaptation_interval: default_adaptation_interval(),
            waiting_threshold: default_waiting_threshold(),
            phase_duration: default_phase_duration(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_adaptation_interval() -> Step {
    Step(30)
}

fn default_waiting_threshold() -> f64 {
    120.0
}

fn default_phase_duration() -> f64 {
    10.0
}

/// Shortens the current phase of traffic lights whose queues wait too long.
#[derive(Debug, Clone)]
pub struct SignalAdapter {
    settings: SignalSettings,
    adaptations: u64,
}

impl SignalAdapter {
    pub fn new(settings: &SignalSettings) -> Self {
        Self {
            settings: settings.clone(),
            adaptations: 0,
        }
    }

    pub fn is_due(&self, step: Step) -> bool {
        self.settings.enabled && step.is_multiple_of(self.settings.adaptation_interval)
    }

    /// Checks every traffic light when `step` is due. Returns the lights adapted in this call.
    pub fn adapt<T: TrafficControl>(&mut self, step: Step, traffic: &mut T) -> TraciResult<u64> {
        if !self.is_due(step) {
            return Ok(0);
        }
        let mut adapted = 0;
        for tls_id in traffic.traffic_lights()? {
            let waiting_time = Self::total_waiting_time(traffic, &tls_id)?;
            if waiting_time > self.settings.waiting_threshold {
                let phase = traffic.traffic_light_phase(&tls_id)?;
                traffic.set_phase_duration(&tls_id, self.settings.phase_duration)?;
                debug!(
                    "Adapted {} in phase {} at step {}, waiting {:.1}s",
                    tls_id, phase, step, waiting_time
                );
                adapted += 1;
            }
        }
        self.adaptations += adapted;
        Ok(adapted)
    }

    /// Waiting time of the vehicles on the lanes a light controls. SUMO lists a lane once
    /// per link, so a lane feeding several links contributes once per link.
    fn total_waiting_time<T: TrafficControl>(traffic: &mut T, tls_id: &str) -> TraciResult<f64> {
        let mut total = 0.0;
        for lane_id in traffic.controlled_lanes(tls_id)? {
            for vehicle_id in traffic.lane_vehicles(&lane_id)? {
                total += traffic.vehicle_waiting_time(&vehicle_id)?;
            }
        }
        Ok(total)
    }

    pub fn adaptations(&self) -> u64 {
        self.adaptations
    }
}
