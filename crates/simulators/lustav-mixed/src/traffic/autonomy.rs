use log::debug;
use rand::Rng;
use rand_pcg::Pcg64Mcg;
use serde::Deserialize;

use lustav_core::rate::PenetrationRate;
use lustav_traci::control::TrafficControl;
use lustav_traci::error::TraciResult;

#[derive(Deserialize, Debug, Clone)]
pub struct AutonomySettings {
    /// SUMO vehicle type assigned to autonomous vehicles. It must exist in the scenario.
    #[serde(default = "default_vehicle_type")]
    pub vehicle_type: String,
}

impl Default for AutonomySettings {
    fn default() -> Self {
        Self {
            vehicle_type: default_vehicle_type(),
        }
    }
}

fn default_vehicle_type() -> String {
    "autonomous_passenger".to_string()
}

/// Turns a share of the departing vehicles into autonomous ones.
#[derive(Debug, Clone)]
pub struct AvDesignator {
    rate: PenetrationRate,
    vehicle_type: String,
    rng: Pcg64Mcg,
    designated: u64,
}

impl AvDesignator {
    pub fn new(rate: PenetrationRate, settings: &AutonomySettings, seed: u64) -> Self {
        Self {
            rate,
            vehicle_type: settings.vehicle_type.clone(),
            rng: Pcg64Mcg::new(seed as u128),
            designated: 0,
        }
    }

    /// Draws once per departed vehicle and changes its type when the draw falls below the
    /// rate. Returns the number of vehicles changed in this call.
    pub fn designate<T: TrafficControl>(
        &mut self,
        traffic: &mut T,
        departed: &[String],
    ) -> TraciResult<u64> {
        let mut count = 0;
        for vehicle_id in departed {
            if self.rng.gen::<f64>() < self.rate.as_f64() {
                traffic.set_vehicle_type(vehicle_id, &self.vehicle_type)?;
                count += 1;
            }
        }
        if count > 0 {
            debug!("Designated {} of {} departed vehicles", count, departed.len());
        }
        self.designated += count;
        Ok(count)
    }

    pub fn designated(&self) -> u64 {
        self.designated
    }
}
