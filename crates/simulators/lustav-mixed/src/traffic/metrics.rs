use serde::Deserialize;

use lustav_core::metrics::{MetricKind, StepMetrics};
use lustav_traci::control::TrafficControl;
use lustav_traci::error::TraciResult;

#[derive(Deserialize, Debug, Clone)]
pub struct MetricSettings {
    /// Vehicles slower than this (m/s) count as congested.
    #[serde(default = "default_congestion_speed")]
    pub congestion_speed: f64,
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self {
            congestion_speed: default_congestion_speed(),
        }
    }
}

fn default_congestion_speed() -> f64 {
    5.0
}

/// Readings of one vehicle in the current step.
#[derive(Debug, Clone, Copy, Default)]
struct VehicleReading {
    speed: f64,
    accumulated_waiting_time: f64,
    fuel: f64,
    stopped: bool,
    departure: f64,
}

/// Samples the network once per step and reduces it to [`StepMetrics`].
#[derive(Debug, Clone)]
pub struct MetricCollector {
    congestion_speed: f64,
}

impl MetricCollector {
    pub fn new(settings: &MetricSettings) -> Self {
        Self {
            congestion_speed: settings.congestion_speed,
        }
    }

    pub fn collect<T: TrafficControl>(&self, traffic: &mut T) -> TraciResult<StepMetrics> {
        let vehicles = traffic.vehicle_ids()?;
        if vehicles.is_empty() {
            return Ok(StepMetrics::empty());
        }
        let time = traffic.simulation_time()?;
        let mut readings = Vec::with_capacity(vehicles.len());
        for vehicle_id in vehicles.iter() {
            readings.push(VehicleReading {
                speed: traffic.vehicle_speed(vehicle_id)?,
                accumulated_waiting_time: traffic.vehicle_accumulated_waiting_time(vehicle_id)?,
                fuel: traffic.vehicle_fuel_consumption(vehicle_id)?,
                stopped: traffic.vehicle_stop_state(vehicle_id)? != 0,
                departure: traffic.vehicle_departure(vehicle_id)?,
            });
        }
        Ok(self.reduce(&readings, time))
    }

    fn reduce(&self, readings: &[VehicleReading], time: f64) -> StepMetrics {
        let count = readings.len() as f64;
        let mean = |value: fn(&VehicleReading) -> f64| readings.iter().map(value).sum::<f64>() / count;

        StepMetrics::empty()
            .with(
                MetricKind::NumberOfStops,
                readings.iter().filter(|r| r.stopped).count() as f64,
            )
            .with(
                MetricKind::FuelConsumption,
                readings.iter().map(|r| r.fuel).sum(),
            )
            .with(
                MetricKind::AverageTravelTime,
                mean(|r| r.accumulated_waiting_time),
            )
            .with(
                MetricKind::MeanTimeInNetwork,
                readings
                    .iter()
                    .map(|r| (time - r.departure).max(0.0))
                    .sum::<f64>()
                    / count,
            )
            .with(MetricKind::TrafficFlowRate, count / time.max(1.0))
            .with(
                MetricKind::CongestionLevels,
                readings
                    .iter()
                    .filter(|r| r.speed < self.congestion_speed)
                    .count() as f64,
            )
            .with(MetricKind::MeanSpeed, mean(|r| r.speed))
    }
}
