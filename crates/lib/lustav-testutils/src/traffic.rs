use typed_builder::TypedBuilder;

use lustav_traci::control::TrafficControl;
use lustav_traci::error::{TraciError, TraciResult};

#[derive(Clone, Debug, Default, TypedBuilder)]
pub struct ScriptedVehicle {
    #[builder(setter(into))]
    pub id: String,
    #[builder(default)]
    pub speed: f64,
    #[builder(default)]
    pub waiting_time: f64,
    #[builder(default)]
    pub accumulated_waiting_time: f64,
    #[builder(default)]
    pub fuel: f64,
    #[builder(default)]
    pub stop_state: u8,
    #[builder(default)]
    pub departure: f64,
    #[builder(default, setter(into))]
    pub lane: String,
}

/// Network state after one simulation step.
#[derive(Clone, Debug, Default)]
pub struct ScriptedStep {
    pub vehicles: Vec<ScriptedVehicle>,
    pub departed: Vec<String>,
}

impl ScriptedStep {
    pub fn new(vehicles: Vec<ScriptedVehicle>) -> Self {
        Self {
            vehicles,
            departed: Vec::new(),
        }
    }

    pub fn departing(mut self, departed: &[&str]) -> Self {
        self.departed = departed.iter().map(|id| id.to_string()).collect();
        self
    }
}

/// In-memory stand-in for a SUMO session that replays a fixed list of steps. Steps past the
/// end of the script report an empty network.
#[derive(Debug, Default)]
pub struct ScriptedTraffic {
    steps: Vec<ScriptedStep>,
    current: usize,
    step_length: f64,
    traffic_lights: Vec<(String, Vec<String>)>,
    pub type_changes: Vec<(String, String)>,
    pub phase_changes: Vec<(String, f64, usize)>,
    pub closed: bool,
}

impl ScriptedTraffic {
    pub fn new(steps: Vec<ScriptedStep>) -> Self {
        Self {
            steps,
            step_length: 1.0,
            ..Self::default()
        }
    }

    pub fn with_traffic_light(mut self, tls_id: &str, lanes: &[&str]) -> Self {
        self.traffic_lights.push((
            tls_id.to_string(),
            lanes.iter().map(|lane| lane.to_string()).collect(),
        ));
        self
    }

    pub fn steps_taken(&self) -> usize {
        self.current
    }

    fn state(&self) -> Option<&ScriptedStep> {
        self.current.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    fn vehicle(&self, vehicle_id: &str) -> TraciResult<&ScriptedVehicle> {
        self.state()
            .and_then(|step| step.vehicles.iter().find(|v| v.id == vehicle_id))
            .ok_or_else(|| TraciError::Command {
                command: 0xa4,
                status: 0xff,
                description: format!("Vehicle '{}' is not known", vehicle_id),
            })
    }

    fn check_open(&self) -> TraciResult<()> {
        if self.closed {
            return Err(TraciError::Closed);
        }
        Ok(())
    }
}

impl TrafficControl for ScriptedTraffic {
    fn simulation_step(&mut self) -> TraciResult<()> {
        self.check_open()?;
        self.current += 1;
        Ok(())
    }

    fn simulation_time(&mut self) -> TraciResult<f64> {
        Ok(self.current as f64 * self.step_length)
    }

    fn departed_vehicles(&mut self) -> TraciResult<Vec<String>> {
        Ok(self.state().map(|s| s.departed.clone()).unwrap_or_default())
    }

    fn min_expected_vehicles(&mut self) -> TraciResult<i32> {
        let remaining = self.steps.len().saturating_sub(self.current);
        let active = self.state().map_or(0, |s| s.vehicles.len());
        Ok((remaining + active) as i32)
    }

    fn vehicle_ids(&mut self) -> TraciResult<Vec<String>> {
        self.check_open()?;
        Ok(self
            .state()
            .map(|s| s.vehicles.iter().map(|v| v.id.clone()).collect())
            .unwrap_or_default())
    }

    fn vehicle_speed(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        Ok(self.vehicle(vehicle_id)?.speed)
    }

    fn vehicle_waiting_time(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        Ok(self.vehicle(vehicle_id)?.waiting_time)
    }

    fn vehicle_accumulated_waiting_time(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        Ok(self.vehicle(vehicle_id)?.accumulated_waiting_time)
    }

    fn vehicle_fuel_consumption(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        Ok(self.vehicle(vehicle_id)?.fuel)
    }

    fn vehicle_stop_state(&mut self, vehicle_id: &str) -> TraciResult<u8> {
        Ok(self.vehicle(vehicle_id)?.stop_state)
    }

    fn vehicle_departure(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        Ok(self.vehicle(vehicle_id)?.departure)
    }

    fn set_vehicle_type(&mut self, vehicle_id: &str, type_id: &str) -> TraciResult<()> {
        let departed = self
            .state()
            .is_some_and(|s| s.departed.iter().any(|id| id == vehicle_id));
        if !departed {
            self.vehicle(vehicle_id)?;
        }
        self.type_changes
            .push((vehicle_id.to_string(), type_id.to_string()));
        Ok(())
    }

    fn lane_vehicles(&mut self, lane_id: &str) -> TraciResult<Vec<String>> {
        Ok(self
            .state()
            .map(|s| {
                s.vehicles
                    .iter()
                    .filter(|v| v.lane == lane_id)
                    .map(|v| v.id.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn traffic_lights(&mut self) -> TraciResult<Vec<String>> {
        Ok(self
            .traffic_lights
            .iter()
            .map(|(tls_id, _)| tls_id.clone())
            .collect())
    }

    fn controlled_lanes(&mut self, tls_id: &str) -> TraciResult<Vec<String>> {
        self.traffic_lights
            .iter()
            .find(|(id, _)| id == tls_id)
            .map(|(_, lanes)| lanes.clone())
            .ok_or_else(|| TraciError::Command {
                command: 0xa2,
                status: 0xff,
                description: format!("Traffic light '{}' is not known", tls_id),
            })
    }

    fn traffic_light_phase(&mut self, tls_id: &str) -> TraciResult<i32> {
        self.controlled_lanes(tls_id)?;
        Ok(0)
    }

    fn set_phase_duration(&mut self, tls_id: &str, duration: f64) -> TraciResult<()> {
        self.controlled_lanes(tls_id)?;
        self.phase_changes
            .push((tls_id.to_string(), duration, self.current));
        Ok(())
    }

    fn close(&mut self) -> TraciResult<()> {
        self.closed = true;
        Ok(())
    }
}
