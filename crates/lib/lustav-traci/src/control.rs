use std::io::{Read, Write};

use crate::client::TraciClient;
use crate::constants::*;
use crate::error::TraciResult;
use crate::storage::Storage;

/// The slice of TraCI that a mixed-traffic run needs. Implemented by the socket client and
/// by scripted doubles in tests.
pub trait TrafficControl {
    /// Advances the simulation by one step.
    fn simulation_step(&mut self) -> TraciResult<()>;
    /// Current simulation time in seconds.
    fn simulation_time(&mut self) -> TraciResult<f64>;
    fn departed_vehicles(&mut self) -> TraciResult<Vec<String>>;
    /// Vehicles in the network plus those still waiting to depart.
    fn min_expected_vehicles(&mut self) -> TraciResult<i32>;

    fn vehicle_ids(&mut self) -> TraciResult<Vec<String>>;
    fn vehicle_speed(&mut self, vehicle_id: &str) -> TraciResult<f64>;
    fn vehicle_waiting_time(&mut self, vehicle_id: &str) -> TraciResult<f64>;
    fn vehicle_accumulated_waiting_time(&mut self, vehicle_id: &str) -> TraciResult<f64>;
    fn vehicle_fuel_consumption(&mut self, vehicle_id: &str) -> TraciResult<f64>;
    fn vehicle_stop_state(&mut self, vehicle_id: &str) -> TraciResult<u8>;
    fn vehicle_departure(&mut self, vehicle_id: &str) -> TraciResult<f64>;
    fn set_vehicle_type(&mut self, vehicle_id: &str, type_id: &str) -> TraciResult<()>;

    fn lane_vehicles(&mut self, lane_id: &str) -> TraciResult<Vec<String>>;

    fn traffic_lights(&mut self) -> TraciResult<Vec<String>>;
    fn controlled_lanes(&mut self, tls_id: &str) -> TraciResult<Vec<String>>;
    fn traffic_light_phase(&mut self, tls_id: &str) -> TraciResult<i32>;
    fn set_phase_duration(&mut self, tls_id: &str, duration: f64) -> TraciResult<()>;

    fn close(&mut self) -> TraciResult<()>;
}

impl<S: Read + Write> TrafficControl for TraciClient<S> {
    fn simulation_step(&mut self) -> TraciResult<()> {
        TraciClient::simulation_step(self, 0.0)
    }

    fn simulation_time(&mut self) -> TraciResult<f64> {
        self.get_variable(CMD_GET_SIM_VARIABLE, VAR_TIME, "")?
            .into_f64()
    }

    fn departed_vehicles(&mut self) -> TraciResult<Vec<String>> {
        self.get_variable(CMD_GET_SIM_VARIABLE, VAR_DEPARTED_VEHICLES_IDS, "")?
            .into_string_list()
    }

    fn min_expected_vehicles(&mut self) -> TraciResult<i32> {
        self.get_variable(CMD_GET_SIM_VARIABLE, VAR_MIN_EXPECTED_VEHICLES, "")?
            .into_i32()
    }

    fn vehicle_ids(&mut self) -> TraciResult<Vec<String>> {
        self.get_variable(CMD_GET_VEHICLE_VARIABLE, TRACI_ID_LIST, "")?
            .into_string_list()
    }

    fn vehicle_speed(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        self.get_variable(CMD_GET_VEHICLE_VARIABLE, VAR_SPEED, vehicle_id)?
            .into_f64()
    }

    fn vehicle_waiting_time(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        self.get_variable(CMD_GET_VEHICLE_VARIABLE, VAR_WAITING_TIME, vehicle_id)?
            .into_f64()
    }

    fn vehicle_accumulated_waiting_time(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        self.get_variable(
            CMD_GET_VEHICLE_VARIABLE,
            VAR_ACCUMULATED_WAITING_TIME,
            vehicle_id,
        )?
        .into_f64()
    }

    fn vehicle_fuel_consumption(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        self.get_variable(CMD_GET_VEHICLE_VARIABLE, VAR_FUELCONSUMPTION, vehicle_id)?
            .into_f64()
    }

    fn vehicle_stop_state(&mut self, vehicle_id: &str) -> TraciResult<u8> {
        self.get_variable(CMD_GET_VEHICLE_VARIABLE, VAR_STOPSTATE, vehicle_id)?
            .into_u8()
    }

    fn vehicle_departure(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        self.get_variable(CMD_GET_VEHICLE_VARIABLE, VAR_DEPARTURE, vehicle_id)?
            .into_f64()
    }

    fn set_vehicle_type(&mut self, vehicle_id: &str, type_id: &str) -> TraciResult<()> {
        let mut value = Storage::new();
        value.write_typed_string(type_id);
        self.set_variable(CMD_SET_VEHICLE_VARIABLE, VAR_TYPE, vehicle_id, &value)
    }

    fn lane_vehicles(&mut self, lane_id: &str) -> TraciResult<Vec<String>> {
        self.get_variable(CMD_GET_LANE_VARIABLE, LAST_STEP_VEHICLE_ID_LIST, lane_id)?
            .into_string_list()
    }

    fn traffic_lights(&mut self) -> TraciResult<Vec<String>> {
        self.get_variable(CMD_GET_TL_VARIABLE, TRACI_ID_LIST, "")?
            .into_string_list()
    }

    fn controlled_lanes(&mut self, tls_id: &str) -> TraciResult<Vec<String>> {
        self.get_variable(CMD_GET_TL_VARIABLE, TL_CONTROLLED_LANES, tls_id)?
            .into_string_list()
    }

    fn traffic_light_phase(&mut self, tls_id: &str) -> TraciResult<i32> {
        self.get_variable(CMD_GET_TL_VARIABLE, TL_CURRENT_PHASE, tls_id)?
            .into_i32()
    }

    fn set_phase_duration(&mut self, tls_id: &str, duration: f64) -> TraciResult<()> {
        let mut value = Storage::new();
        value.write_typed_f64(duration);
        self.set_variable(CMD_SET_TL_VARIABLE, TL_PHASE_DURATION, tls_id, &value)
    }

    fn close(&mut self) -> TraciResult<()> {
        TraciClient::close(self)
    }
}
