use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Read};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use typed_builder::TypedBuilder;

use crate::client::TraciClient;
use crate::control::TrafficControl;
use crate::error::{TraciError, TraciResult};

const CONNECT_RETRY: Duration = Duration::from_millis(100);

/// Lines of SUMO's error output kept for error reports.
const STDERR_TAIL: usize = 20;

/// Everything needed to start one SUMO process with a TraCI server.
#[derive(Clone, Debug, TypedBuilder)]
pub struct SumoLauncher {
    #[builder(default = "sumo".to_string(), setter(into))]
    binary: String,
    #[builder(setter(into))]
    config_file: PathBuf,
    seed: u64,
    #[builder(default)]
    port: Option<u16>,
    #[builder(default)]
    tripinfo_file: Option<PathBuf>,
    #[builder(default)]
    extra_args: Vec<String>,
    #[builder(default = Duration::from_secs(30))]
    connect_timeout: Duration,
}

impl SumoLauncher {
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Command-line arguments passed to SUMO when it listens on `port`.
    pub fn arguments(&self, port: u16) -> Vec<String> {
        let mut arguments = vec![
            "-c".to_string(),
            self.config_file.display().to_string(),
            "--remote-port".to_string(),
            port.to_string(),
            "--seed".to_string(),
            self.seed.to_string(),
            "--no-step-log".to_string(),
            "true".to_string(),
        ];
        if let Some(tripinfo_file) = &self.tripinfo_file {
            arguments.push("--tripinfo-output".to_string());
            arguments.push(tripinfo_file.display().to_string());
            arguments.push("--device.emissions.probability".to_string());
            arguments.push("1".to_string());
        }
        arguments.extend(self.extra_args.iter().cloned());
        arguments
    }

    /// Starts SUMO and connects to its TraCI server.
    pub fn launch(&self) -> TraciResult<SumoSession> {
        let port = match self.port {
            Some(port) => port,
            None => free_port()?,
        };
        let arguments = self.arguments(port);
        info!("Launching {} {}", self.binary, arguments.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TraciError::Launch {
                binary: self.binary.clone(),
                source,
            })?;
        let mut stderr = child.stderr.take().map(collect_stderr);

        let stream = match self.connect(&mut child, port) {
            Ok(stream) => stream,
            Err(TraciError::ProcessExited { status, .. }) => {
                let output = join_stderr(&mut stderr).join("\n");
                return Err(TraciError::ProcessExited { status, output });
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        let mut session = SumoSession {
            child: Some(child),
            stderr,
            client: TraciClient::new(stream),
        };
        let (api_version, identifier) = session.client.get_version()?;
        info!(
            "Connected to {} (TraCI API {}) on port {}",
            identifier, api_version, port
        );
        Ok(session)
    }

    fn connect(&self, child: &mut Child, port: u16) -> TraciResult<TcpStream> {
        let started = Instant::now();
        loop {
            if let Some(status) = child.try_wait()? {
                return Err(TraciError::ProcessExited {
                    status,
                    output: String::new(),
                });
            }
            match TcpStream::connect((Ipv4Addr::LOCALHOST, port)) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    return Ok(stream);
                }
                Err(e) => debug!("SUMO not reachable yet on port {}: {}", port, e),
            }
            if started.elapsed() >= self.connect_timeout {
                return Err(TraciError::ConnectTimeout {
                    port,
                    timeout_ms: self.connect_timeout.as_millis() as u64,
                });
            }
            thread::sleep(CONNECT_RETRY);
        }
    }
}

/// Asks the OS for an unused local port. The port is released again before SUMO binds it.
pub fn free_port() -> TraciResult<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))?;
    Ok(listener.local_addr()?.port())
}

/// Logs SUMO's error output as it arrives and keeps the last lines of it.
fn collect_stderr<R: Read + Send + 'static>(stderr: R) -> JoinHandle<Vec<String>> {
    thread::spawn(move || {
        let mut tail = VecDeque::with_capacity(STDERR_TAIL);
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            warn!("SUMO: {}", line);
            if tail.len() == STDERR_TAIL {
                tail.pop_front();
            }
            tail.push_back(line);
        }
        tail.into_iter().collect()
    })
}

/// Only call once the process is gone, the reader stops at end of file.
fn join_stderr(stderr: &mut Option<JoinHandle<Vec<String>>>) -> Vec<String> {
    stderr
        .take()
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// A running SUMO process together with the TraCI connection to it.
#[derive(Debug)]
pub struct SumoSession {
    child: Option<Child>,
    stderr: Option<JoinHandle<Vec<String>>>,
    client: TraciClient<TcpStream>,
}

impl SumoSession {
    /// Id of the SUMO process while it has not been waited for.
    pub fn process_id(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }

    fn wait_for_exit(&mut self) -> TraciResult<()> {
        if let Some(mut child) = self.child.take() {
            let status = child.wait()?;
            let output = join_stderr(&mut self.stderr);
            if !status.success() {
                warn!("SUMO exited with {}: {}", status, output.join(" | "));
            }
        }
        Ok(())
    }
}

impl Drop for SumoSession {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            warn!("Killing SUMO process {} that was not closed", child.id());
            let _ = child.kill();
            let _ = child.wait();
            join_stderr(&mut self.stderr);
        }
    }
}

impl TrafficControl for SumoSession {
    fn simulation_step(&mut self) -> TraciResult<()> {
        TrafficControl::simulation_step(&mut self.client)
    }

    fn simulation_time(&mut self) -> TraciResult<f64> {
        self.client.simulation_time()
    }

    fn departed_vehicles(&mut self) -> TraciResult<Vec<String>> {
        self.client.departed_vehicles()
    }

    fn min_expected_vehicles(&mut self) -> TraciResult<i32> {
        self.client.min_expected_vehicles()
    }

    fn vehicle_ids(&mut self) -> TraciResult<Vec<String>> {
        self.client.vehicle_ids()
    }

    fn vehicle_speed(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        self.client.vehicle_speed(vehicle_id)
    }

    fn vehicle_waiting_time(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        self.client.vehicle_waiting_time(vehicle_id)
    }

    fn vehicle_accumulated_waiting_time(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        self.client.vehicle_accumulated_waiting_time(vehicle_id)
    }

    fn vehicle_fuel_consumption(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        self.client.vehicle_fuel_consumption(vehicle_id)
    }

    fn vehicle_stop_state(&mut self, vehicle_id: &str) -> TraciResult<u8> {
        self.client.vehicle_stop_state(vehicle_id)
    }

    fn vehicle_departure(&mut self, vehicle_id: &str) -> TraciResult<f64> {
        self.client.vehicle_departure(vehicle_id)
    }

    fn set_vehicle_type(&mut self, vehicle_id: &str, type_id: &str) -> TraciResult<()> {
        self.client.set_vehicle_type(vehicle_id, type_id)
    }

    fn lane_vehicles(&mut self, lane_id: &str) -> TraciResult<Vec<String>> {
        self.client.lane_vehicles(lane_id)
    }

    fn traffic_lights(&mut self) -> TraciResult<Vec<String>> {
        self.client.traffic_lights()
    }

    fn controlled_lanes(&mut self, tls_id: &str) -> TraciResult<Vec<String>> {
        self.client.controlled_lanes(tls_id)
    }

    fn traffic_light_phase(&mut self, tls_id: &str) -> TraciResult<i32> {
        self.client.traffic_light_phase(tls_id)
    }

    fn set_phase_duration(&mut self, tls_id: &str, duration: f64) -> TraciResult<()> {
        self.client.set_phase_duration(tls_id, duration)
    }

    fn close(&mut self) -> TraciResult<()> {
        TrafficControl::close(&mut self.client)?;
        self.wait_for_exit()
    }
}
