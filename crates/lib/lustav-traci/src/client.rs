use std::io::{Read, Write};

use log::{debug, trace};

use crate::constants::{
    CMD_CLOSE, CMD_GETVERSION, CMD_SIMSTEP, RESPONSE_OFFSET, RTYPE_OK,
};
use crate::error::{TraciError, TraciResult};
use crate::storage::{Storage, StorageReader, TraciValue};

/// Blocking TraCI client over any byte stream, normally a `TcpStream` to SUMO.
#[derive(Debug)]
pub struct TraciClient<S: Read + Write> {
    stream: Option<S>,
}

impl<S: Read + Write> TraciClient<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// API version and identifier of the connected server.
    pub fn get_version(&mut self) -> TraciResult<(i32, String)> {
        let body = self.exchange(CMD_GETVERSION, &[])?;
        let mut reader = StorageReader::new(&body);
        Self::check_status(&mut reader, CMD_GETVERSION)?;
        let (command_id, _) = reader.read_command_header()?;
        if command_id != CMD_GETVERSION {
            return Err(TraciError::protocol(format!(
                "expected version response, found command 0x{:02x}",
                command_id
            )));
        }
        let api_version = reader.read_i32()?;
        let identifier = reader.read_string()?;
        Ok((api_version, identifier))
    }

    /// Advances the simulation. A target time of zero performs exactly one step.
    pub fn simulation_step(&mut self, target_time: f64) -> TraciResult<()> {
        let mut content = Storage::new();
        content.write_f64(target_time);
        let body = self.exchange(CMD_SIMSTEP, content.as_bytes())?;
        let mut reader = StorageReader::new(&body);
        Self::check_status(&mut reader, CMD_SIMSTEP)?;
        if reader.has_remaining() {
            let subscriptions = reader.read_i32()?;
            for _ in 0..subscriptions {
                let skipped = reader.skip_command()?;
                trace!("Ignoring subscription response 0x{:02x}", skipped);
            }
        }
        Ok(())
    }

    pub fn get_variable(
        &mut self,
        domain: u8,
        variable: u8,
        object_id: &str,
    ) -> TraciResult<TraciValue> {
        let mut content = Storage::new();
        content.write_u8(variable);
        content.write_string(object_id);
        let body = self.exchange(domain, content.as_bytes())?;

        let mut reader = StorageReader::new(&body);
        Self::check_status(&mut reader, domain)?;
        let (command_id, _) = reader.read_command_header()?;
        let expected = domain.wrapping_add(RESPONSE_OFFSET);
        if command_id != expected {
            return Err(TraciError::protocol(format!(
                "expected response 0x{:02x}, found 0x{:02x}",
                expected, command_id
            )));
        }
        let answered_variable = reader.read_u8()?;
        let answered_object = reader.read_string()?;
        if answered_variable != variable || answered_object != object_id {
            return Err(TraciError::protocol(format!(
                "asked for 0x{:02x} of '{}' but got 0x{:02x} of '{}'",
                variable, object_id, answered_variable, answered_object
            )));
        }
        reader.read_value()
    }

    /// Sets a variable. `value` must already hold the type byte and the value.
    pub fn set_variable(
        &mut self,
        domain: u8,
        variable: u8,
        object_id: &str,
        value: &Storage,
    ) -> TraciResult<()> {
        let mut content = Storage::new();
        content.write_u8(variable);
        content.write_string(object_id);
        content.write_bytes(value.as_bytes());
        let body = self.exchange(domain, content.as_bytes())?;
        let mut reader = StorageReader::new(&body);
        Self::check_status(&mut reader, domain)
    }

    /// Ends the session. SUMO terminates once its last client closes.
    pub fn close(&mut self) -> TraciResult<()> {
        if self.is_closed() {
            return Ok(());
        }
        let body = self.exchange(CMD_CLOSE, &[])?;
        let mut reader = StorageReader::new(&body);
        let result = Self::check_status(&mut reader, CMD_CLOSE);
        self.stream = None;
        debug!("TraCI connection closed");
        result
    }

    fn exchange(&mut self, command_id: u8, content: &[u8]) -> TraciResult<Vec<u8>> {
        let mut storage = Storage::new();
        storage.write_command(command_id, content);
        self.send(storage.into_message())?;
        self.receive()
    }

    fn send(&mut self, message: Vec<u8>) -> TraciResult<()> {
        let stream = self.stream.as_mut().ok_or(TraciError::Closed)?;
        stream.write_all(&message)?;
        stream.flush()?;
        Ok(())
    }

    fn receive(&mut self) -> TraciResult<Vec<u8>> {
        let stream = self.stream.as_mut().ok_or(TraciError::Closed)?;
        let mut header = [0u8; 4];
        stream.read_exact(&mut header)?;
        let total = i32::from_be_bytes(header);
        let body_length = usize::try_from(total)
            .ok()
            .and_then(|total| total.checked_sub(4))
            .ok_or_else(|| TraciError::protocol(format!("invalid message length {}", total)))?;
        let mut body = vec![0u8; body_length];
        stream.read_exact(&mut body)?;
        Ok(body)
    }

    fn check_status(reader: &mut StorageReader, command_id: u8) -> TraciResult<()> {
        let (answered, _) = reader.read_command_header()?;
        if answered != command_id {
            return Err(TraciError::protocol(format!(
                "status for 0x{:02x} answered command 0x{:02x}",
                command_id, answered
            )));
        }
        let status = reader.read_u8()?;
        let description = reader.read_string()?;
        if status != RTYPE_OK {
            return Err(TraciError::Command {
                command: command_id,
                status,
                description,
            });
        }
        Ok(())
    }
}
