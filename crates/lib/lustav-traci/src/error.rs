use std::io;
use std::process::ExitStatus;

use thiserror::Error;

pub type TraciResult<T> = Result<T, TraciError>;

#[derive(Debug, Error)]
pub enum TraciError {
    #[error("i/o failure on the TraCI connection: {0}")]
    Io(#[from] io::Error),
    #[error("malformed TraCI data: {0}")]
    Protocol(String),
    #[error("TraCI command 0x{command:02x} returned status 0x{status:02x}: {description}")]
    Command {
        command: u8,
        status: u8,
        description: String,
    },
    #[error("failed to launch {binary}: {source}")]
    Launch {
        binary: String,
        #[source]
        source: io::Error,
    },
    #[error("SUMO exited before accepting a connection ({status}): {output}")]
    ProcessExited { status: ExitStatus, output: String },
    #[error("SUMO did not accept a connection on port {port} within {timeout_ms} ms")]
    ConnectTimeout { port: u16, timeout_ms: u64 },
    #[error("the TraCI connection is already closed")]
    Closed,
}

impl TraciError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}
