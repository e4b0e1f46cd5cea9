use std::io::{ErrorKind, Read, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use lustav_traci::constants::{CMD_CLOSE, CMD_GETVERSION, RESPONSE_OFFSET, RTYPE_OK};
use lustav_traci::storage::{Storage, StorageReader};

/// A command as the fake server received it.
#[derive(Clone, Debug, PartialEq)]
pub struct ReceivedCommand {
    pub id: u8,
    pub content: Vec<u8>,
}

/// Single-connection TraCI server on a local port. Every command is handed to a responder
/// that returns the raw response body.
pub struct FakeTraciServer {
    pub port: u16,
    handle: JoinHandle<Vec<ReceivedCommand>>,
}

impl FakeTraciServer {
    pub fn start<F>(mut responder: F) -> Self
    where
        F: FnMut(&ReceivedCommand) -> Vec<u8> + Send + 'static,
    {
        let listener =
            TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("failed to bind fake server");
        let port = listener.local_addr().expect("no local address").port();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("failed to accept client");
            let mut received = Vec::new();
            while let Some(command) = read_command(&mut stream) {
                let body = responder(&command);
                write_message(&mut stream, body);
                let is_close = command.id == CMD_CLOSE;
                received.push(command);
                if is_close {
                    break;
                }
            }
            received
        });
        Self { port, handle }
    }

    pub fn connect(&self) -> TcpStream {
        TcpStream::connect((Ipv4Addr::LOCALHOST, self.port)).expect("failed to connect")
    }

    /// Waits for the client to hang up and returns every command it sent.
    pub fn join(self) -> Vec<ReceivedCommand> {
        self.handle.join().expect("fake server panicked")
    }
}

fn read_command(stream: &mut TcpStream) -> Option<ReceivedCommand> {
    let mut header = [0u8; 4];
    if let Err(e) = stream.read_exact(&mut header) {
        if e.kind() == ErrorKind::UnexpectedEof {
            return None;
        }
        panic!("fake server failed to read: {}", e);
    }
    let total = i32::from_be_bytes(header) as usize;
    let mut body = vec![0u8; total - 4];
    stream.read_exact(&mut body).expect("truncated message");
    let mut reader = StorageReader::new(&body);
    let (id, length) = reader.read_command_header().expect("bad command header");
    let start = reader.position();
    Some(ReceivedCommand {
        id,
        content: body[start..start + length].to_vec(),
    })
}

fn write_message(stream: &mut TcpStream, body: Vec<u8>) {
    let mut storage = Storage::new();
    storage.write_bytes(&body);
    stream
        .write_all(&storage.into_message())
        .expect("fake server failed to write");
}

/// Status command with an arbitrary result code.
pub fn status(command_id: u8, result: u8, description: &str) -> Vec<u8> {
    let mut content = Storage::new();
    content.write_u8(result);
    content.write_string(description);
    let mut storage = Storage::new();
    storage.write_command(command_id, content.as_bytes());
    storage.into_bytes()
}

pub fn ok_status(command_id: u8) -> Vec<u8> {
    status(command_id, RTYPE_OK, "")
}

/// Answer to getVersion.
pub fn version_response(api_version: i32, identifier: &str) -> Vec<u8> {
    let mut content = Storage::new();
    content.write_i32(api_version);
    content.write_string(identifier);
    let mut storage = Storage::new();
    storage.write_bytes(&ok_status(CMD_GETVERSION));
    storage.write_command(CMD_GETVERSION, content.as_bytes());
    storage.into_bytes()
}

/// Status plus the response command of a variable get.
pub fn variable_response(domain: u8, variable: u8, object_id: &str, value: &Storage) -> Vec<u8> {
    let mut content = Storage::new();
    content.write_u8(variable);
    content.write_string(object_id);
    content.write_bytes(value.as_bytes());
    let mut storage = Storage::new();
    storage.write_bytes(&ok_status(domain));
    storage.write_command(domain + RESPONSE_OFFSET, content.as_bytes());
    storage.into_bytes()
}

/// Status plus the subscription count of a simulation step.
pub fn step_response(command_id: u8) -> Vec<u8> {
    let mut storage = Storage::new();
    storage.write_bytes(&ok_status(command_id));
    storage.write_i32(0);
    storage.into_bytes()
}

/// Splits the content of a get-variable command into variable id and object id.
pub fn variable_request(command: &ReceivedCommand) -> (u8, String) {
    let mut reader = StorageReader::new(&command.content);
    let variable = reader.read_u8().expect("missing variable id");
    let object_id = reader.read_string().expect("missing object id");
    (variable, object_id)
}
