pub mod scratch;
pub mod server;
pub mod traffic;
