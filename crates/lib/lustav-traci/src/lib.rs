#![forbid(unsafe_code)]

pub mod client;
pub mod constants;
pub mod control;
pub mod error;
pub mod launcher;
pub mod storage;
