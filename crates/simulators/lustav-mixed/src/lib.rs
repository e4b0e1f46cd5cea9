#![forbid(unsafe_code)]

pub mod simulation;
pub mod traffic;
