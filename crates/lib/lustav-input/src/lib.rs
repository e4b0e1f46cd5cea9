#![forbid(unsafe_code)]

pub mod error;
pub mod sumocfg;
pub mod tripinfo;
mod xml;
