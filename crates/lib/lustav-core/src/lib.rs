#![forbid(unsafe_code)]

pub use indexmap;

pub mod metrics;
pub mod rate;
pub mod step;
pub mod study;
