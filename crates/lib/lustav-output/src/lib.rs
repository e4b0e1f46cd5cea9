#![forbid(unsafe_code)]

pub mod logger;
pub mod plots;
pub mod report;
pub mod result;
pub mod series;
pub mod terminal;
pub mod ui;
pub mod writer;

pub type OutputResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
