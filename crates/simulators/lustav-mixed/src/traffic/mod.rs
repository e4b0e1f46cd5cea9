pub mod autonomy;
pub mod metrics;
pub mod mixed;
pub mod signals;
pub mod sweep;
