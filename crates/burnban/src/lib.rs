pub mod config;
pub mod error;
pub mod resolution;
pub mod telemetry;
