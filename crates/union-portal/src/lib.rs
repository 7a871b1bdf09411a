pub mod config;
pub mod error;
pub mod response;
pub mod telemetry;
pub mod workflows;
