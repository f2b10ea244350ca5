//! Infrastructure adapters and runtime bootstrap.

pub mod db;
pub mod error;
pub mod extract;
pub mod generation;
pub mod http;
pub mod output;
pub mod telemetry;
pub mod uploads;
