//! Hostel admission scoring: weightage tables, feature assembly, model dispatch and
//! result interpretation, plus the configuration and telemetry shared by the service.

pub mod batch;
pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
