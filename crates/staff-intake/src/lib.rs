//! Core library for the staff application service: the lifecycle engine and
//! its storage, statistics, and audit collaborators, plus the HTTP router,
//! configuration, and telemetry shared with the deployable binary.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod telemetry;
