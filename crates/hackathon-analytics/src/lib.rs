//! Eligibility and analytics engine for hackathon events.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
