//! Emergency detection for wearable heart-rate and motion samples.
//!
//! Samples flow through [`monitoring::normalizer`], [`monitoring::rules`] and, when a rule
//! fires, the contact resolver, notification dispatcher and audit logger composed by
//! [`monitoring::EmergencyMonitor`].

pub mod config;
pub mod error;
pub mod monitoring;
pub mod telemetry;
