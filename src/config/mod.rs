//! Runtime configuration for demo binaries.

pub mod chart;
