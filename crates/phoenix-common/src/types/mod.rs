//! Core data types for PHOENIX

pub mod agent;
pub mod evolution;
pub mod genetic;
pub mod metrics;
pub mod spirit;
