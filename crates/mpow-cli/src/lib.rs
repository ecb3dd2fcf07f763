//! CLI library components for the MPOW normalizer.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod types;
