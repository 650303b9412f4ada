//! CLI library components for the hospital operations ETL.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod pipeline;
pub mod summary;
pub mod types;
