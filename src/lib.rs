//! Exostat - statistical inference over exoplanet catalogue exports
//!
//! The core (tables, filters, descriptive statistics, confidence intervals,
//! hypothesis tests and orbital-mechanics quantities) is pure and
//! deterministic. The loader, study configuration, runner and report
//! rendering wrap it into a command-line tool.

pub mod cli;
pub mod comparison;
pub mod config;
pub mod derived;
pub mod error;
pub mod filter;
pub mod hypothesis;
pub mod interval;
pub mod loader;
pub mod orbital;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod stats;
pub mod study;
pub mod table;

pub use error::{InferenceError, Result};
