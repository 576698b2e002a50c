//! CLI utilities for releasekit tools
//!
//! Provides shared CLI functionality:
//! - Status lines and headers
//! - Aligned field listings
//! - JSON and error report output

#![warn(missing_docs)]

pub mod output;
