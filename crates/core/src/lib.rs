//! Core utilities for releasekit tools
//!
//! Shared functionality used by the platform crates and binaries:
//!
//! - **Error handling**: errors with codes, context and recovery suggestions
//! - **Properties**: the `key=value` file format Gradle projects use
//! - **Configuration**: optional TOML tool configuration with defaults
//! - **Process execution**: running build tools with captured or streamed output
//!
//! # Example
//!
//! ```rust,no_run
//! use releasekit_core::properties::Properties;
//! use std::path::Path;
//!
//! let props = Properties::load(Path::new("android/local.properties"))?;
//! if let Some(sdk) = props.get("sdk.dir") {
//!     println!("Android SDK at {sdk}");
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;
pub mod properties;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::properties::{MalformedEntry, MalformedReason, Properties};
}
