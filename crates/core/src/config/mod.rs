//! Configuration loading and schema definitions
//!
//! Tool configuration lives in an optional TOML file; every field has a default.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
