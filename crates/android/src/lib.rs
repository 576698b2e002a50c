//! Android release tooling for releasekit
//!
//! This crate provides Android-specific functionality:
//! - Release signing profile resolution from `key.properties`
//! - `local.properties` SDK and version lookup
//! - Release build type settings and the signing policy
//! - Project layout discovery and Gradle wrapper integration

#![warn(missing_docs)]

pub mod build_config;
pub mod gradle;
pub mod local_properties;
pub mod project;
pub mod signing;

pub use build_config::{ReleaseBuildConfig, SigningDecision, SigningPolicy};
pub use project::AndroidProject;
pub use signing::{resolve, ConfigurationMissing, SigningProfile};
