//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigSchema {
    #[serde(default)]
    pub android: AndroidConfig,

    #[serde(default)]
    pub signing: SigningConfig,
}

/// Where the Android project and its property files live
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AndroidConfig {
    /// Android root, relative to the project directory
    #[serde(default = "default_project_dir")]
    pub project_dir: String,

    /// App module directory, relative to the Android root
    #[serde(default = "default_app_module")]
    pub app_module: String,

    /// Signing properties file, relative to the Android root
    #[serde(default = "default_key_properties")]
    pub key_properties: String,

    /// SDK locations file, relative to the Android root
    #[serde(default = "default_local_properties")]
    pub local_properties: String,
}

impl Default for AndroidConfig {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
            app_module: default_app_module(),
            key_properties: default_key_properties(),
            local_properties: default_local_properties(),
        }
    }
}

fn default_project_dir() -> String {
    "android".to_string()
}

fn default_app_module() -> String {
    "app".to_string()
}

fn default_key_properties() -> String {
    "key.properties".to_string()
}

fn default_local_properties() -> String {
    "local.properties".to_string()
}

/// Release signing policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SigningConfig {
    /// Refuse to build when the signing profile is missing keys
    #[serde(default)]
    pub require_signing: bool,

    /// Produce an unsigned artifact when key.properties is absent
    #[serde(default)]
    pub allow_unsigned: bool,
}
