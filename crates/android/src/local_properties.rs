//! `local.properties` view
//!
//! Flutter writes the SDK locations and the app version into
//! `android/local.properties`. The file is machine-specific and often absent
//! on a fresh checkout, so a missing file is not an error.

use releasekit_core::error::{Error, Result};
use releasekit_core::properties::Properties;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Android SDK location
pub const SDK_DIR: &str = "sdk.dir";
/// Flutter SDK location
pub const FLUTTER_SDK: &str = "flutter.sdk";
/// Integer version code
pub const VERSION_CODE: &str = "flutter.versionCode";
/// Display version
pub const VERSION_NAME: &str = "flutter.versionName";
/// Last Flutter build mode
pub const BUILD_MODE: &str = "flutter.buildMode";

const DEFAULT_VERSION_CODE: u32 = 1;
const DEFAULT_VERSION_NAME: &str = "1.0";

/// Typed view of `local.properties`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalProperties {
    /// `sdk.dir`
    pub sdk_dir: Option<PathBuf>,
    /// `flutter.sdk`
    pub flutter_sdk: Option<PathBuf>,
    /// `flutter.versionCode`, when numeric
    pub version_code: Option<u32>,
    /// `flutter.versionName`
    pub version_name: Option<String>,
    /// `flutter.buildMode`
    pub build_mode: Option<String>,
    #[serde(skip)]
    raw: Properties,
}

impl LocalProperties {
    /// Load the file at `path`, returning `Ok(None)` when it does not exist
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match Properties::load(path) {
            Ok(props) => Ok(Some(Self::from_properties(props))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no local.properties");
                Ok(None)
            }
            Err(err) => {
                Err(Error::from(err).with_context(format!("Failed to read {}", path.display())))
            }
        }
    }

    /// Build the view from parsed properties
    pub fn from_properties(raw: Properties) -> Self {
        let version_code = raw.get(VERSION_CODE).and_then(|code| {
            code.trim().parse::<u32>().map_or_else(
                |_| {
                    tracing::warn!(value = code, "ignoring non-numeric {}", VERSION_CODE);
                    None
                },
                Some,
            )
        });

        Self {
            sdk_dir: raw.get(SDK_DIR).map(PathBuf::from),
            flutter_sdk: raw.get(FLUTTER_SDK).map(PathBuf::from),
            version_code,
            version_name: raw.get(VERSION_NAME).map(str::to_string),
            build_mode: raw.get(BUILD_MODE).map(str::to_string),
            raw,
        }
    }

    /// Version code, defaulting to 1 like the Flutter Gradle plugin
    pub fn effective_version_code(&self) -> u32 {
        self.version_code.unwrap_or(DEFAULT_VERSION_CODE)
    }

    /// Version name, defaulting to "1.0" like the Flutter Gradle plugin
    pub fn effective_version_name(&self) -> &str {
        self.version_name.as_deref().unwrap_or(DEFAULT_VERSION_NAME)
    }

    /// Any other key from the file
    pub fn get(&self, key: &str) -> Option<&str> {
        self.raw.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let local = LocalProperties::load(&dir.path().join("local.properties")).unwrap();
        assert!(local.is_none());
    }

    #[test]
    fn test_load_directory_is_error() {
        let dir = TempDir::new().unwrap();
        let err = LocalProperties::load(dir.path()).unwrap_err();
        assert!(err.context.is_some());
    }

    #[test]
    fn test_load_flutter_generated_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("local.properties");
        fs::write(
            &path,
            "sdk.dir=/home/dev/Android/Sdk\n\
             flutter.sdk=/home/dev/flutter\n\
             flutter.buildMode=release\n\
             flutter.versionName=1.2.0\n\
             flutter.versionCode=7\n",
        )
        .unwrap();

        let local = LocalProperties::load(&path).unwrap().unwrap();
        assert_eq!(local.sdk_dir, Some(PathBuf::from("/home/dev/Android/Sdk")));
        assert_eq!(local.flutter_sdk, Some(PathBuf::from("/home/dev/flutter")));
        assert_eq!(local.version_code, Some(7));
        assert_eq!(local.effective_version_name(), "1.2.0");
        assert_eq!(local.build_mode.as_deref(), Some("release"));
        assert_eq!(local.get("flutter.buildMode"), Some("release"));
    }

    #[test]
    fn test_windows_sdk_path_escapes() {
        let props = Properties::parse("sdk.dir=C\\:\\\\Users\\\\dev\\\\AppData\\\\Local\\\\Android\\\\sdk\n");
        let local = LocalProperties::from_properties(props);
        assert_eq!(
            local.sdk_dir,
            Some(PathBuf::from("C:\\Users\\dev\\AppData\\Local\\Android\\sdk"))
        );
    }

    #[test]
    fn test_version_defaults() {
        let local = LocalProperties::from_properties(Properties::new());
        assert_eq!(local.effective_version_code(), 1);
        assert_eq!(local.effective_version_name(), "1.0");
    }

    #[test]
    fn test_non_numeric_version_code_ignored() {
        let local = LocalProperties::from_properties(Properties::parse("flutter.versionCode=abc\n"));
        assert_eq!(local.version_code, None);
        assert_eq!(local.effective_version_code(), 1);
    }
}
