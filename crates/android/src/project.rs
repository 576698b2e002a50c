//! Android project layout
//!
//! A Flutter app keeps its Gradle build under `android/`: property files in
//! the Android root, the application module under `android/app/`.

use releasekit_core::config::AndroidConfig;
use releasekit_core::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Files that mark a directory as a Gradle root
const ROOT_MARKERS: [&str; 4] = ["settings.gradle.kts", "settings.gradle", "gradlew", "gradlew.bat"];

/// Resolved locations inside an Android Gradle project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidProject {
    root: PathBuf,
    app_dir: PathBuf,
    key_properties: PathBuf,
    local_properties: PathBuf,
}

impl AndroidProject {
    /// Locate the Android root from `start`, which may be the Flutter project
    /// root or the Android root itself
    pub fn discover(start: &Path, config: &AndroidConfig) -> Result<Self> {
        let nested = start.join(&config.project_dir);

        let root = [start, nested.as_path()]
            .into_iter()
            .find(|dir| is_gradle_root(dir))
            .ok_or_else(|| Error::project_not_found(start))?;

        tracing::debug!(root = %root.display(), "found Android project");
        Ok(Self::with_layout(root, config))
    }

    /// Build the layout under `root` without checking the filesystem
    pub fn with_layout(root: &Path, config: &AndroidConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            app_dir: root.join(&config.app_module),
            key_properties: root.join(&config.key_properties),
            local_properties: root.join(&config.local_properties),
        }
    }

    /// Use a signing properties file outside the standard layout
    pub fn with_key_properties(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_properties = path.into();
        self
    }

    /// Android root (`android/`)
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Application module (`android/app/`); keystore paths resolve here
    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// Signing properties (`android/key.properties`)
    pub fn key_properties(&self) -> &Path {
        &self.key_properties
    }

    /// SDK locations (`android/local.properties`)
    pub fn local_properties(&self) -> &Path {
        &self.local_properties
    }

    /// Gradle wrapper script for this platform
    pub fn gradle_wrapper(&self) -> PathBuf {
        self.root.join(crate::gradle::WRAPPER)
    }
}

fn is_gradle_root(dir: &Path) -> bool {
    ROOT_MARKERS.iter().any(|marker| dir.join(marker).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discover_from_flutter_root() {
        let dir = TempDir::new().unwrap();
        let android = dir.path().join("android");
        fs::create_dir_all(android.join("app")).unwrap();
        fs::write(android.join("settings.gradle.kts"), "").unwrap();

        let project = AndroidProject::discover(dir.path(), &AndroidConfig::default()).unwrap();
        assert_eq!(project.root(), android);
        assert_eq!(project.app_dir(), android.join("app"));
        assert_eq!(project.key_properties(), android.join("key.properties"));
        assert_eq!(project.local_properties(), android.join("local.properties"));
    }

    #[test]
    fn test_discover_from_android_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("settings.gradle"), "").unwrap();

        let project = AndroidProject::discover(dir.path(), &AndroidConfig::default()).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn test_discover_custom_layout() {
        let dir = TempDir::new().unwrap();
        let android = dir.path().join("mobile");
        fs::create_dir_all(&android).unwrap();
        fs::write(android.join("gradlew"), "").unwrap();

        let config = AndroidConfig {
            project_dir: "mobile".to_string(),
            key_properties: "signing/release.properties".to_string(),
            ..AndroidConfig::default()
        };
        let project = AndroidProject::discover(dir.path(), &config).unwrap();
        assert_eq!(
            project.key_properties(),
            android.join("signing/release.properties")
        );
    }

    #[test]
    fn test_with_key_properties_override() {
        let project = AndroidProject::with_layout(Path::new("/work/android"), &AndroidConfig::default())
            .with_key_properties("/secrets/key.properties");
        assert_eq!(project.key_properties(), Path::new("/secrets/key.properties"));
        assert_eq!(project.app_dir(), Path::new("/work/android/app"));
    }

    #[test]
    fn test_discover_without_project() {
        let dir = TempDir::new().unwrap();
        let err = AndroidProject::discover(dir.path(), &AndroidConfig::default()).unwrap_err();
        assert_eq!(err.code, releasekit_core::ErrorCode::ProjectNotFound);
    }
}
