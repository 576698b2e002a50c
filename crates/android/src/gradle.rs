//! Gradle build system integration
//!
//! Runs release tasks through the project's Gradle wrapper with output
//! streamed to the terminal.

use crate::project::AndroidProject;
use crate::signing::SigningProfile;
use releasekit_core::error::{Error, ErrorCode, Result};
use releasekit_core::process::run_command_streaming_in_dir;
use std::path::Path;

/// Gradle wrapper file name for this platform
pub const WRAPPER: &str = if cfg!(windows) { "gradlew.bat" } else { "gradlew" };

/// Injected keystore path; overrides the module's signing config
pub const INJECTED_STORE_FILE: &str = "android.injected.signing.store.file";
/// Injected key alias
pub const INJECTED_KEY_ALIAS: &str = "android.injected.signing.key.alias";
/// Injected keystore password
pub const INJECTED_STORE_PASSWORD: &str = "android.injected.signing.store.password";
/// Injected key password
pub const INJECTED_KEY_PASSWORD: &str = "android.injected.signing.key.password";

/// Gradle reads project properties from variables with this prefix
const PROJECT_ENV_PREFIX: &str = "ORG_GRADLE_PROJECT_";

/// Release artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Installable APK
    Apk,
    /// Play Store app bundle (AAB)
    Bundle,
}

impl ArtifactKind {
    /// Gradle task producing the release artifact
    pub fn release_task(&self) -> &'static str {
        match self {
            Self::Apk => "assembleRelease",
            Self::Bundle => "bundleRelease",
        }
    }

    /// Short display name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Apk => "APK",
            Self::Bundle => "bundle",
        }
    }
}

/// Gradle arguments and environment that hand a signing profile to the
/// Android Gradle plugin.
///
/// Paths and aliases travel as `-P` arguments. Passwords go through
/// `ORG_GRADLE_PROJECT_*` variables so they stay out of the process list.
/// Absent values are left out and the plugin reports them.
#[derive(Debug, Default)]
pub struct InjectedSigning<'a> {
    /// `-Pname=value` arguments
    pub args: Vec<String>,
    /// Environment variables with borrowed secret values
    pub envs: Vec<(String, &'a str)>,
}

impl<'a> InjectedSigning<'a> {
    /// Build the injection for `profile`, resolving the keystore against `app_dir`
    pub fn new(profile: &'a SigningProfile, app_dir: &Path) -> Self {
        let mut injected = Self::default();

        if let Some(keystore) = profile.keystore_path(app_dir) {
            // Gradle runs in the Android root, so relative paths would move
            let keystore = std::path::absolute(&keystore).unwrap_or(keystore);
            injected
                .args
                .push(format!("-P{}={}", INJECTED_STORE_FILE, keystore.display()));
        }
        if let Some(alias) = profile.key_alias.as_deref().filter(|alias| !alias.is_empty()) {
            injected
                .args
                .push(format!("-P{}={}", INJECTED_KEY_ALIAS, alias));
        }
        for (name, secret) in [
            (INJECTED_STORE_PASSWORD, &profile.store_password),
            (INJECTED_KEY_PASSWORD, &profile.key_password),
        ] {
            if let Some(secret) = secret.as_ref().filter(|secret| !secret.is_empty()) {
                injected
                    .envs
                    .push((format!("{}{}", PROJECT_ENV_PREFIX, name), secret.expose()));
            }
        }

        injected
    }
}

/// Run Gradle tasks in the Android root
pub fn run_task(project: &AndroidProject, tasks: &[&str]) -> Result<()> {
    run_wrapper(project, tasks, &[])
}

fn run_wrapper(project: &AndroidProject, args: &[&str], envs: &[(&str, &str)]) -> Result<()> {
    let wrapper = project.gradle_wrapper();
    if !wrapper.is_file() {
        return Err(Error::file_not_found(&wrapper)
            .with_suggestion("Run `flutter build apk` once to generate the Gradle wrapper"));
    }

    let program = if cfg!(windows) {
        WRAPPER.to_string()
    } else {
        format!("./{}", WRAPPER)
    };

    let code = run_command_streaming_in_dir(&program, args, project.root(), envs)?;
    if code != 0 {
        let task = args.first().copied().unwrap_or("gradle");
        return Err(Error::new(
            ErrorCode::GradleError,
            format!("Gradle task {} failed with exit code {}", task, code),
        )
        .with_suggestion("Re-run the task with --stacktrace in the Android directory for details"));
    }
    Ok(())
}

/// Build the release artifact, signed with `signing` when given
pub fn build_release(
    project: &AndroidProject,
    kind: ArtifactKind,
    signing: Option<&SigningProfile>,
) -> Result<()> {
    let injected = signing
        .map(|profile| InjectedSigning::new(profile, project.app_dir()))
        .unwrap_or_default();

    let mut args = vec![kind.release_task()];
    args.extend(injected.args.iter().map(String::as_str));
    let envs: Vec<(&str, &str)> = injected
        .envs
        .iter()
        .map(|(key, value)| (key.as_str(), *value))
        .collect();

    tracing::info!(
        task = kind.release_task(),
        signed = signing.is_some(),
        "building release artifact"
    );
    run_wrapper(project, &args, &envs)
}

/// Clean build artifacts
pub fn clean(project: &AndroidProject) -> Result<()> {
    run_task(project, &["clean"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::Secret;
    use releasekit_core::config::AndroidConfig;
    use tempfile::TempDir;

    fn profile() -> SigningProfile {
        SigningProfile {
            store_file: Some("release.jks".to_string()),
            store_password: Some(Secret::from("store-pass")),
            key_alias: Some("upload".to_string()),
            key_password: Some(Secret::from("key-pass")),
        }
    }

    #[test]
    fn test_release_tasks() {
        assert_eq!(ArtifactKind::Apk.release_task(), "assembleRelease");
        assert_eq!(ArtifactKind::Bundle.release_task(), "bundleRelease");
    }

    #[test]
    fn test_missing_wrapper() {
        let dir = TempDir::new().unwrap();
        let project = AndroidProject::with_layout(dir.path(), &AndroidConfig::default());

        let err = build_release(&project, ArtifactKind::Apk, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::FileNotFound);
    }

    #[test]
    fn test_injected_signing_splits_secrets_from_args() {
        let dir = TempDir::new().unwrap();
        let profile = profile();
        let injected = InjectedSigning::new(&profile, &dir.path().join("app"));

        let store_arg = format!(
            "-P{}={}",
            INJECTED_STORE_FILE,
            dir.path().join("app").join("release.jks").display()
        );
        assert_eq!(
            injected.args,
            vec![store_arg, format!("-P{}=upload", INJECTED_KEY_ALIAS)]
        );
        assert!(injected.args.iter().all(|arg| !arg.contains("pass")));
        assert_eq!(
            injected.envs,
            vec![
                (
                    "ORG_GRADLE_PROJECT_android.injected.signing.store.password".to_string(),
                    "store-pass"
                ),
                (
                    "ORG_GRADLE_PROJECT_android.injected.signing.key.password".to_string(),
                    "key-pass"
                ),
            ]
        );
    }

    #[test]
    fn test_injected_signing_skips_absent_values() {
        let profile = SigningProfile {
            key_alias: Some(String::new()),
            ..SigningProfile::default()
        };
        let injected = InjectedSigning::new(&profile, Path::new("app"));
        assert!(injected.args.is_empty());
        assert!(injected.envs.is_empty());
    }

    #[cfg(unix)]
    fn fake_wrapper(dir: &Path, script: &str) {
        use std::os::unix::fs::PermissionsExt;

        let wrapper = dir.join(WRAPPER);
        std::fs::write(&wrapper, script).unwrap();
        std::fs::set_permissions(&wrapper, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_wrapper_in_android_root() {
        let dir = TempDir::new().unwrap();
        fake_wrapper(dir.path(), "#!/bin/sh\nprintf '%s\\n' \"$@\" >> gradle-args.txt\n");

        let project = AndroidProject::with_layout(dir.path(), &AndroidConfig::default());
        build_release(&project, ArtifactKind::Bundle, None).unwrap();

        let args = std::fs::read_to_string(dir.path().join("gradle-args.txt")).unwrap();
        assert_eq!(args, "bundleRelease\n");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_signed_build_hands_profile_to_gradle() {
        let dir = TempDir::new().unwrap();
        fake_wrapper(
            dir.path(),
            "#!/bin/sh\n\
             printf '%s\\n' \"$@\" > gradle-args.txt\n\
             tr '\\0' '\\n' < /proc/$$/environ | grep '^ORG_GRADLE_PROJECT_' | sort > gradle-env.txt\n",
        );

        let project = AndroidProject::with_layout(dir.path(), &AndroidConfig::default());
        build_release(&project, ArtifactKind::Apk, Some(&profile())).unwrap();

        let args = std::fs::read_to_string(dir.path().join("gradle-args.txt")).unwrap();
        let lines: Vec<&str> = args.lines().collect();
        assert_eq!(lines[0], "assembleRelease");
        assert!(lines[1].starts_with("-Pandroid.injected.signing.store.file="));
        assert!(lines[1].ends_with("release.jks"));
        assert_eq!(lines[2], "-Pandroid.injected.signing.key.alias=upload");
        assert!(!args.contains("store-pass"));

        let env = std::fs::read_to_string(dir.path().join("gradle-env.txt")).unwrap();
        assert_eq!(
            env,
            "ORG_GRADLE_PROJECT_android.injected.signing.key.password=key-pass\n\
             ORG_GRADLE_PROJECT_android.injected.signing.store.password=store-pass\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_task_is_gradle_error() {
        let dir = TempDir::new().unwrap();
        fake_wrapper(dir.path(), "#!/bin/sh\nexit 3\n");

        let project = AndroidProject::with_layout(dir.path(), &AndroidConfig::default());
        let err = clean(&project).unwrap_err();
        assert_eq!(err.code, ErrorCode::GradleError);
        assert!(err.message.contains("clean"));
        assert!(err.message.contains("exit code 3"));
    }
}
