//! Release build settings and the signing decision
//!
//! Mirrors what the app's `build.gradle.kts` declares for the release build
//! type, and decides whether a release artifact may be produced from the
//! signing profile that was (or was not) resolved.

use crate::signing::{ConfigurationMissing, SigningProfile};
use releasekit_core::config::SigningConfig;
use releasekit_core::error::{Error, ErrorCode, Result};
use serde::Serialize;
use std::fmt;

/// JVM language level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum JavaVersion {
    /// Java 8
    #[serde(rename = "1.8")]
    Version1_8,
    /// Java 11
    #[serde(rename = "11")]
    Version11,
    /// Java 17
    #[serde(rename = "17")]
    Version17,
    /// Java 21
    #[serde(rename = "21")]
    Version21,
}

impl JavaVersion {
    /// The version string Gradle and kotlinc expect
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Version1_8 => "1.8",
            Self::Version11 => "11",
            Self::Version17 => "17",
            Self::Version21 => "21",
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Java and Kotlin compilation targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompileOptions {
    /// `compileOptions.sourceCompatibility`
    pub source_compatibility: JavaVersion,
    /// `compileOptions.targetCompatibility`
    pub target_compatibility: JavaVersion,
    /// `kotlinOptions.jvmTarget`
    pub jvm_target: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            source_compatibility: JavaVersion::Version11,
            target_compatibility: JavaVersion::Version11,
            jvm_target: JavaVersion::Version11.to_string(),
        }
    }
}

/// The release build type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseBuildConfig {
    /// Profile used by the release signing config, if one was resolved
    pub signing: Option<SigningProfile>,
    /// R8 code shrinking and obfuscation
    pub minify_enabled: bool,
    /// Unused resource removal
    pub shrink_resources: bool,
    /// Compilation targets shared by all build types
    pub compile_options: CompileOptions,
}

impl ReleaseBuildConfig {
    /// Release settings with minification and resource shrinking enabled
    pub fn new(signing: Option<SigningProfile>) -> Self {
        Self {
            signing,
            minify_enabled: true,
            shrink_resources: true,
            compile_options: CompileOptions::default(),
        }
    }

    /// Whether a signing profile is attached
    pub fn is_signed(&self) -> bool {
        self.signing.is_some()
    }

    /// Reject combinations the Android Gradle plugin refuses to build
    pub fn validate(&self) -> Result<()> {
        if self.shrink_resources && !self.minify_enabled {
            return Err(Error::validation(
                "Resource shrinking requires code shrinking to be enabled",
            )
            .with_suggestion("Enable minify for the release build type"));
        }
        if self.compile_options.target_compatibility < self.compile_options.source_compatibility {
            return Err(Error::validation(format!(
                "Target compatibility {} is lower than source compatibility {}",
                self.compile_options.target_compatibility,
                self.compile_options.source_compatibility
            )));
        }
        Ok(())
    }
}

/// Why a release build may not proceed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// `key.properties` is absent or unreadable and unsigned builds are off
    MissingConfiguration,
    /// The profile lacks these keys and complete signing is required
    IncompleteProfile(Vec<&'static str>),
}

impl BlockReason {
    /// Convert into the workspace error for reporting
    pub fn to_error(&self) -> Error {
        match self {
            Self::MissingConfiguration => Error::new(
                ErrorCode::UnsignedReleaseBlocked,
                "Release build blocked: no signing configuration",
            )
            .with_suggestion(
                "Create android/key.properties or pass --allow-unsigned to build an unsigned artifact",
            ),
            Self::IncompleteProfile(missing) => Error::incomplete_signing(missing),
        }
    }
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingConfiguration => f.write_str("no signing configuration"),
            Self::IncompleteProfile(missing) => {
                write!(f, "signing profile missing {}", missing.join(", "))
            }
        }
    }
}

/// Outcome of applying a [`SigningPolicy`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningDecision {
    /// Build and sign with this profile
    Signed(SigningProfile),
    /// Build without a signing config
    Unsigned,
    /// Do not build
    Blocked(BlockReason),
}

/// Caller-side rules for release signing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SigningPolicy {
    /// Block when the profile lacks any key
    pub require_signing: bool,
    /// Build unsigned when no profile could be resolved
    pub allow_unsigned: bool,
}

impl From<SigningConfig> for SigningPolicy {
    fn from(config: SigningConfig) -> Self {
        Self {
            require_signing: config.require_signing,
            allow_unsigned: config.allow_unsigned,
        }
    }
}

impl SigningPolicy {
    /// Decide what the release build does with a resolution outcome.
    ///
    /// An incomplete profile is still used unless `require_signing` is set;
    /// the signer then reports the missing value.
    pub fn decide(
        &self,
        resolution: std::result::Result<SigningProfile, ConfigurationMissing>,
    ) -> SigningDecision {
        match resolution {
            Ok(profile) => {
                let missing = profile.missing_keys();
                if self.require_signing && !missing.is_empty() {
                    SigningDecision::Blocked(BlockReason::IncompleteProfile(missing))
                } else {
                    SigningDecision::Signed(profile)
                }
            }
            Err(_) if self.allow_unsigned => SigningDecision::Unsigned,
            Err(_) => SigningDecision::Blocked(BlockReason::MissingConfiguration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signing::{MissingReason, Secret};
    use std::path::PathBuf;

    fn complete_profile() -> SigningProfile {
        SigningProfile {
            store_file: Some("app.jks".to_string()),
            store_password: Some(Secret::from("abc")),
            key_alias: Some("release".to_string()),
            key_password: Some(Secret::from("xyz")),
        }
    }

    fn missing() -> ConfigurationMissing {
        ConfigurationMissing {
            path: PathBuf::from("android/key.properties"),
            reason: MissingReason::NotFound,
        }
    }

    #[test]
    fn test_release_defaults() {
        let config = ReleaseBuildConfig::new(None);
        assert!(config.minify_enabled);
        assert!(config.shrink_resources);
        assert!(!config.is_signed());
        assert_eq!(config.compile_options.source_compatibility, JavaVersion::Version11);
        assert_eq!(config.compile_options.jvm_target, "11");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shrink_without_minify_rejected() {
        let mut config = ReleaseBuildConfig::new(Some(complete_profile()));
        config.minify_enabled = false;
        let err = config.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_target_below_source_rejected() {
        let mut config = ReleaseBuildConfig::new(None);
        config.compile_options.source_compatibility = JavaVersion::Version17;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_java_version_serializes_as_string() {
        let json = serde_json::to_string(&CompileOptions::default()).unwrap();
        assert_eq!(
            json,
            r#"{"source_compatibility":"11","target_compatibility":"11","jvm_target":"11"}"#
        );
    }

    #[test]
    fn test_decide_complete_profile_signed() {
        let policy = SigningPolicy {
            require_signing: true,
            allow_unsigned: false,
        };
        assert_eq!(
            policy.decide(Ok(complete_profile())),
            SigningDecision::Signed(complete_profile())
        );
    }

    #[test]
    fn test_decide_incomplete_profile_lenient_by_default() {
        let profile = SigningProfile {
            store_file: Some("app.jks".to_string()),
            ..SigningProfile::default()
        };
        let decision = SigningPolicy::default().decide(Ok(profile.clone()));
        assert_eq!(decision, SigningDecision::Signed(profile));
    }

    #[test]
    fn test_decide_incomplete_profile_blocked_when_required() {
        let profile = SigningProfile {
            store_file: Some("app.jks".to_string()),
            key_alias: Some("release".to_string()),
            ..SigningProfile::default()
        };
        let policy = SigningPolicy {
            require_signing: true,
            allow_unsigned: true,
        };
        assert_eq!(
            policy.decide(Ok(profile)),
            SigningDecision::Blocked(BlockReason::IncompleteProfile(vec![
                "storePassword",
                "keyPassword"
            ]))
        );
    }

    #[test]
    fn test_decide_missing_configuration() {
        assert_eq!(
            SigningPolicy::default().decide(Err(missing())),
            SigningDecision::Blocked(BlockReason::MissingConfiguration)
        );

        let lenient = SigningPolicy {
            require_signing: false,
            allow_unsigned: true,
        };
        assert_eq!(lenient.decide(Err(missing())), SigningDecision::Unsigned);
    }

    #[test]
    fn test_block_reason_errors() {
        let err = BlockReason::MissingConfiguration.to_error();
        assert_eq!(err.code, ErrorCode::UnsignedReleaseBlocked);

        let err = BlockReason::IncompleteProfile(vec!["keyAlias"]).to_error();
        assert_eq!(err.code, ErrorCode::IncompleteSigningConfig);
        assert!(err.message.contains("keyAlias"));
    }

    #[test]
    fn test_policy_from_config() {
        let policy = SigningPolicy::from(SigningConfig {
            require_signing: true,
            allow_unsigned: false,
        });
        assert!(policy.require_signing);
        assert!(!policy.allow_unsigned);
    }
}
