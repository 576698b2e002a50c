//! Release signing configuration
//!
//! Resolves the signing profile for a release build from `key.properties`:
//!
//! ```text
//! storeFile=upload-keystore.jks
//! storePassword=...
//! keyAlias=upload
//! keyPassword=...
//! ```
//!
//! Resolution is lenient on purpose: keys that are absent from the file stay
//! `None` and the signer reports them later. Use
//! [`SigningProfile::missing_keys`] or a [`crate::build_config::SigningPolicy`]
//! to enforce completeness.

use releasekit_core::error;
use releasekit_core::properties::Properties;
use serde::{Serialize, Serializer};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::Zeroizing;

/// Keystore path key
pub const STORE_FILE: &str = "storeFile";
/// Keystore password key
pub const STORE_PASSWORD: &str = "storePassword";
/// Key entry alias key
pub const KEY_ALIAS: &str = "keyAlias";
/// Key entry password key
pub const KEY_PASSWORD: &str = "keyPassword";

/// Every key a complete signing profile needs, in file order
pub const SIGNING_KEYS: [&str; 4] = [STORE_FILE, STORE_PASSWORD, KEY_ALIAS, KEY_PASSWORD];

const REDACTED: &str = "********";

/// A password held in memory that is wiped on drop and never printed
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    /// Wrap a secret value
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the plain value, for handing to the signer
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Whether the secret is the empty string
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(")?;
        f.write_str(REDACTED)?;
        f.write_str(")")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_empty() { "" } else { REDACTED })
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Credentials needed to sign a release artifact.
///
/// A field is `None` when its key is absent from the properties file and
/// `Some("")` when the key is present with an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningProfile {
    /// Keystore path, relative to the app module directory
    pub store_file: Option<String>,
    /// Keystore password
    pub store_password: Option<Secret>,
    /// Alias of the key entry inside the keystore
    pub key_alias: Option<String>,
    /// Key entry password
    pub key_password: Option<Secret>,
}

impl SigningProfile {
    /// Map the signing keys of a parsed properties file onto a profile.
    /// Values are copied verbatim; nothing is validated.
    pub fn from_properties(props: &Properties) -> Self {
        let text = |key: &str| props.get(key).map(str::to_string);
        let secret = |key: &str| props.get(key).map(Secret::from);

        Self {
            store_file: text(STORE_FILE),
            store_password: secret(STORE_PASSWORD),
            key_alias: text(KEY_ALIAS),
            key_password: secret(KEY_PASSWORD),
        }
    }

    /// Keystore location as the app module sees it.
    ///
    /// `key.properties` sits in the Android root, but `storeFile` is
    /// resolved against the app module (`android/app/`). Absolute paths are
    /// returned unchanged.
    pub fn keystore_path(&self, app_dir: &Path) -> Option<PathBuf> {
        self.store_file
            .as_deref()
            .filter(|file| !file.is_empty())
            .map(|file| app_dir.join(file))
    }

    /// Signing keys that are absent or empty
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let present = [
            self.store_file.as_ref().is_some_and(|v| !v.is_empty()),
            self.store_password.as_ref().is_some_and(|v| !v.is_empty()),
            self.key_alias.as_ref().is_some_and(|v| !v.is_empty()),
            self.key_password.as_ref().is_some_and(|v| !v.is_empty()),
        ];

        SIGNING_KEYS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Whether every signing key has a non-empty value
    pub fn is_complete(&self) -> bool {
        self.missing_keys().is_empty()
    }
}

/// Why the signing properties could not be used
#[derive(Debug, Error)]
pub enum MissingReason {
    /// Nothing exists at the path
    #[error("file does not exist")]
    NotFound,
    /// The path exists but could not be opened or read
    #[error("file could not be read: {0}")]
    Unreadable(#[source] io::Error),
}

/// The signing properties file is absent or unreadable.
///
/// Not fatal by itself: the caller decides whether the release build
/// continues unsigned or stops.
#[derive(Debug, Error)]
#[error("signing properties unavailable at {}: {reason}", .path.display())]
pub struct ConfigurationMissing {
    /// Path that was tried
    pub path: PathBuf,
    /// What went wrong
    #[source]
    pub reason: MissingReason,
}

impl ConfigurationMissing {
    /// Whether the file simply does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self.reason, MissingReason::NotFound)
    }

    /// File name of the path that was tried, or the whole path if it has none
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// One-line diagnostic such as `key.properties file not found`
    pub fn summary(&self) -> String {
        match self.reason {
            MissingReason::NotFound => format!("{} file not found", self.file_name()),
            MissingReason::Unreadable(_) => format!("{} file could not be read", self.file_name()),
        }
    }
}

impl From<ConfigurationMissing> for error::Error {
    fn from(err: ConfigurationMissing) -> Self {
        let mut core = error::Error::signing_config_missing(&err.path);
        if !err.is_not_found() {
            core.message = format!("Signing properties could not be read: {}", err.path.display());
        }
        core.with_source(err)
    }
}

/// Resolve the signing profile stored at `path`.
///
/// The file is opened and read in a single attempt. A missing or unreadable
/// file yields [`ConfigurationMissing`] and logs an error; any readable file,
/// including an empty one, yields a profile.
pub fn resolve(path: &Path) -> Result<SigningProfile, ConfigurationMissing> {
    match Properties::load(path) {
        Ok(props) => {
            let profile = SigningProfile::from_properties(&props);
            tracing::debug!(
                path = %path.display(),
                missing = ?profile.missing_keys(),
                "resolved signing profile"
            );
            Ok(profile)
        }
        Err(err) => {
            let reason = if err.kind() == io::ErrorKind::NotFound {
                MissingReason::NotFound
            } else {
                MissingReason::Unreadable(err)
            };
            let missing = ConfigurationMissing {
                path: path.to_path_buf(),
                reason,
            };
            tracing::error!(
                path = %path.display(),
                reason = %missing.reason,
                "{}",
                missing.summary()
            );
            Err(missing)
        }
    }
}
