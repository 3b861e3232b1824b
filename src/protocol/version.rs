//! Protocol version handshake.
//!
//! The first message the server sends carries a version token of the form
//! `!!ver:<major>.<minor>[.<patch>]`. Only major and minor take part in
//! the compatibility check; the patch component is ignored.

// ============================================================================
// Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Protocol version spoken by this agent.
pub const DEFAULT_API_VERSION: &str = "1.6";

/// Matches the version token inside the handshake message.
static VERSION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!!ver:([\d.]+)").expect("version token pattern is valid"));

const UPDATE_TOOL_HINT: &str = "Please run the following command to update your command-line tool:\n    gem update livereload";

// ============================================================================
// ProtocolVersion
// ============================================================================

/// A `major.minor[.patch]` protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolVersion {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component, if present. Ignored for compatibility.
    pub patch: Option<u32>,
}

impl ProtocolVersion {
    /// Creates a version without a patch component.
    #[inline]
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: None,
        }
    }

    /// Compares major and minor only.
    #[inline]
    #[must_use]
    pub fn compare_compat(&self, other: &Self) -> Ordering {
        (self.major, self.minor).cmp(&(other.major, other.minor))
    }

    /// Returns `true` if both sides speak the same major.minor.
    #[inline]
    #[must_use]
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.compare_compat(other) == Ordering::Equal
    }
}

impl FromStr for ProtocolVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::config(format!("invalid protocol version: {s:?}"));
        let mut parts = s.split('.');

        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let patch = parts.next().and_then(|p| p.parse().ok());

        Ok(Self {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

// ============================================================================
// Token Parsing
// ============================================================================

/// Returns the raw version token in `data`, if any.
///
/// `"!!ver:1.6.2 extra"` yields `Some("1.6.2")`.
#[must_use]
pub fn find_version_token(data: &str) -> Option<&str> {
    VERSION_TOKEN
        .captures(data)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

// ============================================================================
// VersionCheck
// ============================================================================

/// Outcome of validating the server's handshake message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    /// Same major.minor on both sides.
    Compatible,
    /// Server is newer; the command-line tool must be updated.
    ServerNewer {
        /// Client version.
        client: String,
        /// Raw server token.
        server: String,
    },
    /// Client is newer; the browser extension must be updated.
    ClientNewer {
        /// Client version.
        client: String,
        /// Raw server token.
        server: String,
    },
    /// No usable version token: a pre-handshake server.
    Legacy,
}

impl VersionCheck {
    /// Returns `true` if reload traffic may be trusted.
    #[inline]
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        matches!(self, Self::Compatible)
    }

    /// Returns the text shown to the user, or `None` when compatible.
    #[must_use]
    pub fn alert_message(&self) -> Option<String> {
        match self {
            Self::Compatible => None,
            Self::ServerNewer { client, server } => Some(format!(
                "You need to update the command-line tool to continue using LiveReload.\n\n\
                 Extension version: {client}\n\
                 Command-line tool version: {server}\n\n\
                 {UPDATE_TOOL_HINT}"
            )),
            Self::ClientNewer { client, server } => Some(format!(
                "You need to update the browser extension to continue using LiveReload.\n\n\
                 Extension version: {client}\n\
                 Command-line tool version: {server}\n\n\
                 Please go to the extensions manager and check for updates."
            )),
            Self::Legacy => Some(format!(
                "You are using an old incompatible version of the command-line tool.\n\n\
                 {UPDATE_TOOL_HINT}"
            )),
        }
    }

    /// Converts an incompatible outcome into an [`Error::VersionMismatch`].
    #[must_use]
    pub fn to_error(&self, client: &ProtocolVersion) -> Option<Error> {
        match self {
            Self::Compatible => None,
            Self::ServerNewer { server, .. } | Self::ClientNewer { server, .. } => Some(
                Error::version_mismatch(client.to_string(), Some(server.clone())),
            ),
            Self::Legacy => Some(Error::version_mismatch(client.to_string(), None)),
        }
    }
}

/// Validates the server's first message against the client version.
///
/// A token that matches the pattern but does not parse as major.minor
/// (for example `!!ver:1`) is treated as [`VersionCheck::Legacy`].
#[must_use]
pub fn check_version(client: &ProtocolVersion, data: &str) -> VersionCheck {
    let Some(token) = find_version_token(data) else {
        return VersionCheck::Legacy;
    };
    let Ok(server) = token.parse::<ProtocolVersion>() else {
        return VersionCheck::Legacy;
    };

    match server.compare_compat(client) {
        Ordering::Equal => VersionCheck::Compatible,
        Ordering::Greater => VersionCheck::ServerNewer {
            client: client.to_string(),
            server: token.to_string(),
        },
        Ordering::Less => VersionCheck::ClientNewer {
            client: client.to_string(),
            server: token.to_string(),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ProtocolVersion {
        DEFAULT_API_VERSION.parse().expect("default version parses")
    }

    #[test]
    fn test_parse_version() {
        let v: ProtocolVersion = "1.6".parse().expect("parse");
        assert_eq!(v, ProtocolVersion::new(1, 6));

        let v: ProtocolVersion = "2.10.3".parse().expect("parse");
        assert_eq!((v.major, v.minor, v.patch), (2, 10, Some(3)));
        assert_eq!(v.to_string(), "2.10.3");
    }

    #[test]
    fn test_parse_invalid_version() {
        assert!("1".parse::<ProtocolVersion>().is_err());
        assert!("1..6".parse::<ProtocolVersion>().is_err());
        assert!("".parse::<ProtocolVersion>().is_err());
    }

    #[test]
    fn test_minor_compared_numerically() {
        let newer: ProtocolVersion = "1.10".parse().expect("parse");
        assert_eq!(newer.compare_compat(&client()), Ordering::Greater);
    }

    #[test]
    fn test_find_version_token() {
        assert_eq!(find_version_token("!!ver:1.6"), Some("1.6"));
        assert_eq!(find_version_token("hello !!ver:1.6.2 world"), Some("1.6.2"));
        assert_eq!(find_version_token("reload.css"), None);
    }

    #[test]
    fn test_check_equal() {
        assert_eq!(check_version(&client(), "!!ver:1.6"), VersionCheck::Compatible);
    }

    #[test]
    fn test_check_patch_ignored() {
        assert_eq!(check_version(&client(), "!!ver:1.6.3"), VersionCheck::Compatible);
    }

    #[test]
    fn test_check_server_newer() {
        let check = check_version(&client(), "!!ver:1.7");
        assert_eq!(
            check,
            VersionCheck::ServerNewer {
                client: "1.6".into(),
                server: "1.7".into(),
            }
        );

        let message = check.alert_message().expect("alert");
        assert!(message.contains("update the command-line tool"));
        assert!(message.contains("Extension version: 1.6"));
        assert!(message.contains("Command-line tool version: 1.7"));
    }

    #[test]
    fn test_check_client_newer() {
        let check = check_version(&client(), "!!ver:1.5.3");
        assert!(matches!(check, VersionCheck::ClientNewer { .. }));

        let message = check.alert_message().expect("alert");
        assert!(message.contains("update the browser extension"));
        assert!(message.contains("Command-line tool version: 1.5.3"));
    }

    #[test]
    fn test_check_legacy() {
        let check = check_version(&client(), "reload.css");
        assert_eq!(check, VersionCheck::Legacy);
        assert!(
            check
                .alert_message()
                .expect("alert")
                .contains("old incompatible version")
        );
    }

    #[test]
    fn test_check_unparseable_token_is_legacy() {
        assert_eq!(check_version(&client(), "!!ver:1"), VersionCheck::Legacy);
    }

    #[test]
    fn test_to_error() {
        assert!(VersionCheck::Compatible.to_error(&client()).is_none());

        let err = VersionCheck::Legacy.to_error(&client()).expect("error");
        assert!(matches!(err, Error::VersionMismatch { server: None, .. }));
    }
}
