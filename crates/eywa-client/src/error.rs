//! Error taxonomy for the admin client.
//!
//! Transport failures, rejected logins, and unexpected HTTP statuses are
//! kept distinct so callers can report them differently. None of these
//! errors is ever retried: each operation is a single atomic remote call.

use std::io;

use thiserror::Error;

/// Classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Hostname resolution failed.
    Dns,
    /// The remote host actively refused the connection.
    ConnectionRefused,
    /// TLS negotiation or certificate validation failed.
    Tls,
    /// The request or connect deadline elapsed.
    Timeout,
    /// A URL could not be constructed from the supplied parts.
    InvalidUrl,
    /// Any other transport failure.
    Other,
}

/// A failure below the HTTP layer: DNS, connect, TLS, or timeout.
///
/// Never retried. Distinguishable from an unexpected HTTP status, which is
/// surfaced as [`crate::Failure::Http`] instead.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    /// What went wrong, coarsely.
    pub kind: TransportErrorKind,
    /// Human-readable diagnostic, including the source chain.
    pub message: String,
}

impl TransportError {
    /// Builds a transport error with an explicit kind.
    #[must_use]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classifies a `reqwest` error into a [`TransportError`].
    ///
    /// The source chain is flattened into the message so diagnostics keep
    /// the OS-level detail (e.g. "Connection refused").
    #[must_use]
    pub fn from_reqwest(error: &reqwest::Error) -> Self {
        let mut message = error.to_string();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        let lowered = message.to_lowercase();
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if lowered.contains("dns") || lowered.contains("resolve") {
            TransportErrorKind::Dns
        } else if lowered.contains("refused") {
            TransportErrorKind::ConnectionRefused
        } else if lowered.contains("certificate")
            || lowered.contains("tls")
            || lowered.contains("handshake")
        {
            TransportErrorKind::Tls
        } else {
            TransportErrorKind::Other
        };

        Self { kind, message }
    }
}

/// Failure of the one-shot login exchange.
///
/// Fatal to the invocation by design: a CLI must never silently retry
/// against credential failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login request never completed (DNS, connect, TLS, timeout).
    #[error("login transport failure: {0}")]
    Transport(#[from] TransportError),
    /// The server answered, but with a non-200 status or a body that does
    /// not carry a usable `auth_token` field.
    #[error("login rejected (status {status}); check your username and password")]
    Rejected {
        /// HTTP status returned by the login endpoint.
        status: u16,
        /// Raw response body, preserved for diagnostics.
        body: String,
    },
}

/// Validation failure while flattening a dotted-key settings string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The input contained no settings at all.
    #[error("no settings supplied")]
    Empty,
    /// A segment had no `key:value` separator.
    #[error("setting '{segment}' is missing a ':' separator")]
    MissingSeparator {
        /// The offending comma-separated segment.
        segment: String,
    },
    /// A key path contained an empty dotted component.
    #[error("setting '{segment}' has an empty key component")]
    EmptyKey {
        /// The offending comma-separated segment.
        segment: String,
    },
    /// One key path is a strict prefix of another, which would silently
    /// overwrite a nested map with a string (or vice versa).
    #[error("key path '{path}' collides with a nested value under the same prefix")]
    PrefixCollision {
        /// The full dotted key path that collided.
        path: String,
    },
}

/// Failure to load a local connection profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The profile file could not be read.
    #[error("failed to read profile '{path}': {source}")]
    Io {
        /// Path supplied by the caller.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The profile file was not valid JSON or missed required fields.
    #[error("profile '{path}' is not a valid profile: {source}")]
    Parse {
        /// Path supplied by the caller.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The profile named a transport scheme other than http/https.
    #[error("profile '{path}' has unsupported protocol '{value}'")]
    Protocol {
        /// Path supplied by the caller.
        path: String,
        /// The offending protocol value.
        value: String,
    },
}
