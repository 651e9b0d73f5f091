//! Response classification.
//!
//! Every executed request produces an [`Outcome`]: either the status was in
//! the descriptor's accepted set, or it was not (or the request never
//! completed). The raw body is always preserved verbatim; the parsed JSON
//! form is an optional extra, never a silent replacement.

use thiserror::Error;

use crate::error::TransportError;

/// An HTTP response body with its status.
///
/// `json` is `Some` only when the raw body parses as a JSON document; a
/// parse failure is non-fatal and leaves `body` untouched.
#[derive(Debug, Clone)]
pub struct Payload {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body, unmodified.
    pub body: String,
    /// Parsed form of the body, when it is valid JSON.
    pub json: Option<serde_json::Value>,
}

impl Payload {
    /// Wraps a status and raw body, attempting a best-effort JSON parse.
    #[must_use]
    pub fn new(status: u16, body: String) -> Self {
        let json = serde_json::from_str(&body).ok();
        Self { status, body, json }
    }
}

/// Why a request did not succeed.
#[derive(Debug, Clone, Error)]
pub enum Failure {
    /// The server answered with a status outside the accepted set. The raw
    /// body is carried for diagnostics against the remote service.
    #[error("request failed with status {}: {}", .0.status, .0.body)]
    Http(Payload),
    /// The request never completed at the transport layer.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Tagged result of one executed request. No partial-success states exist.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The status was in the accepted set.
    Success(Payload),
    /// Anything else.
    Failure(Failure),
}

impl Outcome {
    /// Whether the request succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts into a standard `Result` for `?`-style propagation.
    ///
    /// # Errors
    ///
    /// Returns the carried [`Failure`] when the request did not succeed.
    pub fn into_result(self) -> Result<Payload, Failure> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure(failure) => Err(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_parses_json_bodies() {
        let payload = Payload::new(200, r#"{"id":"c1"}"#.to_string());
        assert_eq!(payload.status, 200);
        assert_eq!(payload.json.unwrap()["id"], "c1");
    }

    #[test]
    fn payload_keeps_non_json_bodies_raw() {
        let payload = Payload::new(200, "plain text".to_string());
        assert!(payload.json.is_none());
        assert_eq!(payload.body, "plain text");
    }

    #[test]
    fn into_result_propagates_failures() {
        let outcome = Outcome::Failure(Failure::Http(Payload::new(404, "missing".to_string())));
        let err = outcome.into_result().unwrap_err();
        assert!(matches!(err, Failure::Http(payload) if payload.status == 404));
    }
}
