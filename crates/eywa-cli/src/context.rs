//! Shared execution context and CLI error types.

use anyhow::anyhow;
use eywa_client::{AdminClient, Failure, Outcome, Payload, RequestDescriptor, Session};

use crate::cli::OutputFormat;

/// Errors surfaced by command handlers.
///
/// Validation errors are caught before any request leaves the process;
/// failures wrap everything the server or the transport rejected. Both
/// map to exit code 1.
#[derive(Debug)]
pub(crate) enum CliError {
    /// Bad or missing input; no request was issued.
    Validation(String),
    /// A request was issued and did not succeed.
    Failure(anyhow::Error),
}

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) fn from_failure(failure: Failure) -> Self {
        match failure {
            Failure::Http(payload) => Self::Failure(anyhow!(
                "request failed with status {}: {}",
                payload.status,
                payload.body
            )),
            Failure::Transport(err) => Self::Failure(anyhow!(err)),
        }
    }

    /// The message shown to the user on stderr.
    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => error.to_string(),
        }
    }
}

pub(crate) type CliResult<T> = Result<T, CliError>;

/// Everything a command handler needs after login.
pub(crate) struct AppContext {
    pub(crate) client: AdminClient,
    pub(crate) session: Session,
    pub(crate) output: OutputFormat,
    pub(crate) assume_yes: bool,
}

impl AppContext {
    /// Executes one descriptor against the session, converting failures
    /// into CLI errors.
    pub(crate) async fn execute(&self, descriptor: RequestDescriptor) -> CliResult<Payload> {
        match self.client.execute(&self.session, descriptor).await {
            Outcome::Success(payload) => Ok(payload),
            Outcome::Failure(failure) => Err(CliError::from_failure(failure)),
        }
    }
}

#[cfg(test)]
mod tests {
    use eywa_client::{TransportError, TransportErrorKind};

    use super::*;

    #[test]
    fn http_failures_keep_status_and_body() {
        let failure = Failure::Http(Payload::new(422, "{\"error\":\"bad channel\"}".to_string()));
        let err = CliError::from_failure(failure);
        let message = err.display_message();
        assert!(message.contains("422"));
        assert!(message.contains("bad channel"));
    }

    #[test]
    fn transport_failures_keep_the_original_message() {
        let failure = Failure::Transport(TransportError::new(
            TransportErrorKind::ConnectionRefused,
            "connection refused".to_string(),
        ));
        assert_eq!(
            CliError::from_failure(failure).display_message(),
            "connection refused"
        );
    }
}
