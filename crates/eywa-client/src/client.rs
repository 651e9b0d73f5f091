//! Session lifecycle and the single execution path per transport.
//!
//! `login` performs the one-shot basic-auth exchange against
//! `/admin/login`; `execute` issues exactly one authenticated request per
//! descriptor; `stream` upgrades the live endpoints to a WebSocket.
//! Nothing here ever retries, and nothing terminates the process: all
//! three surface structured failures and leave policy to the caller.

use std::io::ErrorKind;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Client;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::error::{AuthError, TransportError, TransportErrorKind};
use crate::outcome::{Failure, Outcome, Payload};
use crate::request::{Body, RequestDescriptor};

/// Header carrying the session token on every post-login request.
pub const HEADER_AUTH: &str = "Authentication";

/// A connected admin WebSocket, as returned by [`AdminClient::stream`].
pub type AdminSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const LOGIN_PATH: &str = "admin/login";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport scheme for the admin endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Plain HTTP.
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

impl Scheme {
    /// The URL scheme string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl FromStr for Scheme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(format!("unsupported scheme '{other}'")),
        }
    }
}

/// Connection parameters for one target server.
///
/// The client is agnostic to where these come from: CLI flags, environment
/// variables, or a local JSON profile all funnel into this one value.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// http or https.
    pub scheme: Scheme,
    /// Server hostname or address.
    pub host: String,
    /// Admin API port.
    pub port: u16,
    /// Admin username for the login exchange.
    pub username: String,
    /// Admin password for the login exchange.
    pub password: String,
    /// Skip TLS certificate verification.
    pub insecure: bool,
    /// Default per-request timeout.
    pub timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            scheme: Scheme::Http,
            host: "127.0.0.1".to_string(),
            port: 8080,
            username: String::new(),
            password: String::new(),
            insecure: false,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ConnectOptions {
    /// Builds the base URL `{scheme}://{host}:{port}/`.
    ///
    /// # Errors
    ///
    /// Returns a transport error when host and port do not form a valid
    /// URL.
    pub fn base_url(&self) -> Result<Url, TransportError> {
        let raw = format!("{}://{}:{}/", self.scheme.as_str(), self.host, self.port);
        raw.parse().map_err(|err| {
            TransportError::new(
                TransportErrorKind::InvalidUrl,
                format!("invalid server address '{raw}': {err}"),
            )
        })
    }
}

/// An authenticated session against one server.
///
/// Created by [`AdminClient::login`], held for the process lifetime, never
/// persisted. Every descriptor executed afterwards carries this session's
/// token.
#[derive(Debug, Clone)]
pub struct Session {
    base: Url,
    token: String,
}

impl Session {
    /// Assembles a session from parts. Normally produced by `login`; public
    /// for tests and embedders that obtain a token elsewhere.
    #[must_use]
    pub const fn new(base: Url, token: String) -> Self {
        Self { base, token }
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// The auth token returned by login.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// The admin API client. Owns the underlying HTTP connection pool.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    default_timeout: Duration,
}

impl AdminClient {
    /// Builds a client from connection options.
    ///
    /// The underlying pool carries a connect timeout only; the full-request
    /// deadline is applied per call so streaming endpoints can stay open
    /// indefinitely.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the TLS backend cannot be
    /// initialized.
    pub fn new(options: &ConnectOptions) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .user_agent(concat!("eywa-cli/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT);
        if options.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().map_err(|err| {
            TransportError::new(
                TransportErrorKind::Other,
                format!("failed to build HTTP client: {err}"),
            )
        })?;
        Ok(Self {
            http,
            default_timeout: options.timeout,
        })
    }

    /// Performs the one-shot login exchange: GET `/admin/login` with HTTP
    /// basic credentials, expecting a 200 body carrying `auth_token`.
    ///
    /// # Errors
    ///
    /// [`AuthError::Transport`] when the request never completes;
    /// [`AuthError::Rejected`] on any non-200 status or a body without a
    /// usable token. Never retried.
    pub async fn login(&self, options: &ConnectOptions) -> Result<Session, AuthError> {
        let base = options.base_url()?;
        let url = base.join(LOGIN_PATH).map_err(|err| {
            TransportError::new(
                TransportErrorKind::InvalidUrl,
                format!("invalid base URL '{base}': {err}"),
            )
        })?;

        tracing::debug!(url = %url, username = %options.username, "logging in");
        let response = self
            .http
            .get(url)
            .basic_auth(&options.username, Some(&options.password))
            .timeout(self.default_timeout)
            .send()
            .await
            .map_err(|err| AuthError::Transport(TransportError::from_reqwest(&err)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| AuthError::Transport(TransportError::from_reqwest(&err)))?;

        if status != 200 {
            return Err(AuthError::Rejected { status, body });
        }

        let token = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("auth_token")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string)
            })
            .filter(|token| !token.is_empty());

        token.map_or_else(
            || Err(AuthError::Rejected { status, body }),
            |token| Ok(Session::new(base, token)),
        )
    }

    /// Issues one authenticated request and classifies the response.
    ///
    /// The descriptor is consumed: it is never reused after the session it
    /// was built against is torn down. A status inside the descriptor's
    /// accepted set yields `Success`; any other status yields
    /// `Failure::Http` with the body preserved verbatim; a transport
    /// failure yields `Failure::Transport`. Exactly one call is issued.
    pub async fn execute(&self, session: &Session, descriptor: RequestDescriptor) -> Outcome {
        let url = match descriptor.resolve(session.base()) {
            Ok(url) => url,
            Err(err) => return Outcome::Failure(Failure::Transport(err)),
        };
        tracing::debug!(method = %descriptor.method(), url = %url, "issuing admin request");

        let mut builder = self
            .http
            .request(descriptor.method().clone(), url)
            .header(HEADER_AUTH, session.token())
            .timeout(descriptor.timeout_override().unwrap_or(self.default_timeout));
        builder = match descriptor.body() {
            Some(Body::Json(value)) => builder.json(value),
            Some(Body::Text(text)) => builder.body(text.clone()),
            None => builder,
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                return Outcome::Failure(Failure::Transport(TransportError::from_reqwest(&err)));
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                return Outcome::Failure(Failure::Transport(TransportError::from_reqwest(&err)));
            }
        };

        let payload = Payload::new(status, body);
        if descriptor.accepts(status) {
            Outcome::Success(payload)
        } else {
            Outcome::Failure(Failure::Http(payload))
        }
    }

    /// Opens a WebSocket against a live endpoint (attach, tail). The
    /// server upgrades these routes, so the session token travels on the
    /// upgrade request itself.
    ///
    /// The handshake is bounded by the default timeout; the open socket
    /// carries no deadline and stays up until either side closes it.
    ///
    /// # Errors
    ///
    /// A handshake the server answers with a plain HTTP status surfaces
    /// as [`Failure::Http`] with the body preserved; anything below that
    /// is [`Failure::Transport`].
    pub async fn stream(
        &self,
        session: &Session,
        descriptor: RequestDescriptor,
    ) -> Result<AdminSocket, Failure> {
        let mut url = descriptor.resolve(session.base()).map_err(Failure::Transport)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme).map_err(|()| {
            Failure::Transport(TransportError::new(
                TransportErrorKind::InvalidUrl,
                format!("cannot derive a websocket URL from '{url}'"),
            ))
        })?;

        let mut request = url.as_str().into_client_request().map_err(ws_failure)?;
        let token = HeaderValue::from_str(session.token()).map_err(|err| {
            Failure::Transport(TransportError::new(
                TransportErrorKind::Other,
                format!("session token is not a valid header value: {err}"),
            ))
        })?;
        request.headers_mut().insert(HEADER_AUTH, token);

        tracing::debug!(url = %url, "opening websocket");
        let (socket, _response) = tokio::time::timeout(self.default_timeout, connect_async(request))
            .await
            .map_err(|_elapsed| {
                Failure::Transport(TransportError::new(
                    TransportErrorKind::Timeout,
                    format!(
                        "websocket handshake timed out after {:?}",
                        self.default_timeout
                    ),
                ))
            })?
            .map_err(ws_failure)?;
        Ok(socket)
    }
}

/// Maps a handshake error to the shared failure taxonomy. A non-upgrade
/// HTTP answer keeps its status and body; everything else is transport.
fn ws_failure(error: WsError) -> Failure {
    match error {
        WsError::Http(response) => {
            let status = response.status().as_u16();
            let body = response
                .into_body()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            Failure::Http(Payload::new(status, body))
        }
        WsError::Io(err) => {
            let message = format!("websocket connect failed: {err}");
            let kind = match err.kind() {
                ErrorKind::ConnectionRefused => TransportErrorKind::ConnectionRefused,
                ErrorKind::TimedOut => TransportErrorKind::Timeout,
                _ if message.contains("lookup") || message.contains("resolve") => {
                    TransportErrorKind::Dns
                }
                _ => TransportErrorKind::Other,
            };
            Failure::Transport(TransportError::new(kind, message))
        }
        WsError::Tls(err) => Failure::Transport(TransportError::new(
            TransportErrorKind::Tls,
            format!("websocket TLS failure: {err}"),
        )),
        other => Failure::Transport(TransportError::new(
            TransportErrorKind::Other,
            format!("websocket failure: {other}"),
        )),
    }
}
