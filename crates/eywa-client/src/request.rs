//! Immutable request descriptors.
//!
//! A descriptor is built once by an operation (see [`crate::ops`]), then
//! consumed exactly once by [`crate::AdminClient::execute`]. Query pairs are
//! serialized in insertion order; the server attaches no meaning to that
//! order, so tests should compare query strings as sets.

use std::time::Duration;

pub use reqwest::Method;
use url::Url;

use crate::error::{TransportError, TransportErrorKind};

/// Request body payload.
#[derive(Debug, Clone)]
pub enum Body {
    /// A structured document serialized as JSON.
    Json(serde_json::Value),
    /// A raw text payload sent verbatim (device messages).
    Text(String),
}

/// One admin API request, described as plain data.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    segments: Vec<String>,
    query: Vec<(String, String)>,
    body: Option<Body>,
    timeout: Option<Duration>,
    accept: Vec<u16>,
}

impl RequestDescriptor {
    /// Creates a descriptor for `method` addressing the given raw path
    /// segments. Segments are percent-escaped when the URL is resolved, so
    /// callers pass them unescaped.
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
            timeout: None,
            accept: vec![200],
        }
    }

    /// GET descriptor.
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    /// POST descriptor.
    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, segments)
    }

    /// PUT descriptor.
    pub fn put<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::PUT, segments)
    }

    /// DELETE descriptor.
    pub fn delete<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::DELETE, segments)
    }

    /// Appends one query pair.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Appends one query pair when the value is present.
    #[must_use]
    pub fn query_opt(mut self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        if let Some(value) = value {
            self.query.push((key.into(), value.into()));
        }
        self
    }

    /// Attaches a JSON body.
    #[must_use]
    pub fn json_body(mut self, value: serde_json::Value) -> Self {
        self.body = Some(Body::Json(value));
        self
    }

    /// Attaches a raw text body.
    #[must_use]
    pub fn text_body(mut self, text: impl Into<String>) -> Self {
        self.body = Some(Body::Text(text.into()));
        self
    }

    /// Overrides the per-request timeout. Without an override the client's
    /// default applies.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the accepted status set. Matching is strict: a creation
    /// accepting only 201 classifies a 200 response as a failure.
    #[must_use]
    pub fn accept<I: IntoIterator<Item = u16>>(mut self, statuses: I) -> Self {
        self.accept = statuses.into_iter().collect();
        self
    }

    /// Whether `status` is in the accepted set.
    #[must_use]
    pub fn accepts(&self, status: u16) -> bool {
        self.accept.contains(&status)
    }

    /// The HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The body payload, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// The per-request timeout override, if any.
    #[must_use]
    pub const fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolves the full URL against a session base, percent-escaping every
    /// path segment and encoding the query string.
    ///
    /// # Errors
    ///
    /// Fails only when the base URL cannot carry path segments, which a
    /// well-formed http(s) base never triggers.
    pub fn resolve(&self, base: &Url) -> Result<Url, TransportError> {
        let mut url = base.clone();
        {
            let mut parts = url.path_segments_mut().map_err(|()| {
                TransportError::new(
                    TransportErrorKind::InvalidUrl,
                    format!("base URL '{base}' cannot carry path segments"),
                )
            })?;
            parts.pop_if_empty();
            for segment in &self.segments {
                parts.push(segment);
            }
        }
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn base() -> Url {
        "http://127.0.0.1:8080".parse().unwrap()
    }

    #[test]
    fn resolve_joins_segments() {
        let url = RequestDescriptor::get(["admin", "channels"])
            .resolve(&base())
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/admin/channels");
    }

    #[test]
    fn resolve_percent_escapes_path_segments() {
        let url = RequestDescriptor::get(["admin", "channels", "weird id/№1"])
            .resolve(&base())
            .unwrap();
        let path = url.path();
        assert!(path.starts_with("/admin/channels/"));
        assert!(!path.contains(' '));
        // An embedded slash must not introduce an extra path segment.
        assert_eq!(url.path_segments().unwrap().count(), 3);
        assert!(path.contains("%20"));
        assert!(path.contains("%2F"));
    }

    #[test]
    fn resolve_query_round_trips_as_a_set() {
        let url = RequestDescriptor::get(["admin", "channels", "c1", "value"])
            .query("field", "temperature")
            .query("time_range", "now-1h:now")
            .query("tags", "room:kitchen, floor:2")
            .resolve(&base())
            .unwrap();

        let parsed: BTreeSet<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        let expected: BTreeSet<(String, String)> = [
            ("field", "temperature"),
            ("time_range", "now-1h:now"),
            ("tags", "room:kitchen, floor:2"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn query_opt_skips_missing_values() {
        let url = RequestDescriptor::get(["admin", "tail"])
            .query_opt("timeout", None::<String>)
            .resolve(&base())
            .unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn default_accept_is_200_only() {
        let descriptor = RequestDescriptor::get(["admin", "channels"]);
        assert!(descriptor.accepts(200));
        assert!(!descriptor.accepts(201));
        assert!(!descriptor.accepts(204));
    }

    #[test]
    fn accept_replaces_the_status_set() {
        let descriptor = RequestDescriptor::post(["admin", "channels"]).accept([201]);
        assert!(descriptor.accepts(201));
        assert!(!descriptor.accepts(200));
    }
}
