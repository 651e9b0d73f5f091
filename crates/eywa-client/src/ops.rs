//! Pure request builders for the admin API surface.
//!
//! One function per admin operation. Each returns an immutable
//! [`RequestDescriptor`]; nothing here touches the network, so every
//! builder is trivially testable.
//!
//! Paths follow the server's router: `/admin/{resource}[/{id}[/{sub}]]`.

use std::time::Duration;

use serde_json::Value;

use crate::request::RequestDescriptor;

/// Timeout override for scans and time-series queries, which the server
/// may take minutes to answer.
const LONG_QUERY_TIMEOUT: Duration = Duration::from_secs(3600);

/// GET `/admin/channels`.
#[must_use]
pub fn list_channels() -> RequestDescriptor {
    RequestDescriptor::get(["admin", "channels"])
}

/// GET `/admin/channels/{id}`.
#[must_use]
pub fn show_channel(channel_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(["admin", "channels", channel_id])
}

/// POST `/admin/channels`. Creation succeeds only with 201.
#[must_use]
pub fn create_channel(definition: Value) -> RequestDescriptor {
    RequestDescriptor::post(["admin", "channels"])
        .json_body(definition)
        .accept([201])
}

/// PUT `/admin/channels/{id}`.
#[must_use]
pub fn update_channel(channel_id: &str, definition: Value) -> RequestDescriptor {
    RequestDescriptor::put(["admin", "channels", channel_id]).json_body(definition)
}

/// DELETE `/admin/channels/{id}?with_indices=`.
#[must_use]
pub fn delete_channel(channel_id: &str, with_indices: bool) -> RequestDescriptor {
    RequestDescriptor::delete(["admin", "channels", channel_id])
        .query("with_indices", with_indices.to_string())
        .accept([200, 204])
}

/// GET `/admin/connections/counts`.
#[must_use]
pub fn connection_counts() -> RequestDescriptor {
    RequestDescriptor::get(["admin", "connections", "counts"])
}

/// GET `/admin/channels/{ch}/devices/{dev}/status?history=`.
#[must_use]
pub fn connection_status(channel_id: &str, device_id: &str, history: bool) -> RequestDescriptor {
    RequestDescriptor::get(["admin", "channels", channel_id, "devices", device_id, "status"])
        .query("history", history.to_string())
}

/// GET `/admin/channels/{ch}/connections/scan`. Long-running on busy
/// channels, so the default timeout is overridden.
#[must_use]
pub fn scan_connections(channel_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(["admin", "channels", channel_id, "connections", "scan"])
        .timeout(LONG_QUERY_TIMEOUT)
}

/// POST `/admin/channels/{ch}/devices/{dev}/send` with a raw text body.
#[must_use]
pub fn send_to_device(channel_id: &str, device_id: &str, message: &str) -> RequestDescriptor {
    RequestDescriptor::post(["admin", "channels", channel_id, "devices", device_id, "send"])
        .text_body(message)
}

/// POST `/admin/channels/{ch}/devices/{dev}/request` with a raw text body.
/// `timeout` is forwarded verbatim (e.g. `"5s"`); the server parses it.
#[must_use]
pub fn request_from_device(
    channel_id: &str,
    device_id: &str,
    message: &str,
    timeout: Option<&str>,
) -> RequestDescriptor {
    RequestDescriptor::post(["admin", "channels", channel_id, "devices", device_id, "request"])
        .query_opt("timeout", timeout)
        .text_body(message)
}

/// GET `/admin/configs`.
#[must_use]
pub fn show_settings() -> RequestDescriptor {
    RequestDescriptor::get(["admin", "configs"])
}

/// PUT `/admin/configs` with the nested document produced by
/// [`crate::flatten_settings`].
#[must_use]
pub fn update_settings(updates: Value) -> RequestDescriptor {
    RequestDescriptor::put(["admin", "configs"]).json_body(updates)
}

/// Query parameters shared by the time-series endpoints. Unset fields are
/// omitted from the query string.
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    /// Channel field to aggregate over.
    pub field: Option<String>,
    /// Comma-separated `tag:value` filters.
    pub tags: Option<String>,
    /// Aggregation kind (`avg`, `max`, ...); the server calls it
    /// `summary_type`.
    pub summary_type: Option<String>,
    /// Time range expression, forwarded verbatim.
    pub time_range: Option<String>,
    /// Bucket width for series queries, forwarded verbatim.
    pub time_interval: Option<String>,
    /// When set, raw queries run in no-op mode and only report what they
    /// would scan.
    pub nop: Option<bool>,
}

impl QuerySpec {
    fn apply(&self, descriptor: RequestDescriptor) -> RequestDescriptor {
        descriptor
            .query_opt("field", self.field.clone())
            .query_opt("tags", self.tags.clone())
            .query_opt("summary_type", self.summary_type.clone())
            .query_opt("time_range", self.time_range.clone())
            .query_opt("time_interval", self.time_interval.clone())
            .query_opt("nop", self.nop.map(|nop| nop.to_string()))
    }
}

/// GET `/admin/channels/{id}/value`.
#[must_use]
pub fn query_value(channel_id: &str, spec: &QuerySpec) -> RequestDescriptor {
    spec.apply(
        RequestDescriptor::get(["admin", "channels", channel_id, "value"])
            .timeout(LONG_QUERY_TIMEOUT),
    )
}

/// GET `/admin/channels/{id}/series`.
#[must_use]
pub fn query_series(channel_id: &str, spec: &QuerySpec) -> RequestDescriptor {
    spec.apply(
        RequestDescriptor::get(["admin", "channels", channel_id, "series"])
            .timeout(LONG_QUERY_TIMEOUT),
    )
}

/// GET `/admin/channels/{id}/raw`.
#[must_use]
pub fn query_raw(channel_id: &str, spec: &QuerySpec) -> RequestDescriptor {
    spec.apply(
        RequestDescriptor::get(["admin", "channels", channel_id, "raw"])
            .timeout(LONG_QUERY_TIMEOUT),
    )
}

/// `/admin/channels/{ch}/devices/{dev}/attach`. The server upgrades this
/// route to a WebSocket.
#[must_use]
pub fn attach(channel_id: &str, device_id: &str) -> RequestDescriptor {
    RequestDescriptor::get(["admin", "channels", channel_id, "devices", device_id, "attach"])
}

/// `/admin/tail`. The server upgrades this route to a WebSocket carrying
/// its log lines.
#[must_use]
pub fn tail() -> RequestDescriptor {
    RequestDescriptor::get(["admin", "tail"])
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;
    use url::Url;

    use super::*;
    use crate::request::Method;

    fn base() -> Url {
        "http://eywa.local:9090".parse().unwrap()
    }

    #[test]
    fn channel_paths_follow_the_admin_router() {
        let url = show_channel("ch-1").resolve(&base()).unwrap();
        assert_eq!(url.path(), "/admin/channels/ch-1");

        let url = delete_channel("ch-1", true).resolve(&base()).unwrap();
        assert_eq!(url.path(), "/admin/channels/ch-1");
        assert_eq!(url.query(), Some("with_indices=true"));
    }

    #[test]
    fn create_channel_requires_201() {
        let descriptor = create_channel(json!({"name": "greenhouse"}));
        assert_eq!(descriptor.method(), &Method::POST);
        assert!(descriptor.accepts(201));
        assert!(!descriptor.accepts(200));
    }

    #[test]
    fn delete_accepts_200_and_204() {
        let descriptor = delete_channel("ch-1", false);
        assert!(descriptor.accepts(200));
        assert!(descriptor.accepts(204));
        assert!(!descriptor.accepts(201));
    }

    #[test]
    fn device_paths_nest_under_channels() {
        let url = connection_status("ch-1", "dev 9", true)
            .resolve(&base())
            .unwrap();
        assert_eq!(url.path(), "/admin/channels/ch-1/devices/dev%209/status");
        assert_eq!(url.query(), Some("history=true"));

        let url = send_to_device("ch-1", "dev-9", "ping")
            .resolve(&base())
            .unwrap();
        assert_eq!(url.path(), "/admin/channels/ch-1/devices/dev-9/send");
    }

    #[test]
    fn request_timeout_is_forwarded_verbatim() {
        let url = request_from_device("ch-1", "dev-9", "ping", Some("5s"))
            .resolve(&base())
            .unwrap();
        assert_eq!(url.query(), Some("timeout=5s"));

        let url = request_from_device("ch-1", "dev-9", "ping", None)
            .resolve(&base())
            .unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn query_spec_omits_unset_fields() {
        let spec = QuerySpec {
            field: Some("temperature".to_string()),
            summary_type: Some("avg".to_string()),
            time_range: Some("now-1h:now".to_string()),
            ..QuerySpec::default()
        };
        let url = query_value("ch-1", &spec).resolve(&base()).unwrap();
        assert_eq!(url.path(), "/admin/channels/ch-1/value");

        let keys: BTreeSet<String> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        let expected: BTreeSet<String> = ["field", "summary_type", "time_range"]
            .into_iter()
            .map(str::to_string)
            .collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn raw_query_carries_the_nop_flag() {
        let spec = QuerySpec {
            time_range: Some("now-1d:now".to_string()),
            nop: Some(true),
            ..QuerySpec::default()
        };
        let url = query_raw("ch-1", &spec).resolve(&base()).unwrap();
        assert_eq!(url.path(), "/admin/channels/ch-1/raw");
        assert!(url.query_pairs().any(|(k, v)| k == "nop" && v == "true"));
    }

    #[test]
    fn streaming_paths() {
        let url = attach("ch-1", "dev-9").resolve(&base()).unwrap();
        assert_eq!(url.path(), "/admin/channels/ch-1/devices/dev-9/attach");

        let url = tail().resolve(&base()).unwrap();
        assert_eq!(url.path(), "/admin/tail");
    }
}
