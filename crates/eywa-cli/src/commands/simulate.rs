//! Synthetic device telemetry over the device ingress.
//!
//! The simulator never logs in: the channel access token authorizes the
//! push endpoint directly. Devices are visited one at a time and each
//! reading is pushed before the next is generated; the interval sleep is
//! the only pacing.

use std::time::Duration;

use anyhow::anyhow;
use eywa_client::ConnectOptions;
use rand::Rng;
use serde_json::json;

use crate::cli::SimulateArgs;
use crate::context::{CliError, CliResult};

/// Header carrying the channel access token on device requests.
const HEADER_ACCESS_TOKEN: &str = "AccessToken";

pub(crate) async fn handle_simulate(
    options: &ConnectOptions,
    args: &SimulateArgs,
) -> CliResult<()> {
    let mut base = options.base_url().map_err(CliError::failure)?;
    if let Some(port) = args.device_port {
        base.set_port(Some(port))
            .map_err(|()| CliError::validation("device port cannot be applied to this URL"))?;
    }

    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("eywa-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(options.timeout);
    if options.insecure {
        builder = builder.danger_accept_invalid_certs(true);
    }
    let client = builder
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

    for device in 0..args.devices {
        let device_id = format!("{}-{device:04}", args.device_prefix);
        let url = push_url(&base, &args.channel_id, &device_id)?;
        for seq in 0..args.messages {
            let reading = synthetic_reading(seq);
            let response = client
                .post(url.clone())
                .header(HEADER_ACCESS_TOKEN, &args.access_token)
                .body(reading.to_string())
                .send()
                .await
                .map_err(|err| CliError::failure(anyhow!("push to {device_id} failed: {err}")))?;
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                return Err(CliError::failure(anyhow!(
                    "push to {device_id} rejected with status {status}: {body}"
                )));
            }
            tracing::debug!(device = %device_id, seq, "reading pushed");
            if args.interval_ms > 0 {
                tokio::time::sleep(Duration::from_millis(args.interval_ms)).await;
            }
        }
        println!("device {device_id}: {} readings pushed", args.messages);
    }
    Ok(())
}

fn push_url(
    base: &reqwest::Url,
    channel_id: &str,
    device_id: &str,
) -> CliResult<reqwest::Url> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| CliError::validation("server address cannot carry a path"))?;
        segments.pop_if_empty();
        segments.extend(["channels", channel_id, "devices", device_id, "push"]);
    }
    Ok(url)
}

/// One fake sensor reading. The sequence number makes readings easy to
/// correlate when tailing the channel.
fn synthetic_reading(seq: u32) -> serde_json::Value {
    let mut rng = rand::rng();
    json!({
        "seq": seq,
        "temperature": (rng.random_range(-10.0..40.0_f64) * 100.0).round() / 100.0,
        "humidity": (rng.random_range(0.0..100.0_f64) * 100.0).round() / 100.0,
    })
}
