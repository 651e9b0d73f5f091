//! Live streaming commands: device attach and the server log tail.
//!
//! Both endpoints are WebSocket upgrades on the admin API; the commands
//! print inbound messages line-by-line until the socket closes.

use anyhow::anyhow;
use eywa_client::{RequestDescriptor, ops};
use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use crate::cli::AttachArgs;
use crate::commands::connections::device_pair;
use crate::context::{AppContext, CliError, CliResult};
use crate::resolver::ParamResolver;

pub(crate) async fn handle_attach(
    ctx: &AppContext,
    args: AttachArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let (channel_id, device_id) = device_pair(args.device, resolver)?;
    eprintln!("Attached to device {device_id} on channel {channel_id}. Interrupt to stop.");
    stream_messages(ctx, ops::attach(&channel_id, &device_id)).await
}

pub(crate) async fn handle_tail(ctx: &AppContext) -> CliResult<()> {
    stream_messages(ctx, ops::tail()).await
}

/// Prints every inbound message until the server closes the socket. No
/// reconnection: a dropped socket ends the command.
async fn stream_messages(ctx: &AppContext, descriptor: RequestDescriptor) -> CliResult<()> {
    let mut socket = ctx
        .client
        .stream(&ctx.session, descriptor)
        .await
        .map_err(CliError::from_failure)?;

    while let Some(message) = socket.next().await {
        let message =
            message.map_err(|err| CliError::failure(anyhow!("failed to read stream: {err}")))?;
        match message {
            Message::Text(text) => {
                for line in text.lines() {
                    if !line.is_empty() {
                        println!("{line}");
                    }
                }
            }
            Message::Binary(bytes) => {
                println!("{}", String::from_utf8_lossy(&bytes));
            }
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
        }
    }
    Ok(())
}
