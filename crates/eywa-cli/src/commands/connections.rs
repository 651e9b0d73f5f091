//! Connection inspection and device messaging commands.

use eywa_client::ops;

use crate::cli::{DeviceArgs, RequestArgs, ScanArgs, SendArgs, StatusArgs};
use crate::context::{AppContext, CliResult};
use crate::output::print_payload;
use crate::resolver::{ParamResolver, require};

/// Resolves the channel/device pair every device-scoped command needs.
pub(crate) fn device_pair(
    args: DeviceArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<(String, String)> {
    let channel_id = require(args.channel_id, "channel id", resolver)?;
    let device_id = require(args.device_id, "device id", resolver)?;
    Ok((channel_id, device_id))
}

pub(crate) async fn handle_counts(ctx: &AppContext) -> CliResult<()> {
    let payload = ctx.execute(ops::connection_counts()).await?;
    print_payload(&payload, ctx.output)
}

pub(crate) async fn handle_status(
    ctx: &AppContext,
    args: StatusArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let (channel_id, device_id) = device_pair(args.device, resolver)?;
    let payload = ctx
        .execute(ops::connection_status(&channel_id, &device_id, args.history))
        .await?;
    print_payload(&payload, ctx.output)
}

pub(crate) async fn handle_scan(
    ctx: &AppContext,
    args: ScanArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let channel_id = require(args.channel_id, "channel id", resolver)?;
    let payload = ctx.execute(ops::scan_connections(&channel_id)).await?;
    print_payload(&payload, ctx.output)
}

pub(crate) async fn handle_send(
    ctx: &AppContext,
    args: SendArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let (channel_id, device_id) = device_pair(args.device, resolver)?;
    let message = require(args.message, "message", resolver)?;
    ctx.execute(ops::send_to_device(&channel_id, &device_id, &message))
        .await?;
    println!("Message sent to device {device_id} on channel {channel_id}.");
    Ok(())
}

pub(crate) async fn handle_request(
    ctx: &AppContext,
    args: RequestArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let (channel_id, device_id) = device_pair(args.device, resolver)?;
    let message = require(args.message, "message", resolver)?;
    let payload = ctx
        .execute(ops::request_from_device(
            &channel_id,
            &device_id,
            &message,
            args.wait.as_deref(),
        ))
        .await?;
    println!("Device replied:");
    print_payload(&payload, ctx.output)
}
