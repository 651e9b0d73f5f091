//! Time-series query commands.

use eywa_client::ops::{self, QuerySpec};

use crate::cli::{QueryArgs, RawQueryArgs};
use crate::context::{AppContext, CliResult};
use crate::output::print_payload;
use crate::resolver::{ParamResolver, require};

/// Trims whitespace around each comma-separated `tag:value` entry so the
/// server sees a canonical filter string.
fn normalize_tags(tags: Option<String>) -> Option<String> {
    tags.map(|tags| {
        tags.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    })
}

fn aggregation_spec(args: QueryArgs) -> (Option<String>, QuerySpec) {
    let spec = QuerySpec {
        field: args.field,
        tags: normalize_tags(args.tags),
        summary_type: args.aggregation,
        time_range: args.time_range,
        time_interval: args.time_interval,
        nop: None,
    };
    (args.channel_id, spec)
}

pub(crate) async fn handle_value(
    ctx: &AppContext,
    args: QueryArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let (channel_id, spec) = aggregation_spec(args);
    let channel_id = require(channel_id, "channel id", resolver)?;
    let payload = ctx.execute(ops::query_value(&channel_id, &spec)).await?;
    print_payload(&payload, ctx.output)
}

pub(crate) async fn handle_series(
    ctx: &AppContext,
    args: QueryArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let (channel_id, spec) = aggregation_spec(args);
    let channel_id = require(channel_id, "channel id", resolver)?;
    let payload = ctx.execute(ops::query_series(&channel_id, &spec)).await?;
    print_payload(&payload, ctx.output)
}

pub(crate) async fn handle_raw(
    ctx: &AppContext,
    args: RawQueryArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let channel_id = require(args.channel_id, "channel id", resolver)?;
    let nop = !args.nop_false;
    let spec = QuerySpec {
        tags: normalize_tags(args.tags),
        time_range: args.time_range,
        nop: Some(nop),
        ..QuerySpec::default()
    };
    let payload = ctx.execute(ops::query_raw(&channel_id, &spec)).await?;
    print_payload(&payload, ctx.output)?;
    if nop {
        println!("Ran in no-op mode; pass --nop-false to fetch documents.");
    }
    Ok(())
}
