//! Channel management commands.

use std::fs;
use std::path::Path;

use anyhow::anyhow;
use eywa_client::ops;
use serde_json::Value;

use crate::cli::{ChannelCreateArgs, ChannelDeleteArgs, ChannelShowArgs, ChannelUpdateArgs};
use crate::context::{AppContext, CliError, CliResult};
use crate::output::print_payload;
use crate::resolver::{ParamResolver, require};

pub(crate) async fn handle_list(ctx: &AppContext) -> CliResult<()> {
    let payload = ctx.execute(ops::list_channels()).await?;
    print_payload(&payload, ctx.output)
}

pub(crate) async fn handle_show(
    ctx: &AppContext,
    args: ChannelShowArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let channel_id = require(args.channel_id, "channel id", resolver)?;
    let payload = ctx.execute(ops::show_channel(&channel_id)).await?;
    print_payload(&payload, ctx.output)
}

pub(crate) async fn handle_create(ctx: &AppContext, args: &ChannelCreateArgs) -> CliResult<()> {
    let definition = read_template(&args.template)?;
    let payload = ctx.execute(ops::create_channel(definition)).await?;
    let created_id = payload
        .json
        .as_ref()
        .and_then(|value| value.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let Some(id) = created_id else {
        return print_payload(&payload, ctx.output);
    };
    println!("Channel created with id: {id}");
    let detail = ctx.execute(ops::show_channel(&id)).await?;
    print_payload(&detail, ctx.output)
}

pub(crate) async fn handle_update(
    ctx: &AppContext,
    args: ChannelUpdateArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let channel_id = require(args.channel_id, "channel id", resolver)?;
    let definition = read_template(&args.template)?;
    if !ctx.assume_yes {
        let current = ctx.execute(ops::show_channel(&channel_id)).await?;
        println!("Current channel definition:");
        print_payload(&current, ctx.output)?;
        if !resolver.confirm("Are you sure you want to update this channel?")? {
            println!("Nothing is updated.");
            return Ok(());
        }
    }
    ctx.execute(ops::update_channel(&channel_id, definition))
        .await?;
    println!("Channel updated with id: {channel_id}");
    let detail = ctx.execute(ops::show_channel(&channel_id)).await?;
    print_payload(&detail, ctx.output)
}

pub(crate) async fn handle_delete(
    ctx: &AppContext,
    args: ChannelDeleteArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let channel_id = require(args.channel_id, "channel id", resolver)?;
    if !ctx.assume_yes {
        let current = ctx.execute(ops::show_channel(&channel_id)).await?;
        println!("Current channel definition:");
        print_payload(&current, ctx.output)?;
        if !resolver.confirm("Are you sure you want to delete this channel?")? {
            println!("Nothing is deleted.");
            return Ok(());
        }
    }
    ctx.execute(ops::delete_channel(&channel_id, args.with_indices))
        .await?;
    println!("Channel deleted with id: {channel_id}");
    Ok(())
}

fn read_template(path: &Path) -> CliResult<Value> {
    let text = fs::read_to_string(path).map_err(|err| {
        CliError::failure(anyhow!(
            "failed to read template '{}': {err}",
            path.display()
        ))
    })?;
    serde_json::from_str(&text).map_err(|err| {
        CliError::validation(format!(
            "template '{}' is not valid JSON: {err}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use anyhow::Result;
    use eywa_client::{AdminClient, ConnectOptions, Session};
    use httpmock::MockServer;
    use url::Url;

    use super::*;
    use crate::cli::OutputFormat;

    fn test_context(server: &MockServer) -> Result<AppContext> {
        let options = ConnectOptions {
            timeout: Duration::from_secs(5),
            ..ConnectOptions::default()
        };
        let base: Url = server.base_url().parse()?;
        Ok(AppContext {
            client: AdminClient::new(&options).map_err(anyhow::Error::new)?,
            session: Session::new(base, "tok".to_string()),
            output: OutputFormat::Pretty,
            assume_yes: true,
        })
    }

    fn scratch_template(name: &str, contents: &str) -> Result<PathBuf> {
        let path =
            std::env::temp_dir().join(format!("eywa-channel-{}-{name}", std::process::id()));
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    #[tokio::test]
    async fn list_hits_the_channels_collection() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock(|when, then| {
                when.method("GET")
                    .path("/admin/channels")
                    .header("Authentication", "tok");
                then.status(200).body("[]");
            });

        let ctx = test_context(&server)?;
        handle_list(&ctx).await.map_err(|err| anyhow!(err.display_message()))?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn create_posts_the_template_and_reloads_the_channel() -> Result<()> {
        let server = MockServer::start_async().await;
        let create = server
            .mock(|when, then| {
                when.method("POST")
                    .path("/admin/channels")
                    .json_body(serde_json::json!({"name": "thermostats"}));
                then.status(201).body(r#"{"id":"ch-9"}"#);
            });
        let show = server
            .mock(|when, then| {
                when.method("GET").path("/admin/channels/ch-9");
                then.status(200).body(r#"{"id":"ch-9","name":"thermostats"}"#);
            });

        let path = scratch_template("create.json", r#"{"name": "thermostats"}"#)?;
        let ctx = test_context(&server)?;
        handle_create(&ctx, &ChannelCreateArgs { template: path.clone() })
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        create.assert();
        show.assert();
        std::fs::remove_file(path)?;
        Ok(())
    }

    #[tokio::test]
    async fn create_treats_a_200_as_failure() -> Result<()> {
        let server = MockServer::start_async().await;
        server
            .mock(|when, then| {
                when.method("POST").path("/admin/channels");
                then.status(200).body("accepted");
            });

        let path = scratch_template("create-200.json", r#"{"name": "x"}"#)?;
        let ctx = test_context(&server)?;
        let err = handle_create(&ctx, &ChannelCreateArgs { template: path.clone() })
            .await
            .unwrap_err();
        assert!(err.display_message().contains("200"));
        std::fs::remove_file(path)?;
        Ok(())
    }

    #[tokio::test]
    async fn delete_forwards_the_with_indices_flag() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock(|when, then| {
                when.method("DELETE")
                    .path("/admin/channels/ch-1")
                    .query_param("with_indices", "true");
                then.status(204);
            });

        let ctx = test_context(&server)?;
        handle_delete(
            &ctx,
            ChannelDeleteArgs {
                channel_id: Some("ch-1".to_string()),
                with_indices: true,
            },
            &crate::resolver::StrictResolver,
        )
        .await
        .map_err(|err| anyhow!(err.display_message()))?;
        mock.assert();
        Ok(())
    }

    #[test]
    fn malformed_templates_are_validation_errors() -> Result<()> {
        let path = scratch_template("broken.json", "{ not json")?;
        let err = read_template(&path).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        std::fs::remove_file(path)?;
        Ok(())
    }
}
