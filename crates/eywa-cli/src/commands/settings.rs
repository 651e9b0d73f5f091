//! Server settings commands.

use anyhow::anyhow;
use eywa_client::{flatten_settings, ops};
use serde_json::Value;

use crate::cli::SettingsUpdateArgs;
use crate::context::{AppContext, CliError, CliResult};
use crate::output::print_payload;
use crate::resolver::{ParamResolver, require};

pub(crate) async fn handle_show(ctx: &AppContext) -> CliResult<()> {
    let payload = ctx.execute(ops::show_settings()).await?;
    print_payload(&payload, ctx.output)
}

pub(crate) async fn handle_update(
    ctx: &AppContext,
    args: SettingsUpdateArgs,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    let input = require(args.set, "settings", resolver)?;
    let updates = flatten_settings(&input).map_err(|err| CliError::validation(err.to_string()))?;
    let document = Value::Object(updates);

    if !ctx.assume_yes {
        let text = serde_json::to_string_pretty(&document)
            .map_err(|err| CliError::failure(anyhow!("failed to render JSON: {err}")))?;
        println!("Settings to apply:");
        println!("{text}");
        if !resolver.confirm("Are you sure you want to update these settings?")? {
            println!("Nothing is updated.");
            return Ok(());
        }
    }

    let payload = ctx.execute(ops::update_settings(document)).await?;
    println!("Settings updated.");
    print_payload(&payload, ctx.output)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::{Result, anyhow};
    use eywa_client::{AdminClient, ConnectOptions, Session};
    use httpmock::MockServer;
    use url::Url;

    use super::*;
    use crate::cli::OutputFormat;
    use crate::resolver::StrictResolver;

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

    #[tokio::test]
    async fn update_sends_the_nested_document() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock(|when, then| {
                when.method("PUT").path("/admin/configs").json_body(
                    serde_json::json!({
                        "connections": {"timeouts": {"read": "4s", "write": "2s"}}
                    }),
                );
                then.status(200).body("{}");
            });

        let ctx = test_context(&server)?;
        handle_update(
            &ctx,
            SettingsUpdateArgs {
                set: Some(
                    "connections.timeouts.read:4s,connections.timeouts.write:2s".to_string(),
                ),
            },
            &StrictResolver,
        )
        .await
        .map_err(|err| anyhow!(err.display_message()))?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn malformed_settings_never_reach_the_server() -> Result<()> {
        // No route is mocked: a request leaking through would fail the
        // test with an HTTP error instead of a validation error.
        let server = MockServer::start_async().await;
        let ctx = test_context(&server)?;
        let err = handle_update(
            &ctx,
            SettingsUpdateArgs {
                set: Some("no_separator_here".to_string()),
            },
            &StrictResolver,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        Ok(())
    }
}
