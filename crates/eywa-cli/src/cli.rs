//! Argument parsing, connection resolution, and command dispatch.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use eywa_client::{AdminClient, ConnectOptions, Profile, Scheme};

use crate::commands;
use crate::context::{AppContext, CliError, CliResult};
use crate::resolver::{self, ParamResolver};

/// Administrative CLI for an Eywa server.
#[derive(Parser)]
#[command(name = "eywa", version, about, propagate_version = true)]
pub(crate) struct Cli {
    /// Server hostname or address.
    #[arg(long, global = true, env = "EYWA_HOST")]
    pub(crate) host: Option<String>,

    /// Admin API port.
    #[arg(long, global = true, env = "EYWA_PORT")]
    pub(crate) port: Option<u16>,

    /// Admin username.
    #[arg(long, short = 'u', global = true, env = "EYWA_USERNAME")]
    pub(crate) username: Option<String>,

    /// Admin password. Prompted for when omitted on a terminal.
    #[arg(long, short = 'p', global = true, env = "EYWA_PASSWORD")]
    pub(crate) password: Option<String>,

    /// Connect over HTTPS.
    #[arg(long, global = true, env = "EYWA_TLS")]
    pub(crate) tls: bool,

    /// Skip TLS certificate verification.
    #[arg(long, global = true, env = "EYWA_INSECURE")]
    pub(crate) insecure: bool,

    /// Default request timeout in seconds.
    #[arg(long, global = true, env = "EYWA_TIMEOUT", default_value_t = 10)]
    pub(crate) timeout: u64,

    /// Path to a JSON connection profile.
    #[arg(long, global = true, env = "EYWA_PROFILE")]
    pub(crate) profile: Option<PathBuf>,

    /// Output format for response bodies.
    #[arg(long, global = true, env = "EYWA_OUTPUT", value_enum, default_value_t = OutputFormat::Pretty)]
    pub(crate) output: OutputFormat,

    /// Skip confirmation prompts.
    #[arg(long, short = 'y', global = true, env = "EYWA_YES")]
    pub(crate) yes: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

/// Rendering mode for response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Re-indent JSON bodies; print anything else verbatim.
    Pretty,
    /// Print bodies exactly as received.
    Raw,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Manage channels.
    #[command(subcommand)]
    Channel(ChannelCommand),
    /// Inspect device connections and exchange messages.
    #[command(subcommand)]
    Connection(ConnectionCommand),
    /// Show and update server settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Run time-series queries against a channel.
    #[command(subcommand)]
    Query(QueryCommand),
    /// Stream the server log until interrupted.
    Tail,
    /// Push synthetic device telemetry over the device ingress.
    Simulate(SimulateArgs),
}

#[derive(Subcommand)]
pub(crate) enum ChannelCommand {
    /// List all channels.
    List,
    /// Show one channel.
    Show(ChannelShowArgs),
    /// Create a channel from a JSON template.
    Create(ChannelCreateArgs),
    /// Update a channel from a JSON template.
    Update(ChannelUpdateArgs),
    /// Delete a channel.
    Delete(ChannelDeleteArgs),
}

#[derive(Args)]
pub(crate) struct ChannelShowArgs {
    /// Channel identifier.
    pub(crate) channel_id: Option<String>,
}

#[derive(Args)]
pub(crate) struct ChannelCreateArgs {
    /// Path to a JSON channel template.
    pub(crate) template: PathBuf,
}

#[derive(Args)]
pub(crate) struct ChannelUpdateArgs {
    /// Channel identifier.
    pub(crate) channel_id: Option<String>,

    /// Path to a JSON channel template.
    #[arg(long)]
    pub(crate) template: PathBuf,
}

#[derive(Args)]
pub(crate) struct ChannelDeleteArgs {
    /// Channel identifier.
    pub(crate) channel_id: Option<String>,

    /// Also drop the channel's time-series indices.
    #[arg(long)]
    pub(crate) with_indices: bool,
}

#[derive(Subcommand)]
pub(crate) enum ConnectionCommand {
    /// Show connection counts across all channels.
    Counts,
    /// Show one device's connection status.
    Status(StatusArgs),
    /// Scan all live connections on a channel.
    Scan(ScanArgs),
    /// Send a one-way message to a device.
    Send(SendArgs),
    /// Send a message and wait for the device's reply.
    Request(RequestArgs),
    /// Attach to a device's live message stream.
    Attach(AttachArgs),
}

#[derive(Args)]
pub(crate) struct DeviceArgs {
    /// Channel identifier.
    #[arg(long = "channel")]
    pub(crate) channel_id: Option<String>,

    /// Device identifier.
    #[arg(long = "device")]
    pub(crate) device_id: Option<String>,
}

#[derive(Args)]
pub(crate) struct StatusArgs {
    #[command(flatten)]
    pub(crate) device: DeviceArgs,

    /// Include connection history.
    #[arg(long)]
    pub(crate) history: bool,
}

#[derive(Args)]
pub(crate) struct ScanArgs {
    /// Channel identifier.
    #[arg(long = "channel")]
    pub(crate) channel_id: Option<String>,
}

#[derive(Args)]
pub(crate) struct SendArgs {
    #[command(flatten)]
    pub(crate) device: DeviceArgs,

    /// Message payload.
    pub(crate) message: Option<String>,
}

#[derive(Args)]
pub(crate) struct RequestArgs {
    #[command(flatten)]
    pub(crate) device: DeviceArgs,

    /// Message payload.
    pub(crate) message: Option<String>,

    /// How long the server waits for the reply, e.g. `5s`.
    #[arg(long)]
    pub(crate) wait: Option<String>,
}

#[derive(Args)]
pub(crate) struct AttachArgs {
    #[command(flatten)]
    pub(crate) device: DeviceArgs,
}

#[derive(Subcommand)]
pub(crate) enum SettingsCommand {
    /// Show the current server settings.
    Show,
    /// Update settings from flattened dotted keys.
    Update(SettingsUpdateArgs),
}

#[derive(Args)]
pub(crate) struct SettingsUpdateArgs {
    /// Flattened settings, e.g. `connections.timeouts.read:4s,security.ssl:true`.
    #[arg(long = "set")]
    pub(crate) set: Option<String>,
}

#[derive(Subcommand)]
pub(crate) enum QueryCommand {
    /// Aggregate the latest value of a channel field.
    Value(QueryArgs),
    /// Aggregate a channel field into time buckets.
    Series(QueryArgs),
    /// Fetch raw indexed documents.
    Raw(RawQueryArgs),
}

#[derive(Args)]
pub(crate) struct QueryArgs {
    /// Channel identifier.
    #[arg(long = "channel")]
    pub(crate) channel_id: Option<String>,

    /// Channel field to aggregate over.
    #[arg(long)]
    pub(crate) field: Option<String>,

    /// Comma-separated `tag:value` filters.
    #[arg(long)]
    pub(crate) tags: Option<String>,

    /// Aggregation kind: avg, min, max, sum, count.
    #[arg(long)]
    pub(crate) aggregation: Option<String>,

    /// Time range expression, forwarded verbatim.
    #[arg(long)]
    pub(crate) time_range: Option<String>,

    /// Bucket width for series queries, forwarded verbatim.
    #[arg(long)]
    pub(crate) time_interval: Option<String>,
}

#[derive(Args)]
pub(crate) struct RawQueryArgs {
    /// Channel identifier.
    #[arg(long = "channel")]
    pub(crate) channel_id: Option<String>,

    /// Comma-separated `tag:value` filters.
    #[arg(long)]
    pub(crate) tags: Option<String>,

    /// Time range expression, forwarded verbatim.
    #[arg(long)]
    pub(crate) time_range: Option<String>,

    /// Fetch the documents instead of only reporting what would be
    /// scanned.
    #[arg(long)]
    pub(crate) nop_false: bool,
}

#[derive(Args)]
pub(crate) struct SimulateArgs {
    /// Channel to push readings into.
    #[arg(long = "channel")]
    pub(crate) channel_id: String,

    /// Channel access token for the device ingress.
    #[arg(long, env = "EYWA_ACCESS_TOKEN")]
    pub(crate) access_token: String,

    /// Number of simulated devices, visited one at a time.
    #[arg(long, default_value_t = 1)]
    pub(crate) devices: u32,

    /// Readings pushed per device.
    #[arg(long, default_value_t = 10)]
    pub(crate) messages: u32,

    /// Pause between readings, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub(crate) interval_ms: u64,

    /// Prefix for generated device identifiers.
    #[arg(long, default_value = "simulated")]
    pub(crate) device_prefix: String,

    /// Device ingress port, when it differs from the admin port.
    #[arg(long)]
    pub(crate) device_port: Option<u16>,
}

/// Connection overrides taken from the command line.
struct Overrides {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    tls: bool,
    insecure: bool,
}

/// Parses arguments, runs the selected command, and returns the process
/// exit code: 0 on success, 1 on any failure.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let resolver = resolver::stdin_resolver();
    match dispatch(cli, resolver.as_ref()).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            1
        }
    }
}

async fn dispatch(cli: Cli, resolver: &dyn ParamResolver) -> CliResult<()> {
    let Cli {
        host,
        port,
        username,
        password,
        tls,
        insecure,
        timeout,
        profile,
        output,
        yes,
        command,
    } = cli;
    let timeout = Duration::from_secs(timeout);
    let profile = profile
        .as_deref()
        .map(Profile::load)
        .transpose()
        .map_err(|err| CliError::validation(err.to_string()))?;
    let overrides = Overrides {
        host,
        port,
        username,
        password,
        tls,
        insecure,
    };

    // The simulator speaks the device ingress with a channel access
    // token; it never logs in as an admin.
    let needs_login = !matches!(command, Command::Simulate(_));
    let options = connect_options(overrides, profile.as_ref(), timeout, needs_login, resolver)?;
    match command {
        Command::Simulate(args) => commands::simulate::handle_simulate(&options, &args).await,
        command => {
            let client = AdminClient::new(&options).map_err(CliError::failure)?;
            let session = client.login(&options).await.map_err(CliError::failure)?;
            let ctx = AppContext {
                client,
                session,
                output,
                assume_yes: yes,
            };
            run_command(&ctx, command, resolver).await
        }
    }
}

/// Folds profile values and command-line overrides into connection
/// options. Flags win over the profile, the profile over defaults.
fn connect_options(
    overrides: Overrides,
    profile: Option<&Profile>,
    timeout: Duration,
    needs_credentials: bool,
    resolver: &dyn ParamResolver,
) -> CliResult<ConnectOptions> {
    let mut options = profile.map_or_else(
        || ConnectOptions {
            timeout,
            ..ConnectOptions::default()
        },
        |profile| profile.connect_options(timeout),
    );
    if let Some(host) = overrides.host {
        options.host = host;
    }
    if let Some(port) = overrides.port {
        options.port = port;
    }
    if overrides.tls {
        options.scheme = Scheme::Https;
    }
    if overrides.insecure {
        options.insecure = true;
    }
    if let Some(username) = overrides.username {
        options.username = username;
    }
    if let Some(password) = overrides.password {
        options.password = password;
    }
    if needs_credentials {
        if options.username.trim().is_empty() {
            options.username = resolver.resolve("username")?;
        }
        if options.password.is_empty() {
            options.password = resolver.secret("password")?;
        }
    }
    Ok(options)
}

async fn run_command(
    ctx: &AppContext,
    command: Command,
    resolver: &dyn ParamResolver,
) -> CliResult<()> {
    match command {
        Command::Channel(command) => match command {
            ChannelCommand::List => commands::channels::handle_list(ctx).await,
            ChannelCommand::Show(args) => commands::channels::handle_show(ctx, args, resolver).await,
            ChannelCommand::Create(args) => commands::channels::handle_create(ctx, &args).await,
            ChannelCommand::Update(args) => {
                commands::channels::handle_update(ctx, args, resolver).await
            }
            ChannelCommand::Delete(args) => {
                commands::channels::handle_delete(ctx, args, resolver).await
            }
        },
        Command::Connection(command) => match command {
            ConnectionCommand::Counts => commands::connections::handle_counts(ctx).await,
            ConnectionCommand::Status(args) => {
                commands::connections::handle_status(ctx, args, resolver).await
            }
            ConnectionCommand::Scan(args) => {
                commands::connections::handle_scan(ctx, args, resolver).await
            }
            ConnectionCommand::Send(args) => {
                commands::connections::handle_send(ctx, args, resolver).await
            }
            ConnectionCommand::Request(args) => {
                commands::connections::handle_request(ctx, args, resolver).await
            }
            ConnectionCommand::Attach(args) => {
                commands::stream::handle_attach(ctx, args, resolver).await
            }
        },
        Command::Settings(command) => match command {
            SettingsCommand::Show => commands::settings::handle_show(ctx).await,
            SettingsCommand::Update(args) => {
                commands::settings::handle_update(ctx, args, resolver).await
            }
        },
        Command::Query(command) => match command {
            QueryCommand::Value(args) => commands::queries::handle_value(ctx, args, resolver).await,
            QueryCommand::Series(args) => {
                commands::queries::handle_series(ctx, args, resolver).await
            }
            QueryCommand::Raw(args) => commands::queries::handle_raw(ctx, args, resolver).await,
        },
        Command::Tail => commands::stream::handle_tail(ctx).await,
        Command::Simulate(_) => unreachable!("handled before login"),
    }
}
