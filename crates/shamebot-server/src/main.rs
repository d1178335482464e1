//! shamebot server binary.
//!
//! Reads `shamebot.toml` (or the path given with `--config`) and
//! `SHAMEBOT__*` environment overrides, then serves the Slack endpoints and
//! runs the weekday schedule.
//!
//! ```
//! cargo run -p shamebot-server -- --dry-run
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use clap::Parser;
use shamebot_harvest::{HarvestClient, HarvestConfig};
use shamebot_server::{
  AppState, report, schedule,
  settings::Settings,
};
use shamebot_slack::{SlackClient, SlackConfig, blocks};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Lists people who have not logged their hours")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "shamebot.toml")]
  config: PathBuf,

  /// Post one report to the scheduled channel and exit.
  #[arg(long)]
  once: bool,

  /// Print the report that would be posted, as Slack blocks, and exit.
  #[arg(long, conflicts_with = "once")]
  dry_run: bool,
}

fn load(path: PathBuf) -> anyhow::Result<Settings> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("SHAMEBOT")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("policy.ignore_list")
        .with_list_parse_key("policy.specific_teams")
        .try_parsing(true),
    )
    .build()
    .context("failed to read configuration")?
    .try_deserialize()
    .context("failed to deserialise Settings")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = load(cli.config)?;
  let config = settings.compile().context("invalid configuration")?;

  let tracker = HarvestClient::new(HarvestConfig {
    base_url:   settings.harvest.url.clone(),
    token:      settings.harvest.token.clone(),
    account_id: settings.harvest.account_id.clone(),
  })
  .context("failed to build Harvest client")?;
  let chat = SlackClient::new(SlackConfig {
    api_base:  settings.slack.api_base.clone(),
    bot_token: settings.slack.bot_token.clone(),
  })
  .context("failed to build Slack client")?;

  let address = format!("{}:{}", settings.server.host, settings.server.port);
  let state = AppState::new(tracker, chat, settings, config);

  if cli.dry_run {
    match report::dry_run(&state, Utc::now()).await? {
      Some(document) => {
        let rendered = serde_json::to_string_pretty(&blocks::encode(&document))?;
        println!("{rendered}");
      }
      None => println!("nobody is under-reported"),
    }
    return Ok(());
  }

  if cli.once {
    let channel = state
      .config
      .scheduled_channel
      .clone()
      .context("--once needs options.scheduled_channel")?;
    match report::publish_report(&state, &channel, Utc::now()).await? {
      Some(message) => tracing::info!(channel = %message.channel, ts = %message.ts, "report posted"),
      None => tracing::info!("nobody is under-reported, nothing posted"),
    }
    return Ok(());
  }

  if let (Some(schedule), Some(channel)) =
    (state.config.schedule, state.config.scheduled_channel.clone())
  {
    tokio::spawn(schedule::run(state.clone(), schedule, channel));
  } else {
    tracing::info!("schedule disabled");
  }

  let app = shamebot_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
