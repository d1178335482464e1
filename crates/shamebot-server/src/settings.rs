//! Runtime configuration.
//!
//! [`Settings`] is what the config file and environment deserialise into.
//! [`Settings::compile`] turns it into the typed [`BotConfig`] the rest of
//! the server uses; invalid values fail there, once, at startup.

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use shamebot_core::{
  day::ReportDay,
  policy::{DirectoryPolicy, PolicyConfig},
  retract::PostscriptMode,
  trigger::TriggerMatcher,
};

use crate::{
  error::{Error, Result},
  schedule::Schedule,
};

const REDACTED: &str = "[redacted]";

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 2100 }
fn default_harvest_url() -> String { shamebot_harvest::DEFAULT_BASE_URL.to_string() }
fn default_slack_api() -> String { shamebot_slack::DEFAULT_API_BASE.to_string() }
fn default_trigger() -> String { "Shamebot, activate!".to_string() }
fn default_config_phrase() -> String { "Shamebot, show config".to_string() }
fn default_time() -> String { "17:30".to_string() }
fn default_timezone() -> String { "UTC".to_string() }
fn default_true() -> bool { true }

// ─── Raw settings ────────────────────────────────────────────────────────────

/// Deserialised from `shamebot.toml` and `SHAMEBOT__*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
  #[serde(default)]
  pub server:   ServerSettings,
  pub harvest:  HarvestSettings,
  pub slack:    SlackSettings,
  #[serde(default)]
  pub policy:   PolicySettings,
  #[serde(default)]
  pub options:  OptionSettings,
  #[serde(default)]
  pub schedule: ScheduleSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
}

impl Default for ServerSettings {
  fn default() -> Self { Self { host: default_host(), port: default_port() } }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestSettings {
  #[serde(default = "default_harvest_url")]
  pub url:        String,
  pub token:      String,
  pub account_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackSettings {
  #[serde(default = "default_slack_api")]
  pub api_base:       String,
  pub bot_token:      String,
  pub signing_secret: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicySettings {
  #[serde(default)]
  pub org_mails_only:         bool,
  #[serde(default)]
  pub org_email_domain:       String,
  #[serde(default)]
  pub specific_teams_only:    bool,
  #[serde(default)]
  pub specific_teams:         Vec<String>,
  #[serde(default)]
  pub include_contractors:    bool,
  #[serde(default)]
  pub full_time_only:         bool,
  #[serde(default)]
  pub weekly_full_time_hours: Option<f64>,
  #[serde(default)]
  pub ignore_list:            Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSettings {
  /// Literal phrase, or a regex wrapped in slashes.
  #[serde(default = "default_trigger")]
  pub trigger_phrase:            String,
  #[serde(default = "default_config_phrase")]
  pub config_phrase:             String,
  #[serde(default)]
  pub pretend_it_never_happened: bool,
  #[serde(default)]
  pub report_day:                ReportDay,
  /// Channel the scheduled report is posted to.
  #[serde(default)]
  pub scheduled_channel:         Option<String>,
}

impl Default for OptionSettings {
  fn default() -> Self {
    Self {
      trigger_phrase:            default_trigger(),
      config_phrase:             default_config_phrase(),
      pretend_it_never_happened: false,
      report_day:                ReportDay::default(),
      scheduled_channel:         None,
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSettings {
  #[serde(default = "default_true")]
  pub enabled:  bool,
  /// Local time of day, `HH:MM`.
  #[serde(default = "default_time")]
  pub time:     String,
  /// IANA timezone name, e.g. `America/New_York`.
  #[serde(default = "default_timezone")]
  pub timezone: String,
}

impl Default for ScheduleSettings {
  fn default() -> Self {
    Self {
      enabled:  true,
      time:     default_time(),
      timezone: default_timezone(),
    }
  }
}

// ─── Compiled configuration ──────────────────────────────────────────────────

/// Typed configuration shared by the handlers, pipeline and scheduler.
#[derive(Debug, Clone)]
pub struct BotConfig {
  pub policy:            PolicyConfig,
  pub directory:         DirectoryPolicy,
  pub trigger:           TriggerMatcher,
  pub config_phrase:     String,
  pub postscript_mode:   PostscriptMode,
  pub report_day:        ReportDay,
  pub timezone:          Tz,
  /// `None` when scheduling is disabled.
  pub schedule:          Option<Schedule>,
  pub scheduled_channel: Option<String>,
  pub signing_secret:    String,
}

impl Settings {
  pub fn compile(&self) -> Result<BotConfig> {
    let policy = &self.policy;

    let org_domain = if policy.org_mails_only {
      let domain = policy.org_email_domain.trim();
      if !domain.contains('.') {
        return Err(Error::Config(format!(
          "policy.org_mails_only needs a domain like example.com, got {domain:?}"
        )));
      }
      Some(domain.to_string())
    } else {
      None
    };

    let full_time_threshold = match (policy.full_time_only, policy.weekly_full_time_hours) {
      (false, _) => None,
      (true, Some(hours)) if hours.is_finite() && hours > 0.0 => Some(hours),
      (true, _) => {
        return Err(Error::Config(
          "policy.full_time_only needs a positive policy.weekly_full_time_hours".into(),
        ));
      }
    };

    let teams = policy.specific_teams_only.then(|| policy.specific_teams.clone());

    let trigger = TriggerMatcher::parse(&self.options.trigger_phrase)
      .map_err(|e| Error::Config(e.to_string()))?;

    let timezone: Tz = self
      .schedule
      .timezone
      .parse()
      .map_err(|_| Error::Config(format!("unknown timezone {:?}", self.schedule.timezone)))?;

    let schedule = if self.schedule.enabled {
      let time = NaiveTime::parse_from_str(&self.schedule.time, "%H:%M")
        .map_err(|_| Error::Config(format!("schedule.time must be HH:MM, got {:?}", self.schedule.time)))?;
      Some(Schedule::weekdays(time, timezone))
    } else {
      None
    };

    let scheduled_channel = self
      .options
      .scheduled_channel
      .clone()
      .filter(|c| !c.trim().is_empty());
    if schedule.is_some() && scheduled_channel.is_none() {
      return Err(Error::Config(
        "options.scheduled_channel is required while the schedule is enabled".into(),
      ));
    }

    Ok(BotConfig {
      policy: PolicyConfig {
        org_domain: org_domain.clone(),
        ignore_list: policy.ignore_list.clone(),
        include_contractors: policy.include_contractors,
        full_time_threshold,
      },
      directory: DirectoryPolicy { org_domain, teams },
      trigger,
      config_phrase: self.options.config_phrase.trim().to_string(),
      postscript_mode: PostscriptMode::from_pretend_flag(self.options.pretend_it_never_happened),
      report_day: self.options.report_day,
      timezone,
      schedule,
      scheduled_channel,
      signing_secret: self.slack.signing_secret.clone(),
    })
  }

  /// A copy safe to show in chat: tokens and secrets replaced.
  pub fn redacted(&self) -> Settings {
    let mut copy = self.clone();
    copy.harvest.token = REDACTED.to_string();
    copy.slack.bot_token = REDACTED.to_string();
    copy.slack.signing_secret = REDACTED.to_string();
    copy
  }
}
