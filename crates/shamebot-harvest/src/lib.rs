//! Harvest v2 client for the shamebot.
//!
//! Implements [`TimeTracker`] over Harvest's paginated REST API: the active
//! user list and the team time report for a single day. Payloads are
//! validated into [`shamebot_core::model`] records here; malformed records
//! are logged and skipped.

pub mod error;
mod payload;

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use shamebot_core::{
  model::{Account, ActivityRecord},
  source::TimeTracker,
};

pub use error::{Error, Result};
use error::MAX_PAGES;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.harvestapp.com/v2";

/// Connection settings for the Harvest API.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
  pub base_url:   String,
  /// Personal access token.
  pub token:      String,
  pub account_id: String,
}

/// Async client for the Harvest v2 API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HarvestClient {
  client: Client,
  config: HarvestConfig,
}

impl HarvestClient {
  pub fn new(config: HarvestConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .user_agent(concat!("shamebot/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Follow `next_page` from page 1 until it is null, collecting the `key`
  /// array of every page.
  async fn paginate(
    &self,
    path: &str,
    query: &[(&str, String)],
    key: &'static str,
  ) -> Result<Vec<Value>> {
    let mut items = Vec::new();
    let mut page = 1u64;

    for _ in 0..MAX_PAGES {
      let resp = self
        .client
        .get(self.url(path))
        .bearer_auth(&self.config.token)
        .header("Harvest-Account-Id", &self.config.account_id)
        .query(query)
        .query(&[("page", page)])
        .send()
        .await?;

      if !resp.status().is_success() {
        return Err(Error::Status {
          path:   path.to_string(),
          status: resp.status(),
        });
      }

      let mut body: Value = resp.json().await?;
      match body.get_mut(key).map(Value::take) {
        Some(Value::Array(batch)) => items.extend(batch),
        _ => {
          return Err(Error::UnexpectedShape { path: path.to_string(), key });
        }
      }

      match body.get("next_page").and_then(Value::as_u64) {
        Some(next) => page = next,
        None => return Ok(items),
      }
    }

    Err(Error::TooManyPages { path: path.to_string() })
  }
}

/// Validate every raw record, logging and dropping the ones that fail.
fn validated<T>(
  raw: Vec<Value>,
  convert: fn(Value) -> shamebot_core::Result<T>,
) -> Vec<T> {
  raw
    .into_iter()
    .filter_map(|value| match convert(value) {
      Ok(record) => Some(record),
      Err(e) => {
        tracing::warn!(error = %e, "skipping malformed Harvest record");
        None
      }
    })
    .collect()
}

impl TimeTracker for HarvestClient {
  type Error = Error;

  async fn fetch_accounts(&self) -> Result<Vec<Account>> {
    let raw = self
      .paginate("/users", &[("is_active", "true".to_string())], "users")
      .await?;
    let accounts = validated(raw, payload::account);
    tracing::debug!(count = accounts.len(), "fetched Harvest users");
    Ok(accounts)
  }

  async fn fetch_daily_activity(&self, date: NaiveDate) -> Result<Vec<ActivityRecord>> {
    let day = date.format("%Y%m%d").to_string();
    let raw = self
      .paginate(
        "/reports/time/team",
        &[("from", day.clone()), ("to", day)],
        "results",
      )
      .await?;
    let records = validated(raw, payload::activity);
    tracing::debug!(count = records.len(), %date, "fetched Harvest team report");
    Ok(records)
  }
}
