//! Harvest v2 payloads and their validation into core records.
//!
//! Records are deserialised one at a time from raw JSON so a single bad
//! record is skipped instead of failing the whole page.

use serde::Deserialize;
use serde_json::Value;
use shamebot_core::model::{Account, ActivityRecord};

type CoreResult<T> = shamebot_core::Result<T>;

/// An entry of `GET /v2/users`.
#[derive(Debug, Deserialize)]
struct RawUser {
  first_name:      Option<String>,
  last_name:       Option<String>,
  email:           Option<String>,
  weekly_capacity: Option<i64>,
  #[serde(default)]
  is_contractor:   bool,
  #[serde(default)]
  timezone:        Option<String>,
}

/// An entry of `GET /v2/reports/time/team`.
#[derive(Debug, Deserialize)]
struct RawTeamResult {
  user_name:   Option<String>,
  total_hours: Option<f64>,
}

fn malformed(kind: &'static str, reason: impl Into<String>) -> shamebot_core::Error {
  shamebot_core::Error::MalformedRecord { kind, reason: reason.into() }
}

fn required<T>(kind: &'static str, field: &str, value: Option<T>) -> CoreResult<T> {
  value.ok_or_else(|| malformed(kind, format!("missing {field}")))
}

pub(crate) fn account(value: Value) -> CoreResult<Account> {
  let raw: RawUser =
    serde_json::from_value(value).map_err(|e| malformed("account", e.to_string()))?;
  let first = required("account", "first_name", raw.first_name)?;
  let last = required("account", "last_name", raw.last_name)?;
  let email = required("account", "email", raw.email)?;
  let capacity = required("account", "weekly_capacity", raw.weekly_capacity)?;

  Account::new(
    format!("{first} {last}"),
    &email,
    capacity,
    raw.is_contractor,
    raw.timezone.unwrap_or_default(),
  )
}

pub(crate) fn activity(value: Value) -> CoreResult<ActivityRecord> {
  let raw: RawTeamResult =
    serde_json::from_value(value).map_err(|e| malformed("activity", e.to_string()))?;
  ActivityRecord::new(
    required("activity", "user_name", raw.user_name)?,
    required("activity", "total_hours", raw.total_hours)?,
  )
}
