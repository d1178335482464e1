//! Typed records exchanged between the collaborators and the core.
//!
//! Every record is validated when it is built, at the collaborator boundary.
//! Nothing downstream ever sees a loosely-typed payload.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Seconds in an hour; Harvest reports weekly capacity in seconds.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Working days the weekly capacity is spread over.
const WORKING_DAYS_PER_WEEK: f64 = 5.0;

/// Lowercase and trim an email address so both directories compare equal.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

// ─── Time-tracking side ──────────────────────────────────────────────────────

/// An account in the time-tracking system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
  /// `"{first} {last}"` exactly as the time tracker spells it. The activity
  /// report is joined on this value.
  pub full_name:       String,
  /// Lowercased email address.
  pub email:           String,
  /// Expected working time per week, in seconds. Zero (or less) means the
  /// account is never expected to log time.
  pub weekly_capacity: i64,
  pub is_contractor:   bool,
  pub timezone:        String,
}

impl Account {
  /// Build a validated account. The email is normalised; a blank name or
  /// email is a malformed record.
  pub fn new(
    full_name: impl Into<String>,
    email: &str,
    weekly_capacity: i64,
    is_contractor: bool,
    timezone: impl Into<String>,
  ) -> Result<Self> {
    let full_name = full_name.into();
    if full_name.trim().is_empty() {
      return Err(Error::malformed("account", "empty full name"));
    }
    let email = normalize_email(email);
    if email.is_empty() {
      return Err(Error::malformed(
        "account",
        format!("{full_name:?} has no email address"),
      ));
    }
    Ok(Self {
      full_name,
      email,
      weekly_capacity,
      is_contractor,
      timezone: timezone.into(),
    })
  }

  /// Weekly capacity in hours.
  pub fn weekly_hours(&self) -> f64 {
    self.weekly_capacity as f64 / SECONDS_PER_HOUR
  }

  /// Hours expected per working day: weekly capacity spread over five days.
  pub fn expected_daily_hours(&self) -> f64 {
    self.weekly_hours() / WORKING_DAYS_PER_WEEK
  }
}

/// One line of the same-day activity report.
///
/// Accounts that logged nothing are absent from the report entirely; that is
/// treated as zero hours, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
  /// Must equal [`Account::full_name`] for the two to join.
  pub display_name: String,
  pub total_hours:  f64,
}

impl ActivityRecord {
  pub fn new(display_name: impl Into<String>, total_hours: f64) -> Result<Self> {
    let display_name = display_name.into();
    if display_name.trim().is_empty() {
      return Err(Error::malformed("activity", "empty display name"));
    }
    if !total_hours.is_finite() || total_hours < 0.0 {
      return Err(Error::malformed(
        "activity",
        format!("{display_name:?} has invalid total hours {total_hours}"),
      ));
    }
    Ok(Self { display_name, total_hours })
  }
}

// ─── Chat-directory side ─────────────────────────────────────────────────────

/// A member of the chat platform's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMember {
  /// Stable platform identifier; what a mention refers to.
  pub member_id:     String,
  pub display_name:  String,
  /// Lowercased email, when the directory exposes one.
  pub email:         Option<String>,
  pub first_name:    String,
  pub last_name:     String,
  pub team_id:       String,
  pub deleted:       bool,
  pub is_bot:        bool,
  /// Restricted or ultra-restricted (guest) account.
  pub is_restricted: bool,
}

impl DirectoryMember {
  /// `"{first} {last}"` as sourced, for the name-based join.
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }

  /// Whether this is a regular, active human account.
  pub fn is_regular(&self) -> bool {
    !self.deleted && !self.is_bot && !self.is_restricted
  }
}

// ─── Evaluation results ──────────────────────────────────────────────────────

/// A reportable account that fell short of its expected daily hours.
/// Recomputed on every pass; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnderReportedIdentity {
  pub name:  String,
  pub email: String,
}

impl From<&Account> for UnderReportedIdentity {
  fn from(account: &Account) -> Self {
    Self {
      name:  account.full_name.clone(),
      email: account.email.clone(),
    }
  }
}

/// An under-reported identity joined against the chat directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressableIdentity {
  pub name:      String,
  pub email:     String,
  /// `None` when no directory member matched. Such entries are still listed
  /// but cannot be mentioned.
  pub member_id: Option<String>,
}

impl AddressableIdentity {
  pub fn is_addressable(&self) -> bool {
    self.member_id.as_deref().is_some_and(|id| !id.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn account_email_is_normalised() {
    let a = Account::new("Ada Lovelace", "  Ada@Example.COM ", 144_000, false, "UTC")
      .unwrap();
    assert_eq!(a.email, "ada@example.com");
  }

  #[test]
  fn account_without_email_is_malformed() {
    let err = Account::new("Ada Lovelace", "", 144_000, false, "UTC").unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { kind: "account", .. }));
  }

  #[test]
  fn forty_hour_week_expects_eight_hours_a_day() {
    let a = Account::new("Ada Lovelace", "ada@example.com", 144_000, false, "UTC")
      .unwrap();
    assert!((a.weekly_hours() - 40.0).abs() < f64::EPSILON);
    assert!((a.expected_daily_hours() - 8.0).abs() < f64::EPSILON);
  }

  #[test]
  fn activity_rejects_negative_or_nan_hours() {
    assert!(ActivityRecord::new("Ada Lovelace", -1.0).is_err());
    assert!(ActivityRecord::new("Ada Lovelace", f64::NAN).is_err());
    assert!(ActivityRecord::new("", 1.0).is_err());
    assert!(ActivityRecord::new("Ada Lovelace", 0.0).is_ok());
  }

  #[test]
  fn unmatched_identity_is_not_addressable() {
    let mut id = AddressableIdentity {
      name:      "Ada Lovelace".into(),
      email:     "ada@example.com".into(),
      member_id: None,
    };
    assert!(!id.is_addressable());
    id.member_id = Some(String::new());
    assert!(!id.is_addressable());
    id.member_id = Some("U123".into());
    assert!(id.is_addressable());
  }
}
