//! Policy switches that decide which accounts and directory members are in
//! play for a compliance pass.
//!
//! Each switch is a pure predicate over one record. Enabled switches are
//! combined with logical AND.

use serde::{Deserialize, Serialize};

use crate::model::{Account, DirectoryMember, normalize_email};

/// Whether `email` belongs to `domain` or one of its subdomains.
///
/// `domain` may be given with or without a leading `@`.
pub fn email_in_domain(email: &str, domain: &str) -> bool {
  let domain = normalize_email(domain.trim_start_matches('@'));
  if domain.is_empty() {
    return true;
  }
  let email = normalize_email(email);
  let Some((_, host)) = email.rsplit_once('@') else {
    return false;
  };
  host == domain
    || host
      .strip_suffix(domain.as_str())
      .is_some_and(|prefix| prefix.ends_with('.'))
}

// ─── Account policy ──────────────────────────────────────────────────────────

/// Account-level policy for the compliance evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
  /// Only accounts whose email is in this domain are reportable.
  pub org_domain:           Option<String>,
  /// Emails that are never reported.
  #[serde(default)]
  pub ignore_list:          Vec<String>,
  /// Whether contractors are reportable at all.
  #[serde(default)]
  pub include_contractors:  bool,
  /// When set, only accounts with at least this many weekly hours of
  /// capacity are reportable.
  pub full_time_threshold:  Option<f64>,
}

/// One enabled policy switch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Switch<'a> {
  OrgDomain(&'a str),
  IgnoreList(&'a [String]),
  ExcludeContractors,
  FullTimeOnly { weekly_hours: f64 },
}

impl Switch<'_> {
  pub fn admits(&self, account: &Account) -> bool {
    match *self {
      Switch::OrgDomain(domain) => email_in_domain(&account.email, domain),
      Switch::IgnoreList(ignored) => !ignored
        .iter()
        .any(|e| normalize_email(e) == account.email),
      Switch::ExcludeContractors => !account.is_contractor,
      Switch::FullTimeOnly { weekly_hours } => {
        account.weekly_hours() >= weekly_hours
      }
    }
  }
}

impl PolicyConfig {
  /// The switches this configuration enables.
  pub fn switches(&self) -> Vec<Switch<'_>> {
    let mut switches = Vec::new();
    if let Some(domain) = self.org_domain.as_deref() {
      switches.push(Switch::OrgDomain(domain));
    }
    if !self.ignore_list.is_empty() {
      switches.push(Switch::IgnoreList(&self.ignore_list));
    }
    if !self.include_contractors {
      switches.push(Switch::ExcludeContractors);
    }
    if let Some(weekly_hours) = self.full_time_threshold {
      switches.push(Switch::FullTimeOnly { weekly_hours });
    }
    switches
  }

  /// Whether `account` is reportable: positive capacity and admitted by
  /// every enabled switch.
  pub fn admits(&self, account: &Account) -> bool {
    account.weekly_capacity > 0
      && self.switches().iter().all(|s| s.admits(account))
  }
}

// ─── Directory policy ────────────────────────────────────────────────────────

/// Directory-level policy applied to chat members before matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryPolicy {
  /// Only members whose email is in this domain are matchable.
  pub org_domain: Option<String>,
  /// Only members of these teams are matchable.
  pub teams:      Option<Vec<String>>,
}

impl DirectoryPolicy {
  /// Regular (not deleted, bot, or guest) members that pass the domain and
  /// team restrictions.
  pub fn admits(&self, member: &DirectoryMember) -> bool {
    if !member.is_regular() {
      return false;
    }
    if let Some(domain) = self.org_domain.as_deref() {
      match member.email.as_deref() {
        Some(email) if email_in_domain(email, domain) => {}
        _ => return false,
      }
    }
    if let Some(teams) = &self.teams
      && !teams.iter().any(|t| t == &member.team_id)
    {
      return false;
    }
    true
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn account(email: &str, capacity: i64, contractor: bool) -> Account {
    Account::new("Test User", email, capacity, contractor, "UTC").unwrap()
  }

  #[test]
  fn domain_matches_host_and_subdomains_only() {
    assert!(email_in_domain("a@example.com", "example.com"));
    assert!(email_in_domain("a@eu.example.com", "@example.com"));
    assert!(!email_in_domain("a@notexample.com", "example.com"));
    assert!(!email_in_domain("a@example.com.evil.io", "example.com"));
    assert!(!email_in_domain("no-at-sign", "example.com"));
    assert!(email_in_domain(" Ada@Example.COM ", "example.com"));
  }

  #[test]
  fn default_policy_admits_employees_with_capacity() {
    let policy = PolicyConfig::default();
    assert!(policy.admits(&account("a@example.com", 144_000, false)));
    assert!(!policy.admits(&account("a@example.com", 0, false)));
    assert!(!policy.admits(&account("a@example.com", -5, false)));
  }

  #[test]
  fn zero_capacity_is_never_admitted() {
    let policy = PolicyConfig {
      org_domain:          None,
      ignore_list:         vec![],
      include_contractors: true,
      full_time_threshold: None,
    };
    assert!(policy.switches().is_empty());
    assert!(!policy.admits(&account("a@example.com", 0, true)));
  }

  #[test]
  fn contractors_follow_the_include_switch() {
    let mut policy = PolicyConfig::default();
    let contractor = account("c@example.com", 144_000, true);
    assert!(!policy.admits(&contractor));
    policy.include_contractors = true;
    assert!(policy.admits(&contractor));
  }

  #[test]
  fn ignore_list_is_case_insensitive() {
    let policy = PolicyConfig {
      ignore_list: vec!["Boss@Example.com".into()],
      ..Default::default()
    };
    assert!(!policy.admits(&account("boss@example.com", 144_000, false)));
    assert!(policy.admits(&account("worker@example.com", 144_000, false)));
  }

  #[test]
  fn full_time_threshold_uses_weekly_hours() {
    let policy = PolicyConfig {
      full_time_threshold: Some(40.0),
      ..Default::default()
    };
    assert!(policy.admits(&account("a@example.com", 144_000, false)));
    assert!(!policy.admits(&account("b@example.com", 72_000, false)));
  }

  #[test]
  fn switches_combine_with_and() {
    let policy = PolicyConfig {
      org_domain:          Some("example.com".into()),
      ignore_list:         vec![],
      include_contractors: true,
      full_time_threshold: Some(30.0),
    };
    assert!(policy.admits(&account("a@example.com", 144_000, true)));
    assert!(!policy.admits(&account("a@other.com", 144_000, true)));
    assert!(!policy.admits(&account("a@example.com", 36_000, true)));
  }

  fn member(email: Option<&str>, team: &str) -> DirectoryMember {
    DirectoryMember {
      member_id: "U1".into(),
      email: email.map(str::to_string),
      team_id: team.into(),
      ..Default::default()
    }
  }

  #[test]
  fn directory_policy_drops_irregular_members() {
    let policy = DirectoryPolicy::default();
    let mut m = member(Some("a@example.com"), "T1");
    assert!(policy.admits(&m));
    m.is_bot = true;
    assert!(!policy.admits(&m));
    m.is_bot = false;
    m.is_restricted = true;
    assert!(!policy.admits(&m));
    m.is_restricted = false;
    m.deleted = true;
    assert!(!policy.admits(&m));
  }

  #[test]
  fn directory_policy_restricts_domain_and_team() {
    let policy = DirectoryPolicy {
      org_domain: Some("example.com".into()),
      teams:      Some(vec!["T1".into(), "T2".into()]),
    };
    assert!(policy.admits(&member(Some("a@example.com"), "T2")));
    assert!(!policy.admits(&member(Some("a@example.com"), "T3")));
    assert!(!policy.admits(&member(Some("a@other.com"), "T1")));
    assert!(!policy.admits(&member(None, "T1")));
  }
}
