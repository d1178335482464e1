//! Compliance evaluation: who logged less than their expected daily hours.

use std::collections::HashMap;

use crate::{
  model::{Account, ActivityRecord, UnderReportedIdentity},
  policy::PolicyConfig,
};

/// Accounts that pass `policy` and have positive capacity.
pub fn reportable<'a>(
  accounts: &'a [Account],
  policy: &'a PolicyConfig,
) -> impl Iterator<Item = &'a Account> + 'a {
  accounts.iter().filter(move |a| policy.admits(a))
}

/// Return every reportable account that logged fewer hours than
/// `capacity / 3600 / 5` on the evaluated day.
///
/// Report lines are joined to accounts by exact, case-sensitive equality of
/// display name and full name. An account with no report line logged zero
/// hours and is always under-reported. When the report carries the same name
/// twice the first line wins.
///
/// The output order is not part of the contract.
pub fn evaluate(
  accounts: &[Account],
  report: &[ActivityRecord],
  policy: &PolicyConfig,
) -> Vec<UnderReportedIdentity> {
  let mut logged: HashMap<&str, f64> = HashMap::with_capacity(report.len());
  for record in report {
    logged
      .entry(record.display_name.as_str())
      .or_insert(record.total_hours);
  }

  reportable(accounts, policy)
    .filter(|account| match logged.get(account.full_name.as_str()) {
      Some(&hours) => hours < account.expected_daily_hours(),
      None => true,
    })
    .map(UnderReportedIdentity::from)
    .collect()
}
