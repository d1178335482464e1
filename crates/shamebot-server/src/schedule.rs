//! Weekday scheduling of the compliance pass.

use std::time::Duration;

use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use shamebot_core::source::{ChatPublisher, ChatDirectory, TimeTracker};

use crate::{AppState, report};

/// Fires once per business day (Monday to Friday) at a local wall-clock
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
  pub time: NaiveTime,
  pub tz:   Tz,
}

impl Schedule {
  pub fn weekdays(time: NaiveTime, tz: Tz) -> Self { Self { time, tz } }

  /// The first firing strictly after `now`.
  ///
  /// A wall-clock time skipped by a DST transition moves that day's firing
  /// to the next valid day; an ambiguous one fires at the earlier instant.
  pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.with_timezone(&self.tz).date_naive();
    (0..8)
      .filter_map(|offset| today.checked_add_days(Days::new(offset)))
      .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
      .filter_map(|date| self.tz.from_local_datetime(&date.and_time(self.time)).earliest())
      .map(|local| local.with_timezone(&Utc))
      .find(|instant| *instant > now)
      // Eight consecutive days always contain a weekday with a valid local time.
      .unwrap_or(now + chrono::Duration::days(1))
  }
}

/// Post a report to `channel` at every firing of `schedule`, forever.
///
/// A failed pass is logged and the loop moves on to the next firing.
pub async fn run<T, C>(state: AppState<T, C>, schedule: Schedule, channel: String)
where
  T: TimeTracker + 'static,
  C: ChatDirectory + ChatPublisher + 'static,
{
  loop {
    let now = Utc::now();
    let next = schedule.next_after(now);
    let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
    tracing::info!(next = %next.with_timezone(&schedule.tz), "next scheduled report");
    tokio::time::sleep(wait).await;

    match report::publish_report(&state, &channel, Utc::now()).await {
      Ok(Some(message)) => tracing::info!(channel = %message.channel, ts = %message.ts, "scheduled report posted"),
      Ok(None) => tracing::info!("scheduled pass found nobody to list"),
      Err(e) => tracing::error!(error = %e, "scheduled report failed"),
    }
  }
}
