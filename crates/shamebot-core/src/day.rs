//! Which calendar day a compliance pass evaluates.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportDay {
  /// The local date the pass runs on.
  #[default]
  Today,
  /// The previous business day. Saturday, Sunday and Monday all look back
  /// to the preceding Friday.
  Yesterday,
}

impl ReportDay {
  pub fn resolve(self, today: NaiveDate) -> ReportDate {
    let date = match self {
      ReportDay::Today => today,
      ReportDay::Yesterday => {
        let back = match today.weekday() {
          Weekday::Mon => 3,
          Weekday::Sun => 2,
          _ => 1,
        };
        today - Days::new(back)
      }
    };
    ReportDate(date)
  }
}

/// The evaluated date, in the forms the collaborators need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportDate(pub NaiveDate);

impl ReportDate {
  pub fn date(&self) -> NaiveDate { self.0 }

  /// `YYYYMMDD`, as the time-tracker report query expects.
  pub fn query(&self) -> String { self.0.format("%Y%m%d").to_string() }

  /// e.g. `October 16, 2026`.
  pub fn display(&self) -> String { self.0.format("%B %-d, %Y").to_string() }
}

impl fmt::Display for ReportDate {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.display())
  }
}
