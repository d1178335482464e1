//! Rendering a fresh report document.

use crate::{
  day::ReportDate,
  document::{MessageDocument, Segment, roster_line},
  model::AddressableIdentity,
};

/// Postscript of a freshly published report.
pub const DISCLAIMER: &str = "*Shame has been applied to this message.* \nIf you would like to not have shame, log your time in Harvest and click the button above.";

/// Label of the retraction control.
pub const RETRACT_LABEL: &str = "I've logged my time";

fn headline(date: &ReportDate) -> String {
  format!(
    "Team, don't forget to report the working hours in Harvest *every day*.\n\nHere is a list of people who didn't report their working hours for *{date}*:"
  )
}

/// Roster text: one `\n`-terminated line per identity, in input order.
/// Unaddressable identities become blank lines.
pub fn roster(identities: &[AddressableIdentity]) -> String {
  identities
    .iter()
    .map(|identity| match identity.member_id.as_deref() {
      Some(id) if !id.is_empty() => roster_line(id),
      _ => "\n".to_string(),
    })
    .collect()
}

/// Build the initial report document. Pure and deterministic.
pub fn render(identities: &[AddressableIdentity], date: &ReportDate) -> MessageDocument {
  MessageDocument::new(vec![
    Segment::Text { text: headline(date) },
    Segment::Roster { text: roster(identities) },
    Segment::Divider,
    Segment::RetractControl { label: RETRACT_LABEL.to_string() },
    Segment::Postscript { text: DISCLAIMER.to_string() },
  ])
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn identity(name: &str, member_id: Option<&str>) -> AddressableIdentity {
    AddressableIdentity {
      name:      name.into(),
      email:     format!("{}@example.com", name.to_lowercase()),
      member_id: member_id.map(str::to_string),
    }
  }

  fn date() -> ReportDate {
    ReportDate(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
  }

  #[test]
  fn roster_has_one_line_per_identity_in_order() {
    let ids = [identity("b", Some("UB")), identity("a", Some("UA"))];
    let doc = render(&ids, &date());
    assert_eq!(doc.roster(), Some("<@UB>\n<@UA>\n"));
    assert_eq!(doc.roster_lines().len(), ids.len());
  }

  #[test]
  fn unaddressable_identities_render_blank() {
    let ids = [identity("a", Some("UA")), identity("x", None), identity("y", Some(""))];
    let doc = render(&ids, &date());
    assert_eq!(doc.roster(), Some("<@UA>\n\n\n"));
    assert_eq!(doc.roster_lines().len(), 3);
    assert_eq!(doc.listed_members(), vec!["UA"]);
  }

  #[test]
  fn postscript_starts_as_the_disclaimer() {
    let doc = render(&[identity("a", Some("UA"))], &date());
    assert_eq!(doc.postscript(), Some(DISCLAIMER));
  }

  #[test]
  fn headline_carries_the_display_date() {
    let doc = render(&[], &date());
    let Segment::Text { text } = &doc.segments[0] else {
      panic!("first segment should be the headline");
    };
    assert!(text.contains("*October 16, 2026*"), "{text}");
  }

  #[test]
  fn rendering_is_deterministic() {
    let ids = [identity("a", Some("UA")), identity("b", None)];
    assert_eq!(render(&ids, &date()), render(&ids, &date()));
  }
}
