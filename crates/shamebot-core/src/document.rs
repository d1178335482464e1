//! The message document: the published report and the only state the
//! retraction protocol carries.
//!
//! A document is an ordered list of display segments. Two of them are
//! addressed by meaning rather than position: the roster (one line per
//! listed member) and the postscript (disclaimer, then acknowledgments).
//! Everything else is carried through untouched.

use serde::{Deserialize, Serialize};

/// Mention reference for a member, as the chat platform renders it.
pub fn mention(member_id: &str) -> String { format!("<@{member_id}>") }

/// The exact roster line for a member, delimiter included.
pub fn roster_line(member_id: &str) -> String { format!("{}\n", mention(member_id)) }

/// One display segment of a [`MessageDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
  /// Free text with no special meaning.
  Text { text: String },
  /// The roster region.
  Roster { text: String },
  Divider,
  /// The control a listed member uses to retract their line.
  RetractControl { label: String },
  /// The postscript region.
  Postscript { text: String },
  /// A segment this system did not produce; preserved verbatim.
  Opaque { value: serde_json::Value },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageDocument {
  pub segments: Vec<Segment>,
}

impl MessageDocument {
  pub fn new(segments: Vec<Segment>) -> Self { Self { segments } }

  pub fn roster(&self) -> Option<&str> {
    self.segments.iter().find_map(|s| match s {
      Segment::Roster { text } => Some(text.as_str()),
      _ => None,
    })
  }

  pub fn postscript(&self) -> Option<&str> {
    self.segments.iter().find_map(|s| match s {
      Segment::Postscript { text } => Some(text.as_str()),
      _ => None,
    })
  }

  pub(crate) fn roster_mut(&mut self) -> Option<&mut String> {
    self.segments.iter_mut().find_map(|s| match s {
      Segment::Roster { text } => Some(text),
      _ => None,
    })
  }

  pub(crate) fn postscript_mut(&mut self) -> Option<&mut String> {
    self.segments.iter_mut().find_map(|s| match s {
      Segment::Postscript { text } => Some(text),
      _ => None,
    })
  }

  /// Roster lines without their delimiters. Unaddressable entries show up
  /// as empty strings.
  pub fn roster_lines(&self) -> Vec<&str> {
    self.roster().map(|r| r.lines().collect()).unwrap_or_default()
  }

  /// Member ids currently listed in the roster.
  pub fn listed_members(&self) -> Vec<&str> {
    self
      .roster_lines()
      .into_iter()
      .filter_map(|line| line.strip_prefix("<@")?.strip_suffix('>'))
      .filter(|id| !id.is_empty())
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn regions_are_found_by_kind() {
    let doc = MessageDocument::new(vec![
      Segment::Text { text: "hello".into() },
      Segment::Divider,
      Segment::Postscript { text: "ps".into() },
      Segment::Roster { text: "<@U1>\n\n<@U2>\n".into() },
    ]);
    assert_eq!(doc.roster(), Some("<@U1>\n\n<@U2>\n"));
    assert_eq!(doc.postscript(), Some("ps"));
    assert_eq!(doc.roster_lines(), vec!["<@U1>", "", "<@U2>"]);
    assert_eq!(doc.listed_members(), vec!["U1", "U2"]);
  }

  #[test]
  fn missing_regions_are_none() {
    let doc = MessageDocument::default();
    assert_eq!(doc.roster(), None);
    assert_eq!(doc.postscript(), None);
    assert!(doc.roster_lines().is_empty());
  }
}
