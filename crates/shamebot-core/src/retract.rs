//! The retraction state machine.
//!
//! A retraction is a pure transform from (current document, member id) to
//! the next document. All state lives in the document's roster and
//! postscript text; nothing is stored anywhere else.
//!
//! The postscript has two implicit states. In *disclaimer* state it holds no
//! [`ACKNOWLEDGMENT_INTRO`]; the first retraction appends the intro and a
//! mention. In *acknowledgment* state each new member is appended to the
//! comma-joined list, and a member already mentioned is left alone.

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  document::{MessageDocument, mention, roster_line},
};

/// Marks a postscript that has switched to acknowledgment mode.
pub const ACKNOWLEDGMENT_INTRO: &str = "These users have regained their pride and dignity:";

/// Whether retractions are acknowledged in the postscript.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PostscriptMode {
  #[default]
  Acknowledge,
  /// Remove the roster line and say nothing about it.
  PretendItNeverHappened,
}

impl PostscriptMode {
  pub fn from_pretend_flag(pretend_it_never_happened: bool) -> Self {
    if pretend_it_never_happened {
      Self::PretendItNeverHappened
    } else {
      Self::Acknowledge
    }
  }
}

/// What a retraction did to the postscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// First acknowledgment; the postscript switched mode.
  FirstAcknowledgment,
  /// Appended to an existing acknowledgment list.
  Acknowledged,
  /// The member was already acknowledged; nothing changed.
  AlreadyAcknowledged,
  /// Postscript left alone by [`PostscriptMode::PretendItNeverHappened`].
  Silent,
  /// No member id; the document is returned unchanged.
  Ignored,
}

/// The next document together with what happened.
#[derive(Debug, Clone, PartialEq)]
pub struct Retraction {
  pub document: MessageDocument,
  pub outcome:  Outcome,
}

/// Member ids acknowledged in a postscript, in the order they were added.
pub fn acknowledged(postscript: &str) -> Vec<&str> {
  let Some((_, list)) = postscript.split_once(ACKNOWLEDGMENT_INTRO) else {
    return Vec::new();
  };
  list
    .split(',')
    .filter_map(|m| m.trim().strip_prefix("<@")?.strip_suffix('>'))
    .collect()
}

/// Apply a retraction by `member_id` to `document`.
///
/// Every occurrence of the member's exact roster line (`<@id>\n`) is
/// removed; a line that merely shares a prefix is never touched. Applying
/// the same retraction twice yields the same document as applying it once.
///
/// Fails with [`Error::MissingRegion`] when the document has no roster, or
/// no postscript while acknowledging.
pub fn retract(
  document: &MessageDocument,
  member_id: &str,
  mode: PostscriptMode,
) -> Result<Retraction> {
  if member_id.is_empty() {
    return Ok(Retraction {
      document: document.clone(),
      outcome:  Outcome::Ignored,
    });
  }

  let mut next = document.clone();

  let roster = next.roster_mut().ok_or(Error::MissingRegion("roster"))?;
  *roster = roster.replace(&roster_line(member_id), "");

  let outcome = match mode {
    PostscriptMode::PretendItNeverHappened => Outcome::Silent,
    PostscriptMode::Acknowledge => {
      let postscript = next
        .postscript_mut()
        .ok_or(Error::MissingRegion("postscript"))?;
      let reference = mention(member_id);
      if !postscript.contains(ACKNOWLEDGMENT_INTRO) {
        postscript.push('\n');
        postscript.push_str(ACKNOWLEDGMENT_INTRO);
        postscript.push(' ');
        postscript.push_str(&reference);
        Outcome::FirstAcknowledgment
      } else if acknowledged(postscript).contains(&member_id) {
        Outcome::AlreadyAcknowledged
      } else {
        postscript.push_str(", ");
        postscript.push_str(&reference);
        Outcome::Acknowledged
      }
    }
  };

  Ok(Retraction { document: next, outcome })
}
