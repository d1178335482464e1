//! Error types for `shamebot-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A collaborator record is missing a required field or carries a value
  /// the evaluation cannot use. The batch it came from continues without it.
  #[error("malformed {kind} record: {reason}")]
  MalformedRecord { kind: &'static str, reason: String },

  #[error("invalid trigger pattern {pattern:?}: {source}")]
  InvalidPattern {
    pattern: String,
    #[source]
    source:  regex::Error,
  },

  #[error("message document has no {0} region")]
  MissingRegion(&'static str),
}

impl Error {
  pub(crate) fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
    Self::MalformedRecord { kind, reason: reason.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
