//! Matching chat messages against the configured trigger phrase.

use std::{fmt, str::FromStr};

use regex::Regex;

use crate::{Error, Result};

/// A trigger phrase, decided once when configuration is loaded.
///
/// A phrase wrapped in slashes (`/shame(bot)?, go/`) is a regular expression
/// searched anywhere in the message. Anything else must equal the message
/// text, ignoring surrounding whitespace.
#[derive(Debug, Clone)]
pub enum TriggerMatcher {
  Literal(String),
  Pattern(Regex),
}

impl TriggerMatcher {
  pub fn parse(phrase: &str) -> Result<Self> {
    match phrase
      .strip_prefix('/')
      .and_then(|rest| rest.strip_suffix('/'))
    {
      Some(pattern) if !pattern.is_empty() => Regex::new(pattern)
        .map(Self::Pattern)
        .map_err(|source| Error::InvalidPattern {
          pattern: pattern.to_string(),
          source,
        }),
      _ => Ok(Self::Literal(phrase.trim().to_string())),
    }
  }

  pub fn matches(&self, text: &str) -> bool {
    match self {
      Self::Literal(phrase) => text.trim() == phrase,
      Self::Pattern(re) => re.is_match(text),
    }
  }
}

impl FromStr for TriggerMatcher {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> { Self::parse(s) }
}

impl fmt::Display for TriggerMatcher {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Literal(phrase) => f.write_str(phrase),
      Self::Pattern(re) => write!(f, "/{}/", re.as_str()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn literal_requires_equality() {
    let t = TriggerMatcher::parse("Shamebot, activate!").unwrap();
    assert!(matches!(t, TriggerMatcher::Literal(_)));
    assert!(t.matches("Shamebot, activate!"));
    assert!(t.matches("  Shamebot, activate!\n"));
    assert!(!t.matches("hey Shamebot, activate!"));
    assert!(!t.matches("shamebot, activate!"));
  }

  #[test]
  fn slashes_select_a_pattern() {
    let t = TriggerMatcher::parse("/(?i)shame ?bot/").unwrap();
    assert!(matches!(t, TriggerMatcher::Pattern(_)));
    assert!(t.matches("hey ShameBot, who forgot?"));
    assert!(!t.matches("hey bot"));
    assert_eq!(t.to_string(), "/(?i)shame ?bot/");
  }

  #[test]
  fn invalid_pattern_is_an_error() {
    let err = TriggerMatcher::parse("/(unclosed/").unwrap_err();
    assert!(matches!(err, Error::InvalidPattern { .. }));
  }

  #[test]
  fn lone_slashes_are_literal() {
    assert!(matches!(TriggerMatcher::parse("/").unwrap(), TriggerMatcher::Literal(_)));
    assert!(matches!(TriggerMatcher::parse("//").unwrap(), TriggerMatcher::Literal(_)));
  }
}
