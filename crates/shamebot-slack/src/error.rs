//! Error type for `shamebot-slack`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} returned {status}")]
  Status {
    method: &'static str,
    status: reqwest::StatusCode,
  },

  /// Slack answered `{"ok": false, "error": ...}`.
  #[error("{method} failed: {error}")]
  Api { method: &'static str, error: String },

  #[error("{method}: unexpected response: {source}")]
  Decode {
    method: &'static str,
    #[source]
    source: serde_json::Error,
  },

  #[error("message {ts} not found in channel {channel}")]
  MessageNotFound { channel: String, ts: String },

  #[error("gave up paging {method} after {pages} pages")]
  TooManyPages { method: &'static str, pages: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
