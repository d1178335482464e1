//! Error type for `shamebot-harvest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("GET {path} returned {status}")]
  Status {
    path:   String,
    status: reqwest::StatusCode,
  },

  #[error("GET {path}: response has no {key:?} array")]
  UnexpectedShape { path: String, key: &'static str },

  #[error("GET {path}: gave up after {max} pages", max = MAX_PAGES)]
  TooManyPages { path: String },
}

/// Upper bound on pages followed for one listing.
pub(crate) const MAX_PAGES: u32 = 500;

pub type Result<T, E = Error> = std::result::Result<T, E>;
