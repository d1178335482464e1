//! Error types and axum `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use shamebot_slack::signature::SignatureError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized: {0}")]
  Unauthorized(#[from] SignatureError),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("invalid configuration: {0}")]
  Config(String),

  /// A collaborator call failed. Fatal to the pass that made it.
  #[error("{collaborator} error: {source}")]
  Collaborator {
    collaborator: &'static str,
    #[source]
    source:       Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("document error: {0}")]
  Document(#[from] shamebot_core::Error),
}

impl Error {
  pub(crate) fn collaborator<E>(collaborator: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| Self::Collaborator { collaborator, source: Box::new(e) }
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized(e) => (StatusCode::UNAUTHORIZED, e.to_string()).into_response(),
      Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
      Error::Collaborator { .. } => {
        (StatusCode::BAD_GATEWAY, self.to_string()).into_response()
      }
      Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
      Error::Document(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
