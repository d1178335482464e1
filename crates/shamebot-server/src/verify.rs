//! Request signature verification for the Slack-facing routes.

use axum::{
  body::Body,
  extract::{Request, State},
  http::{HeaderMap, StatusCode},
  middleware::Next,
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::Utc;
use shamebot_slack::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER, verify};

use crate::{AppState, error::Error};

/// Slack payloads are small; anything larger is not from Slack.
const MAX_BODY_BYTES: usize = 1024 * 1024;

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers.get(name).and_then(|v| v.to_str().ok())
}

async fn collect_body(body: Body) -> Result<Bytes, Response> {
  axum::body::to_bytes(body, MAX_BODY_BYTES)
    .await
    .map_err(|_| (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response())
}

/// Reject requests whose signature does not verify against the configured
/// signing secret. The body is buffered, checked, and handed on unchanged.
pub async fn require_signature<T, C>(
  State(state): State<AppState<T, C>>,
  req: Request,
  next: Next,
) -> Response
where
  T: Send + Sync + 'static,
  C: Send + Sync + 'static,
{
  let (parts, body) = req.into_parts();
  let bytes = match collect_body(body).await {
    Ok(b) => b,
    Err(e) => return e,
  };

  if let Err(e) = verify(
    &state.config.signing_secret,
    header(&parts.headers, TIMESTAMP_HEADER),
    header(&parts.headers, SIGNATURE_HEADER),
    &bytes,
    Utc::now().timestamp(),
  ) {
    tracing::warn!(path = %parts.uri.path(), error = %e, "rejected unsigned request");
    return Error::from(e).into_response();
  }

  next.run(Request::from_parts(parts, Body::from(bytes))).await
}
