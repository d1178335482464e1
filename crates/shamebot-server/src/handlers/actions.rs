//! `POST /slack/actions`

use axum::{
  Form,
  extract::State,
  http::StatusCode,
};
use serde::Deserialize;
use shamebot_core::source::ChatPublisher;
use shamebot_slack::{blocks::RETRACT_ACTION_ID, payload::Interaction};

use crate::{
  AppState,
  error::{Error, Result},
  report,
};

/// Slack posts interactivity as a form with one JSON-encoded field.
#[derive(Debug, Deserialize)]
pub struct ActionForm {
  pub payload: String,
}

pub async fn handler<T, C>(
  State(state): State<AppState<T, C>>,
  Form(form): Form<ActionForm>,
) -> Result<StatusCode>
where
  T: Send + Sync + 'static,
  C: ChatPublisher + 'static,
{
  let interaction: Interaction = serde_json::from_str(&form.payload)
    .map_err(|e| Error::BadRequest(format!("invalid interaction payload: {e}")))?;

  let Interaction::BlockActions(actions) = interaction else {
    return Ok(StatusCode::OK);
  };
  if !actions.has_action(RETRACT_ACTION_ID) {
    return Ok(StatusCode::OK);
  }

  let message = actions
    .message_ref()
    .ok_or_else(|| Error::BadRequest("interaction names no message".into()))?;

  tracing::info!(member = %actions.user.id, handle = actions.user.handle(), "retract pressed");
  let member = actions.user.id;

  // Slack expects the acknowledgment within three seconds.
  tokio::spawn(async move {
    if let Err(e) = report::retract_member(&state, &message, &member).await {
      tracing::error!(error = %e, %member, channel = %message.channel, ts = %message.ts, "retraction failed");
    }
  });
  Ok(StatusCode::OK)
}
