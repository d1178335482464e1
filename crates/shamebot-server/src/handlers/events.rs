//! `POST /slack/events`

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use shamebot_core::source::{ChatDirectory, ChatPublisher, TimeTracker};
use shamebot_slack::payload::{Event, EventEnvelope};

use crate::{AppState, report};

pub async fn handler<T, C>(
  State(state): State<AppState<T, C>>,
  Json(envelope): Json<EventEnvelope>,
) -> Response
where
  T: TimeTracker + 'static,
  C: ChatDirectory + ChatPublisher + 'static,
{
  match envelope {
    EventEnvelope::UrlVerification { challenge } => challenge.into_response(),
    EventEnvelope::EventCallback { event } => {
      dispatch(state, event);
      StatusCode::OK.into_response()
    }
    EventEnvelope::Other => StatusCode::OK.into_response(),
  }
}

/// Work triggered by a message runs in the background; Slack expects an
/// acknowledgment within three seconds.
fn dispatch<T, C>(state: AppState<T, C>, event: Event)
where
  T: TimeTracker + 'static,
  C: ChatDirectory + ChatPublisher + 'static,
{
  if !event.is_human_message() {
    return;
  }
  let (Some(channel), Some(text)) = (event.channel, event.text) else {
    return;
  };
  let user = event.user.unwrap_or_default();

  if text.trim() == state.config.config_phrase {
    tracing::info!(%user, %channel, "config requested");
    tokio::spawn(async move { show_config(&state, &channel).await });
  } else if state.config.trigger.matches(&text) {
    tracing::info!(%user, %channel, "report triggered");
    tokio::spawn(async move {
      match report::publish_report(&state, &channel, Utc::now()).await {
        Ok(Some(message)) => tracing::info!(channel = %message.channel, ts = %message.ts, "report posted"),
        Ok(None) => tracing::info!(%channel, "nobody to list, nothing posted"),
        Err(e) => tracing::error!(error = %e, %channel, "triggered report failed"),
      }
    });
  }
}

async fn show_config<T, C>(state: &AppState<T, C>, channel: &str)
where
  C: ChatPublisher,
{
  let rendered = match serde_json::to_string_pretty(&state.settings.redacted()) {
    Ok(json) => json,
    Err(e) => {
      tracing::error!(error = %e, "could not serialise settings");
      return;
    }
  };
  if let Err(e) = state.chat.say(channel, &format!("```{rendered}```")).await {
    tracing::error!(error = %e, %channel, "could not post config");
  }
}
