//! Shamebot HTTP service.
//!
//! Exposes an axum [`Router`] for Slack's Events API and interactivity
//! endpoints, backed by any [`TimeTracker`] and chat platform
//! ([`ChatDirectory`] + [`ChatPublisher`]). The scheduled pass lives in
//! [`schedule`]; the pipeline both share lives in [`report`].

pub mod error;
pub mod handlers;
pub mod report;
pub mod schedule;
pub mod settings;
pub mod verify;

pub use error::Error;

use std::sync::Arc;

use axum::{
  Router,
  middleware,
  routing::{get, post},
};
use shamebot_core::source::{ChatDirectory, ChatPublisher, TimeTracker};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use settings::{BotConfig, Settings};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers and the scheduler.
pub struct AppState<T, C> {
  pub tracker:     Arc<T>,
  pub chat:        Arc<C>,
  /// As loaded; shown (redacted) by the config phrase.
  pub settings:    Arc<Settings>,
  pub config:      Arc<BotConfig>,
  /// Held for the whole read-modify-write of a retraction.
  pub retractions: Arc<Mutex<()>>,
}

impl<T, C> AppState<T, C> {
  pub fn new(tracker: T, chat: C, settings: Settings, config: BotConfig) -> Self {
    Self {
      tracker:     Arc::new(tracker),
      chat:        Arc::new(chat),
      settings:    Arc::new(settings),
      config:      Arc::new(config),
      retractions: Arc::new(Mutex::new(())),
    }
  }
}

impl<T, C> Clone for AppState<T, C> {
  fn clone(&self) -> Self {
    Self {
      tracker:     Arc::clone(&self.tracker),
      chat:        Arc::clone(&self.chat),
      settings:    Arc::clone(&self.settings),
      config:      Arc::clone(&self.config),
      retractions: Arc::clone(&self.retractions),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the service router. Slack-facing routes require a valid request
/// signature; `/healthz` does not.
pub fn router<T, C>(state: AppState<T, C>) -> Router
where
  T: TimeTracker + 'static,
  C: ChatDirectory + ChatPublisher + 'static,
{
  Router::new()
    .route("/slack/events",  post(handlers::events::handler::<T, C>))
    .route("/slack/actions", post(handlers::actions::handler::<T, C>))
    .route_layer(middleware::from_fn_with_state(
      state.clone(),
      verify::require_signature::<T, C>,
    ))
    .route("/healthz", get(handlers::health))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{sync::Mutex as StdMutex, time::Duration};

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{NaiveDate, TimeZone, Utc};
  use serde_json::json;
  use shamebot_core::{
    document::MessageDocument,
    model::{Account, ActivityRecord, DirectoryMember},
    retract::ACKNOWLEDGMENT_INTRO,
    source::MessageRef,
  };
  use shamebot_slack::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER, sign};
  use tower::ServiceExt as _;

  use super::*;
  use crate::settings::tests::{MINIMAL, parse};

  const SECRET: &str = "shh";

  #[derive(Debug, thiserror::Error)]
  #[error("transport failure")]
  struct FakeError;

  // 144000 s/week is 8 h/day.
  const FULL_TIME: i64 = 144_000;

  struct FakeTracker {
    accounts: Vec<Account>,
    activity: Vec<ActivityRecord>,
    fail:     bool,
  }

  impl TimeTracker for FakeTracker {
    type Error = FakeError;

    async fn fetch_accounts(&self) -> Result<Vec<Account>, FakeError> {
      if self.fail { Err(FakeError) } else { Ok(self.accounts.clone()) }
    }

    async fn fetch_daily_activity(
      &self,
      _date: NaiveDate,
    ) -> Result<Vec<ActivityRecord>, FakeError> {
      Ok(self.activity.clone())
    }
  }

  #[derive(Default)]
  struct FakeChat {
    members:   Vec<DirectoryMember>,
    posted:    StdMutex<Vec<(MessageRef, MessageDocument)>>,
    said:      StdMutex<Vec<(String, String)>>,
    fetches:   StdMutex<u32>,
    updates:   StdMutex<u32>,
  }

  impl FakeChat {
    fn document(&self, message: &MessageRef) -> Option<MessageDocument> {
      self
        .posted
        .lock()
        .unwrap()
        .iter()
        .find(|(m, _)| m == message)
        .map(|(_, d)| d.clone())
    }
  }

  impl ChatDirectory for FakeChat {
    type Error = FakeError;

    async fn fetch_directory_members(&self) -> Result<Vec<DirectoryMember>, FakeError> {
      Ok(self.members.clone())
    }
  }

  impl ChatPublisher for FakeChat {
    type Error = FakeError;

    async fn publish(
      &self,
      channel: &str,
      document: &MessageDocument,
    ) -> Result<MessageRef, FakeError> {
      let mut posted = self.posted.lock().unwrap();
      let message = MessageRef {
        channel: channel.to_string(),
        ts:      format!("1700000000.{:06}", posted.len()),
      };
      posted.push((message.clone(), document.clone()));
      Ok(message)
    }

    async fn update(
      &self,
      message: &MessageRef,
      document: &MessageDocument,
    ) -> Result<(), FakeError> {
      let mut posted = self.posted.lock().unwrap();
      let slot = posted.iter_mut().find(|(m, _)| m == message).ok_or(FakeError)?;
      slot.1 = document.clone();
      *self.updates.lock().unwrap() += 1;
      Ok(())
    }

    async fn fetch(&self, message: &MessageRef) -> Result<MessageDocument, FakeError> {
      *self.fetches.lock().unwrap() += 1;
      self.document(message).ok_or(FakeError)
    }

    async fn say(&self, channel: &str, text: &str) -> Result<MessageRef, FakeError> {
      self.said.lock().unwrap().push((channel.to_string(), text.to_string()));
      Ok(MessageRef { channel: channel.to_string(), ts: "1.0".into() })
    }
  }

  fn member(id: &str, first: &str, last: &str, email: &str) -> DirectoryMember {
    DirectoryMember {
      member_id:    id.into(),
      display_name: first.to_lowercase(),
      email:        Some(email.into()),
      first_name:   first.into(),
      last_name:    last.into(),
      team_id:      "T1".into(),
      ..Default::default()
    }
  }

  /// A logged a full day, B logged two hours, C logged nothing.
  fn make_state(fail: bool) -> AppState<FakeTracker, FakeChat> {
    let tracker = FakeTracker {
      accounts: vec![
        Account::new("Ada Lovelace", "ada@example.com", FULL_TIME, false, "UTC").unwrap(),
        Account::new("Bob Builder", "bob@example.com", FULL_TIME, false, "UTC").unwrap(),
        Account::new("Cy Young", "cy@example.com", FULL_TIME, false, "UTC").unwrap(),
      ],
      activity: vec![
        ActivityRecord::new("Ada Lovelace", 8.0).unwrap(),
        ActivityRecord::new("Bob Builder", 2.0).unwrap(),
      ],
      fail,
    };
    let chat = FakeChat {
      members: vec![
        member("UA", "Ada", "Lovelace", "ada@example.com"),
        member("UB", "Bob", "Builder", "bob@example.com"),
        member("UC", "Cy", "Young", "cy@example.com"),
      ],
      ..Default::default()
    };

    let mut settings = parse(MINIMAL);
    settings.schedule.enabled = false;
    let config = settings.compile().unwrap();
    AppState::new(tracker, chat, settings, config)
  }

  /// Wait for background work spawned by a handler.
  async fn wait_for(done: impl Fn() -> bool) {
    for _ in 0..100 {
      if done() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("background work did not finish");
  }

  fn noon() -> chrono::DateTime<Utc> { Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap() }

  fn signed(uri: &str, content_type: &str, body: String) -> Request<Body> {
    let ts = Utc::now().timestamp().to_string();
    let signature = sign(SECRET, &ts, body.as_bytes());
    Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, content_type)
      .header(TIMESTAMP_HEADER, ts)
      .header(SIGNATURE_HEADER, signature)
      .body(Body::from(body))
      .unwrap()
  }

  fn retract_request(message: &MessageRef, user: &str) -> Request<Body> {
    let payload = json!({
      "type": "block_actions",
      "user": { "id": user, "username": user.to_lowercase() },
      "container": { "channel_id": message.channel, "message_ts": message.ts },
      "actions": [{ "action_id": "remove_shame", "value": "logged_after_shame" }],
    });
    let body = format!("payload={}", urlencode(&payload.to_string()));
    signed("/slack/actions", "application/x-www-form-urlencoded", body)
  }

  fn urlencode(s: &str) -> String {
    s.bytes()
      .map(|b| match b {
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => (b as char).to_string(),
        _ => format!("%{b:02X}"),
      })
      .collect()
  }

  // ── Compliance pass ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn report_lists_exactly_the_under_reported() {
    let state = make_state(false);
    let message = report::publish_report(&state, "C0123", noon()).await.unwrap().unwrap();

    let doc = state.chat.document(&message).unwrap();
    let mut listed = doc.listed_members();
    listed.sort();
    assert_eq!(listed, vec!["UB", "UC"]);
    assert!(doc.segments.iter().any(|s| matches!(
      s,
      shamebot_core::document::Segment::Text { text } if text.contains("May 15, 2024")
    )));
  }

  #[tokio::test]
  async fn transport_failure_publishes_nothing() {
    let state = make_state(true);
    let result = report::publish_report(&state, "C0123", noon()).await;
    assert!(matches!(result, Err(Error::Collaborator { collaborator: "time tracker", .. })));
    assert!(state.chat.posted.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn nobody_under_reported_publishes_nothing() {
    let mut state = make_state(false);
    Arc::get_mut(&mut state.tracker).unwrap().activity = vec![
      ActivityRecord::new("Ada Lovelace", 8.0).unwrap(),
      ActivityRecord::new("Bob Builder", 9.5).unwrap(),
      ActivityRecord::new("Cy Young", 8.0).unwrap(),
    ];
    assert!(report::publish_report(&state, "C0123", noon()).await.unwrap().is_none());
    assert!(state.chat.posted.lock().unwrap().is_empty());
  }

  // ── Retraction ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn retract_button_removes_the_line_once() {
    let state = make_state(false);
    let message = report::publish_report(&state, "C0123", noon()).await.unwrap().unwrap();

    let resp = router(state.clone()).oneshot(retract_request(&message, "UB")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    wait_for(|| *state.chat.updates.lock().unwrap() == 1).await;

    let doc = state.chat.document(&message).unwrap();
    assert_eq!(doc.listed_members(), vec!["UC"]);
    let postscript = doc.postscript().unwrap();
    assert!(postscript.contains(&format!("{ACKNOWLEDGMENT_INTRO} <@UB>")));

    // A second press changes nothing and does not rewrite the message.
    let resp = router(state.clone()).oneshot(retract_request(&message, "UB")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    wait_for(|| *state.chat.fetches.lock().unwrap() == 2).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(state.chat.document(&message).unwrap(), doc);
    assert_eq!(*state.chat.updates.lock().unwrap(), 1);
  }

  #[tokio::test]
  async fn retract_button_acknowledges_before_touching_slack() {
    let state = make_state(false);
    let message = report::publish_report(&state, "C0123", noon()).await.unwrap().unwrap();

    // Hold the retraction lock so the background work cannot start.
    let guard = state.retractions.lock().await;
    let resp = router(state.clone()).oneshot(retract_request(&message, "UB")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(*state.chat.fetches.lock().unwrap(), 0);
    assert_eq!(*state.chat.updates.lock().unwrap(), 0);

    drop(guard);
    wait_for(|| *state.chat.updates.lock().unwrap() == 1).await;
    assert_eq!(state.chat.document(&message).unwrap().listed_members(), vec!["UC"]);
  }

  #[tokio::test]
  async fn concurrent_retractions_both_land() {
    let state = make_state(false);
    let message = report::publish_report(&state, "C0123", noon()).await.unwrap().unwrap();

    let (b, c) = tokio::join!(
      report::retract_member(&state, &message, "UB"),
      report::retract_member(&state, &message, "UC"),
    );
    b.unwrap();
    c.unwrap();

    let doc = state.chat.document(&message).unwrap();
    assert!(doc.listed_members().is_empty());
    let postscript = doc.postscript().unwrap();
    assert!(postscript.contains("<@UB>") && postscript.contains("<@UC>"));
  }

  #[tokio::test]
  async fn retraction_against_unknown_message_changes_nothing() {
    let state = make_state(false);
    let missing = MessageRef { channel: "C0123".into(), ts: "0.0".into() };
    let resp = router(state.clone()).oneshot(retract_request(&missing, "UB")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    wait_for(|| *state.chat.fetches.lock().unwrap() == 1).await;
    assert_eq!(*state.chat.updates.lock().unwrap(), 0);
  }

  #[tokio::test]
  async fn malformed_interaction_returns_400() {
    let state = make_state(false);
    let req = signed("/slack/actions", "application/x-www-form-urlencoded", "payload=not-json".into());
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Events ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn url_verification_echoes_the_challenge() {
    let state = make_state(false);
    let body = json!({ "type": "url_verification", "challenge": "abc123" }).to_string();
    let resp = router(state).oneshot(signed("/slack/events", "application/json", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"abc123");
  }

  fn message_event(text: &str) -> String {
    json!({
      "type": "event_callback",
      "event": { "type": "message", "channel": "C0999", "user": "UA", "text": text },
    })
    .to_string()
  }

  #[tokio::test]
  async fn trigger_phrase_posts_a_report() {
    let state = make_state(false);
    let resp = router(state.clone())
      .oneshot(signed("/slack/events", "application/json", message_event("Shamebot, activate!")))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    wait_for(|| !state.chat.posted.lock().unwrap().is_empty()).await;
    let posted = state.chat.posted.lock().unwrap();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].0.channel, "C0999");
  }

  #[tokio::test]
  async fn config_phrase_replies_without_secrets() {
    let state = make_state(false);
    router(state.clone())
      .oneshot(signed("/slack/events", "application/json", message_event("Shamebot, show config")))
      .await
      .unwrap();

    wait_for(|| !state.chat.said.lock().unwrap().is_empty()).await;
    let said = state.chat.said.lock().unwrap();
    assert_eq!(said.len(), 1);
    assert_eq!(said[0].0, "C0999");
    assert!(said[0].1.contains("Shamebot, activate!"));
    assert!(!said[0].1.contains("xoxb-1"));
    assert!(!said[0].1.contains("harvest-token"));
  }

  #[tokio::test]
  async fn other_messages_do_nothing() {
    let state = make_state(false);
    router(state.clone())
      .oneshot(signed("/slack/events", "application/json", message_event("good morning")))
      .await
      .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(state.chat.posted.lock().unwrap().is_empty());
    assert!(state.chat.said.lock().unwrap().is_empty());
  }

  // ── Signatures ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn bad_signature_returns_401() {
    let state = make_state(false);
    let body = json!({ "type": "url_verification", "challenge": "abc123" }).to_string();
    let req = Request::builder()
      .method("POST")
      .uri("/slack/events")
      .header(header::CONTENT_TYPE, "application/json")
      .header(TIMESTAMP_HEADER, Utc::now().timestamp().to_string())
      .header(SIGNATURE_HEADER, "v0=00")
      .body(Body::from(body))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn missing_signature_returns_401() {
    let state = make_state(false);
    let req = Request::builder()
      .method("POST")
      .uri("/slack/actions")
      .body(Body::from("payload={}"))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn healthz_needs_no_signature() {
    let state = make_state(false);
    let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
  }
}
