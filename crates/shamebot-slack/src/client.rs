//! Slack Web API client.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use shamebot_core::{
  document::MessageDocument,
  model::DirectoryMember,
  source::{ChatDirectory, ChatPublisher, MessageRef},
};

use crate::{
  blocks,
  error::{Error, Result},
  payload,
};

/// Default Web API root.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Upper bound on `users.list` pages followed.
const MAX_PAGES: u32 = 200;

/// Connection settings for the Slack Web API.
#[derive(Debug, Clone)]
pub struct SlackConfig {
  pub api_base:  String,
  /// Bot token (`xoxb-…`).
  pub bot_token: String,
}

/// Async client for the Slack Web API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct SlackClient {
  client: Client,
  config: SlackConfig,
}

#[derive(Deserialize)]
struct Envelope {
  ok:    bool,
  #[serde(default)]
  error: Option<String>,
}

#[derive(Deserialize)]
struct UsersPage {
  #[serde(default)]
  members:           Vec<Value>,
  #[serde(default)]
  response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
  #[serde(default)]
  next_cursor: String,
}

#[derive(Deserialize)]
struct Posted {
  channel: String,
  ts:      String,
}

#[derive(Deserialize)]
struct History {
  #[serde(default)]
  messages: Vec<HistoryMessage>,
}

#[derive(Deserialize)]
struct HistoryMessage {
  ts:     String,
  #[serde(default)]
  blocks: Vec<Value>,
}

impl SlackClient {
  pub fn new(config: SlackConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    Ok(Self { client, config })
  }

  fn url(&self, method: &str) -> String {
    format!("{}/{}", self.config.api_base.trim_end_matches('/'), method)
  }

  fn get(&self, method: &str) -> RequestBuilder {
    self.client.get(self.url(method)).bearer_auth(&self.config.bot_token)
  }

  fn post(&self, method: &str) -> RequestBuilder {
    self.client.post(self.url(method)).bearer_auth(&self.config.bot_token)
  }

  /// Send `request` and decode the body, failing on HTTP errors and on
  /// Slack's `"ok": false`.
  async fn call<T: DeserializeOwned>(
    &self,
    method: &'static str,
    request: RequestBuilder,
  ) -> Result<T> {
    let resp = request.send().await?;
    if !resp.status().is_success() {
      return Err(Error::Status { method, status: resp.status() });
    }
    let body: Value = resp.json().await?;
    let envelope: Envelope = serde_json::from_value(body.clone())
      .map_err(|source| Error::Decode { method, source })?;
    if !envelope.ok {
      return Err(Error::Api {
        method,
        error: envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
      });
    }
    serde_json::from_value(body).map_err(|source| Error::Decode { method, source })
  }

  /// Every member of the workspace, following `next_cursor`.
  pub async fn list_members(&self) -> Result<Vec<DirectoryMember>> {
    let mut members = Vec::new();
    let mut cursor = String::new();

    for _ in 0..MAX_PAGES {
      let mut request = self.get("users.list").query(&[("limit", "200")]);
      if !cursor.is_empty() {
        request = request.query(&[("cursor", cursor.as_str())]);
      }
      let page: UsersPage = self.call("users.list", request).await?;

      for raw in page.members {
        match payload::member(raw) {
          Ok(member) => members.push(member),
          Err(e) => tracing::warn!(error = %e, "skipping malformed Slack member"),
        }
      }

      cursor = page
        .response_metadata
        .map(|m| m.next_cursor)
        .unwrap_or_default();
      if cursor.is_empty() {
        tracing::debug!(count = members.len(), "fetched Slack members");
        return Ok(members);
      }
    }

    Err(Error::TooManyPages { method: "users.list", pages: MAX_PAGES })
  }

  pub async fn post_document(
    &self,
    channel: &str,
    document: &MessageDocument,
  ) -> Result<MessageRef> {
    let body = json!({
      "channel": channel,
      "text": blocks::fallback_text(document),
      "blocks": blocks::encode(document),
    });
    let posted: Posted = self
      .call("chat.postMessage", self.post("chat.postMessage").json(&body))
      .await?;
    Ok(MessageRef { channel: posted.channel, ts: posted.ts })
  }

  pub async fn update_document(
    &self,
    message: &MessageRef,
    document: &MessageDocument,
  ) -> Result<()> {
    let body = json!({
      "channel": message.channel,
      "ts": message.ts,
      "text": blocks::fallback_text(document),
      "blocks": blocks::encode(document),
    });
    let _: Value = self
      .call("chat.update", self.post("chat.update").json(&body))
      .await?;
    Ok(())
  }

  /// Read a published message back through `conversations.history`.
  pub async fn fetch_document(&self, message: &MessageRef) -> Result<MessageDocument> {
    let request = self.get("conversations.history").query(&[
      ("channel", message.channel.as_str()),
      ("latest", message.ts.as_str()),
      ("inclusive", "true"),
      ("limit", "1"),
    ]);
    let history: History = self.call("conversations.history", request).await?;
    history
      .messages
      .into_iter()
      .find(|m| m.ts == message.ts)
      .map(|m| blocks::decode(&m.blocks))
      .ok_or_else(|| Error::MessageNotFound {
        channel: message.channel.clone(),
        ts:      message.ts.clone(),
      })
  }

  pub async fn post_text(&self, channel: &str, text: &str) -> Result<MessageRef> {
    let body = json!({ "channel": channel, "text": text });
    let posted: Posted = self
      .call("chat.postMessage", self.post("chat.postMessage").json(&body))
      .await?;
    Ok(MessageRef { channel: posted.channel, ts: posted.ts })
  }
}

impl ChatDirectory for SlackClient {
  type Error = Error;

  async fn fetch_directory_members(&self) -> Result<Vec<DirectoryMember>> {
    self.list_members().await
  }
}

impl ChatPublisher for SlackClient {
  type Error = Error;

  async fn publish(&self, channel: &str, document: &MessageDocument) -> Result<MessageRef> {
    self.post_document(channel, document).await
  }

  async fn update(&self, message: &MessageRef, document: &MessageDocument) -> Result<()> {
    self.update_document(message, document).await
  }

  async fn fetch(&self, message: &MessageRef) -> Result<MessageDocument> {
    self.fetch_document(message).await
  }

  async fn say(&self, channel: &str, text: &str) -> Result<MessageRef> {
    self.post_text(channel, text).await
  }
}
