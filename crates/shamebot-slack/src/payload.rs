//! Slack payloads: directory members from `users.list`, Events API
//! envelopes, and block-action interactions.

use serde::Deserialize;
use serde_json::Value;
use shamebot_core::{
  model::{DirectoryMember, normalize_email},
  source::MessageRef,
};

// ─── users.list ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct RawProfile {
  #[serde(default)]
  first_name: Option<String>,
  #[serde(default)]
  last_name:  Option<String>,
  #[serde(default)]
  email:      Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMember {
  id:                  Option<String>,
  #[serde(default)]
  name:                String,
  #[serde(default)]
  team_id:             String,
  #[serde(default)]
  deleted:             bool,
  #[serde(default)]
  is_bot:              bool,
  #[serde(default)]
  is_restricted:       bool,
  #[serde(default)]
  is_ultra_restricted: bool,
  #[serde(default)]
  profile:             RawProfile,
}

/// Validate one `users.list` member.
pub(crate) fn member(value: Value) -> shamebot_core::Result<DirectoryMember> {
  let malformed = |reason: String| shamebot_core::Error::MalformedRecord {
    kind: "directory member",
    reason,
  };
  let raw: RawMember = serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
  let member_id = raw
    .id
    .filter(|id| !id.is_empty())
    .ok_or_else(|| malformed(format!("{:?} has no id", raw.name)))?;

  Ok(DirectoryMember {
    member_id,
    display_name: raw.name,
    email: raw
      .profile
      .email
      .map(|e| normalize_email(&e))
      .filter(|e| !e.is_empty()),
    first_name: raw.profile.first_name.unwrap_or_default(),
    last_name: raw.profile.last_name.unwrap_or_default(),
    team_id: raw.team_id,
    deleted: raw.deleted,
    is_bot: raw.is_bot,
    is_restricted: raw.is_restricted || raw.is_ultra_restricted,
  })
}

// ─── Events API ──────────────────────────────────────────────────────────────

/// Body of a request to the Events API endpoint.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
  UrlVerification { challenge: String },
  EventCallback { event: Event },
  #[serde(other)]
  Other,
}

/// An inner event. Only messages are acted upon.
#[derive(Debug, Deserialize)]
pub struct Event {
  #[serde(rename = "type")]
  pub kind:    String,
  #[serde(default)]
  pub subtype: Option<String>,
  #[serde(default)]
  pub channel: Option<String>,
  #[serde(default)]
  pub user:    Option<String>,
  #[serde(default)]
  pub bot_id:  Option<String>,
  #[serde(default)]
  pub text:    Option<String>,
}

impl Event {
  /// A plain message posted by a person: not an edit, join, or bot post.
  pub fn is_human_message(&self) -> bool {
    self.kind == "message"
      && self.subtype.is_none()
      && self.bot_id.is_none()
      && self.user.is_some()
  }
}

// ─── Interactivity ───────────────────────────────────────────────────────────

/// The `payload` field of an interactivity request, decoded.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
  BlockActions(BlockActions),
  #[serde(other)]
  Other,
}

#[derive(Debug, Deserialize)]
pub struct ActionUser {
  pub id:       String,
  #[serde(default)]
  pub username: Option<String>,
  #[serde(default)]
  pub name:     Option<String>,
}

impl ActionUser {
  pub fn handle(&self) -> &str {
    self
      .username
      .as_deref()
      .or(self.name.as_deref())
      .unwrap_or(&self.id)
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct Container {
  #[serde(default)]
  pub channel_id: Option<String>,
  #[serde(default)]
  pub message_ts: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelRef {
  pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionMessage {
  pub ts: String,
}

#[derive(Debug, Deserialize)]
pub struct Action {
  pub action_id: String,
}

#[derive(Debug, Deserialize)]
pub struct BlockActions {
  pub user:      ActionUser,
  #[serde(default)]
  pub container: Container,
  #[serde(default)]
  pub channel:   Option<ChannelRef>,
  #[serde(default)]
  pub message:   Option<ActionMessage>,
  #[serde(default)]
  pub actions:   Vec<Action>,
}

impl BlockActions {
  pub fn has_action(&self, action_id: &str) -> bool {
    self.actions.iter().any(|a| a.action_id == action_id)
  }

  /// The message the clicked control belongs to.
  pub fn message_ref(&self) -> Option<MessageRef> {
    let channel = self
      .container
      .channel_id
      .clone()
      .or_else(|| self.channel.as_ref().map(|c| c.id.clone()))?;
    let ts = self
      .container
      .message_ts
      .clone()
      .or_else(|| self.message.as_ref().map(|m| m.ts.clone()))?;
    Some(MessageRef { channel, ts })
  }
}
