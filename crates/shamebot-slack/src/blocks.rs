//! Block Kit codec for [`MessageDocument`].
//!
//! The roster and postscript are addressed by `block_id`, so a document read
//! back from Slack decodes to the same regions it was published with. Blocks
//! this codec does not recognise are preserved as opaque segments.

use serde_json::{Value, json};
use shamebot_core::document::{MessageDocument, Segment};

pub const ROSTER_BLOCK_ID: &str = "shame_list";
pub const POSTSCRIPT_BLOCK_ID: &str = "shame_list_post_script";
pub const ACTIONS_BLOCK_ID: &str = "shame_list_actions";

/// `action_id` of the retraction button.
pub const RETRACT_ACTION_ID: &str = "remove_shame";

const RETRACT_VALUE: &str = "logged_after_shame";

/// Shown in place of an empty roster; Slack rejects empty section text.
pub const EMPTY_ROSTER_PLACEHOLDER: &str = "_Everyone on this list has logged their time._";

/// Stands in for the blank roster line of a person with no chat account.
/// Slack trims trailing whitespace, so a blank line would not survive.
pub const UNMATCHED_LINE: &str = "_(no chat account)_";

const POSTSCRIPT_IMAGE_URL: &str = "https://external-content.duckduckgo.com/iu/?u=https%3A%2F%2Ftse2.mm.bing.net%2Fth%3Fid%3DOIP.qaK2iVSf2wcVkixruiXs2QAAAA%26pid%3DApi&f=1";

// ─── Encoding ────────────────────────────────────────────────────────────────

fn mrkdwn(text: &str) -> Value { json!({ "type": "mrkdwn", "text": text }) }

fn encode_roster(text: &str) -> String {
  if text.is_empty() {
    return EMPTY_ROSTER_PLACEHOLDER.to_string();
  }
  text
    .lines()
    .map(|line| if line.trim().is_empty() { UNMATCHED_LINE } else { line })
    .map(|line| format!("{line}\n"))
    .collect()
}

fn encode_segment(segment: &Segment) -> Value {
  match segment {
    Segment::Text { text } => json!({ "type": "section", "text": mrkdwn(text) }),
    Segment::Roster { text } => {
      json!({ "type": "section", "block_id": ROSTER_BLOCK_ID, "text": mrkdwn(&encode_roster(text)) })
    }
    Segment::Divider => json!({ "type": "divider" }),
    Segment::RetractControl { label } => json!({
      "type": "actions",
      "block_id": ACTIONS_BLOCK_ID,
      "elements": [{
        "type": "button",
        "text": { "type": "plain_text", "text": label, "emoji": false },
        "value": RETRACT_VALUE,
        "action_id": RETRACT_ACTION_ID,
        "style": "primary"
      }]
    }),
    Segment::Postscript { text } => json!({
      "type": "context",
      "block_id": POSTSCRIPT_BLOCK_ID,
      "elements": [
        { "type": "image", "image_url": POSTSCRIPT_IMAGE_URL, "alt_text": "pointing finger" },
        mrkdwn(text)
      ]
    }),
    Segment::Opaque { value } => value.clone(),
  }
}

pub fn encode(document: &MessageDocument) -> Vec<Value> {
  document.segments.iter().map(encode_segment).collect()
}

/// Plain-text fallback for notifications: the first free-text segment.
pub fn fallback_text(document: &MessageDocument) -> String {
  document
    .segments
    .iter()
    .find_map(|s| match s {
      Segment::Text { text } => Some(text.clone()),
      _ => None,
    })
    .unwrap_or_else(|| "Harvest time report".to_string())
}

// ─── Decoding ────────────────────────────────────────────────────────────────

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
  value.pointer(pointer).and_then(Value::as_str)
}

/// Slack may trim trailing whitespace from stored text; every roster line is
/// given back its `\n` terminator.
fn decode_roster(text: &str) -> String {
  if text == EMPTY_ROSTER_PLACEHOLDER || text.trim().is_empty() {
    return String::new();
  }
  text
    .lines()
    .map(|line| if line == UNMATCHED_LINE { "" } else { line })
    .map(|line| format!("{line}\n"))
    .collect()
}

fn decode_postscript(block: &Value) -> Option<String> {
  block
    .get("elements")?
    .as_array()?
    .iter()
    .rev()
    .find(|e| matches!(e.get("type").and_then(Value::as_str), Some("mrkdwn" | "plain_text")))
    .and_then(|e| str_at(e, "/text"))
    .map(str::to_string)
}

fn decode_retract_control(block: &Value) -> Option<String> {
  block
    .get("elements")?
    .as_array()?
    .iter()
    .find(|e| str_at(e, "/action_id") == Some(RETRACT_ACTION_ID))
    .and_then(|e| str_at(e, "/text/text"))
    .map(str::to_string)
}

fn decode_block(block: &Value) -> Segment {
  let opaque = || Segment::Opaque { value: block.clone() };
  let kind = str_at(block, "/type");
  match (kind, str_at(block, "/block_id")) {
    (Some("section"), Some(ROSTER_BLOCK_ID)) => match str_at(block, "/text/text") {
      Some(text) => Segment::Roster { text: decode_roster(text) },
      None => Segment::Roster { text: String::new() },
    },
    (Some("context"), Some(POSTSCRIPT_BLOCK_ID)) => match decode_postscript(block) {
      Some(text) => Segment::Postscript { text },
      None => opaque(),
    },
    (Some("actions"), _) => match decode_retract_control(block) {
      Some(label) => Segment::RetractControl { label },
      None => opaque(),
    },
    (Some("divider"), _) => Segment::Divider,
    (Some("section"), _) if str_at(block, "/text/type") == Some("mrkdwn") && block.get("accessory").is_none() => {
      match str_at(block, "/text/text") {
        Some(text) => Segment::Text { text: text.to_string() },
        None => opaque(),
      }
    }
    _ => opaque(),
  }
}

pub fn decode(blocks: &[Value]) -> MessageDocument {
  MessageDocument::new(blocks.iter().map(decode_block).collect())
}
