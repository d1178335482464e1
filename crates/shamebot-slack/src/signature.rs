//! Verification of Slack request signatures.
//!
//! Slack signs `v0:{timestamp}:{raw body}` with the app's signing secret
//! (HMAC-SHA256) and sends the hex digest as `X-Slack-Signature: v0=…`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Requests older (or newer) than this are rejected as replays.
pub const MAX_SKEW_SECS: i64 = 60 * 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
  #[error("missing signature headers")]
  Missing,
  #[error("malformed timestamp or signature")]
  Malformed,
  #[error("request timestamp outside the allowed window")]
  Stale,
  #[error("signature mismatch")]
  Mismatch,
}

fn mac(secret: &str, timestamp: &str, body: &[u8]) -> HmacSha256 {
  let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
    .expect("HMAC can take key of any size");
  mac.update(b"v0:");
  mac.update(timestamp.as_bytes());
  mac.update(b":");
  mac.update(body);
  mac
}

/// Compute the `v0=…` signature Slack would send for `body`.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
  let digest = mac(secret, timestamp, body).finalize().into_bytes();
  format!("v0={}", hex::encode(digest))
}

/// Check a request's signature headers against `secret`.
///
/// `now` is the current Unix time in seconds.
pub fn verify(
  secret: &str,
  timestamp: Option<&str>,
  signature: Option<&str>,
  body: &[u8],
  now: i64,
) -> Result<(), SignatureError> {
  let (Some(timestamp), Some(signature)) = (timestamp, signature) else {
    return Err(SignatureError::Missing);
  };

  let sent_at: i64 = timestamp.parse().map_err(|_| SignatureError::Malformed)?;
  if (now - sent_at).abs() > MAX_SKEW_SECS {
    return Err(SignatureError::Stale);
  }

  let expected = signature
    .strip_prefix("v0=")
    .and_then(|hex_digest| hex::decode(hex_digest).ok())
    .ok_or(SignatureError::Malformed)?;

  mac(secret, timestamp, body)
    .verify_slice(&expected)
    .map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
  use super::*;

  const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
  const NOW: i64 = 1_531_420_618;

  #[test]
  fn matches_slack_documented_example() {
    let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
    let sig = "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503";
    assert_eq!(sign(SECRET, "1531420618", body), sig);
    assert_eq!(verify(SECRET, Some("1531420618"), Some(sig), body, NOW), Ok(()));
  }

  #[test]
  fn tampered_body_is_rejected() {
    let sig = sign(SECRET, "1531420618", b"payload=a");
    assert_eq!(
      verify(SECRET, Some("1531420618"), Some(&sig), b"payload=b", NOW),
      Err(SignatureError::Mismatch)
    );
  }

  #[test]
  fn stale_requests_are_rejected() {
    let sig = sign(SECRET, "1531420618", b"x");
    assert_eq!(
      verify(SECRET, Some("1531420618"), Some(&sig), b"x", NOW + MAX_SKEW_SECS + 1),
      Err(SignatureError::Stale)
    );
  }

  #[test]
  fn missing_or_malformed_headers_are_rejected() {
    assert_eq!(verify(SECRET, None, Some("v0=00"), b"", NOW), Err(SignatureError::Missing));
    assert_eq!(verify(SECRET, Some("soon"), Some("v0=00"), b"", NOW), Err(SignatureError::Malformed));
    assert_eq!(
      verify(SECRET, Some("1531420618"), Some("v1=zz"), b"", NOW),
      Err(SignatureError::Malformed)
    );
  }
}
