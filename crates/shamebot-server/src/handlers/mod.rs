//! HTTP handlers, one module per endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/slack/events` | Events API: URL verification, trigger and config phrases |
//! | `POST` | `/slack/actions` | Interactivity: the retract button |
//! | `GET`  | `/healthz` | Unauthenticated liveness probe |

pub mod actions;
pub mod events;

/// `GET /healthz`
pub async fn health() -> &'static str { "ok" }
