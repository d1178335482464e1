//! Slack integration for the shamebot.
//!
//! - [`client`]: Web API client implementing the core's [`ChatDirectory`] and
//!   [`ChatPublisher`] collaborators.
//! - [`blocks`]: Block Kit codec for message documents.
//! - [`payload`]: inbound Events API and interactivity payloads.
//! - [`signature`]: request-signature verification.
//!
//! [`ChatDirectory`]: shamebot_core::source::ChatDirectory
//! [`ChatPublisher`]: shamebot_core::source::ChatPublisher

pub mod blocks;
pub mod client;
pub mod error;
pub mod payload;
pub mod signature;

pub use client::{DEFAULT_API_BASE, SlackClient, SlackConfig};
pub use error::{Error, Result};
