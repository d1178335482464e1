//! Collaborator traits: where accounts, activity and directory members come
//! from, and where documents are published.
//!
//! Implemented by `shamebot-harvest` and `shamebot-slack`. The server depends
//! on these abstractions, not on any concrete client.
//!
//! All methods return `Send` futures so implementations can be driven from a
//! multi-threaded tokio runtime. No method retries; a failure is fatal to the
//! pass that made the call.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  document::MessageDocument,
  model::{Account, ActivityRecord, DirectoryMember},
};

/// Opaque address of a published document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
  pub channel: String,
  /// Platform timestamp identifying the message within the channel.
  pub ts:      String,
}

/// The time-tracking system.
pub trait TimeTracker: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every active account. Records that fail validation are skipped by the
  /// implementation, not returned.
  fn fetch_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  /// Logged hours per person for one day. People who logged nothing are
  /// absent.
  fn fetch_daily_activity(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Vec<ActivityRecord>, Self::Error>> + Send + '_;
}

/// The chat platform's member roster.
pub trait ChatDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn fetch_directory_members(
    &self,
  ) -> impl Future<Output = Result<Vec<DirectoryMember>, Self::Error>> + Send + '_;
}

/// Publishing and rewriting documents on the chat platform.
pub trait ChatPublisher: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn publish<'a>(
    &'a self,
    channel: &'a str,
    document: &'a MessageDocument,
  ) -> impl Future<Output = Result<MessageRef, Self::Error>> + Send + 'a;

  /// Overwrite a previously published document.
  fn update<'a>(
    &'a self,
    message: &'a MessageRef,
    document: &'a MessageDocument,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Read back the current contents of a published document.
  fn fetch<'a>(
    &'a self,
    message: &'a MessageRef,
  ) -> impl Future<Output = Result<MessageDocument, Self::Error>> + Send + 'a;

  /// Post plain text, used for replies that are not reports.
  fn say<'a>(
    &'a self,
    channel: &'a str,
    text: &'a str,
  ) -> impl Future<Output = Result<MessageRef, Self::Error>> + Send + 'a;
}
