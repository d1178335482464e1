//! The compliance pass and the retraction flow, wired to collaborators.

use chrono::{DateTime, Utc};
use shamebot_core::{
  day::ReportDate,
  document::MessageDocument,
  evaluate::evaluate,
  matcher::match_identities,
  model::AddressableIdentity,
  render::render,
  retract::{Outcome, retract},
  source::{ChatDirectory, ChatPublisher, MessageRef, TimeTracker},
};

use crate::{
  AppState,
  error::{Error, Result},
};

/// The date a pass starting at `now` reports on, in the configured timezone.
pub fn report_date<T, C>(state: &AppState<T, C>, now: DateTime<Utc>) -> ReportDate {
  let today = now.with_timezone(&state.config.timezone).date_naive();
  state.config.report_day.resolve(today)
}

/// Fetch everything, evaluate and match. Any collaborator failure aborts the
/// pass before anything is published.
pub async fn prepare<T, C>(
  state: &AppState<T, C>,
  date: ReportDate,
) -> Result<Vec<AddressableIdentity>>
where
  T: TimeTracker,
  C: ChatDirectory,
{
  let (accounts, activity, members) = tokio::try_join!(
    async { state.tracker.fetch_accounts().await.map_err(Error::collaborator("time tracker")) },
    async {
      state
        .tracker
        .fetch_daily_activity(date.date())
        .await
        .map_err(Error::collaborator("time tracker"))
    },
    async {
      state
        .chat
        .fetch_directory_members()
        .await
        .map_err(Error::collaborator("chat directory"))
    },
  )?;

  let under_reported = evaluate(&accounts, &activity, &state.config.policy);
  let identities = match_identities(&under_reported, &members, &state.config.directory);

  for unmatched in identities.iter().filter(|i| !i.is_addressable()) {
    tracing::warn!(name = %unmatched.name, email = %unmatched.email, "no chat member for under-reported account");
  }
  tracing::info!(
    date = %date,
    accounts = accounts.len(),
    under_reported = identities.len(),
    "compliance pass evaluated"
  );

  Ok(identities)
}

/// Render the report for `now` without publishing it. `None` when nobody is
/// under-reported.
pub async fn dry_run<T, C>(state: &AppState<T, C>, now: DateTime<Utc>) -> Result<Option<MessageDocument>>
where
  T: TimeTracker,
  C: ChatDirectory,
{
  let date = report_date(state, now);
  let identities = prepare(state, date).await?;
  Ok((!identities.is_empty()).then(|| render(&identities, &date)))
}

/// Run a full compliance pass and post the result to `channel`.
///
/// Returns `None`, and posts nothing, when nobody is under-reported.
pub async fn publish_report<T, C>(
  state: &AppState<T, C>,
  channel: &str,
  now: DateTime<Utc>,
) -> Result<Option<MessageRef>>
where
  T: TimeTracker,
  C: ChatDirectory + ChatPublisher,
{
  let Some(document) = dry_run(state, now).await? else {
    return Ok(None);
  };
  let message = state
    .chat
    .publish(channel, &document)
    .await
    .map_err(Error::collaborator("chat publisher"))?;
  Ok(Some(message))
}

/// Apply a retraction by `member_id` to the published document at `message`.
///
/// The document is re-read from the platform so the transform always sees
/// the latest text. Retractions are serialised within this process, and the
/// document is only rewritten when the retraction changed it.
pub async fn retract_member<T, C>(
  state: &AppState<T, C>,
  message: &MessageRef,
  member_id: &str,
) -> Result<Outcome>
where
  C: ChatPublisher,
{
  let _guard = state.retractions.lock().await;

  let current = state
    .chat
    .fetch(message)
    .await
    .map_err(Error::collaborator("chat publisher"))?;
  let next = retract(&current, member_id, state.config.postscript_mode)?;

  if next.document != current {
    state
      .chat
      .update(message, &next.document)
      .await
      .map_err(Error::collaborator("chat publisher"))?;
  }

  tracing::info!(
    member = member_id,
    channel = %message.channel,
    ts = %message.ts,
    outcome = ?next.outcome,
    "retraction applied"
  );
  Ok(next.outcome)
}
