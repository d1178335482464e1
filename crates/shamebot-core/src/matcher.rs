//! Identity matching between the time tracker and the chat directory.
//!
//! The join is deliberately loose: email equality, or equality of the
//! space-joined first and last name. Two people sharing a full name will be
//! merged onto whichever member is found first. That is a known limitation;
//! the name join exists for members whose email is hidden from the
//! directory.

use crate::{
  model::{AddressableIdentity, DirectoryMember, UnderReportedIdentity},
  policy::DirectoryPolicy,
};

fn is_match(identity: &UnderReportedIdentity, member: &DirectoryMember) -> bool {
  member.email.as_deref() == Some(identity.email.as_str())
    || member.full_name() == identity.name
}

/// Resolve each identity to a directory member.
///
/// Members are first filtered through `policy`. The first member matching an
/// identity wins. Identities with no match are still returned, with
/// `member_id: None`, in the same position.
pub fn match_identities(
  identities: &[UnderReportedIdentity],
  members: &[DirectoryMember],
  policy: &DirectoryPolicy,
) -> Vec<AddressableIdentity> {
  let eligible: Vec<&DirectoryMember> =
    members.iter().filter(|m| policy.admits(m)).collect();

  identities
    .iter()
    .map(|identity| AddressableIdentity {
      name:      identity.name.clone(),
      email:     identity.email.clone(),
      member_id: eligible
        .iter()
        .find(|m| is_match(identity, m))
        .map(|m| m.member_id.clone()),
    })
    .collect()
}
