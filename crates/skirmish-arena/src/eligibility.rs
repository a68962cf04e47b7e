//! Eligibility check run before a pair is queued.

use skirmish_types::{BattleGroup, MatchPair, ParticipantId, TypesError};

use crate::{Ineligible, ParticipantDirectory};

/// Decide whether `pair` may be queued and snapshot both battle groups.
///
/// `is_engaged` reports participants that are already queued or fighting.
/// The check has no side effects; on success the returned groups are
/// copies, so later loadout edits do not reach the queued match.
///
/// # Errors
/// - [`Ineligible::AlreadyQueued`] for the first engaged participant found
/// - [`Ineligible::IncompleteGroup`] listing every side whose loadout is
///   short or holds an empty slot
/// - [`Ineligible::OversizedGroup`] listing every side whose loadout has
///   more than `team_size` entries, when no side is incomplete
pub fn check_eligible(
    pair: MatchPair,
    is_engaged: impl Fn(ParticipantId) -> bool,
    directory: &dyn ParticipantDirectory,
    team_size: usize,
) -> Result<(BattleGroup, BattleGroup), Ineligible> {
    if let Some(busy) = pair.members().into_iter().find(|p| is_engaged(*p)) {
        return Err(Ineligible::AlreadyQueued(busy));
    }

    let group_a = BattleGroup::new(&directory.loadout(pair.a), team_size);
    let group_b = BattleGroup::new(&directory.loadout(pair.b), team_size);

    match (group_a, group_b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (a, b) => {
            let mut incomplete = Vec::with_capacity(2);
            let mut oversized = Vec::with_capacity(2);
            for (participant, result) in [(pair.a, a.err()), (pair.b, b.err())] {
                match result {
                    Some(TypesError::WrongTeamSize { expected, actual }) if actual > expected => {
                        oversized.push(participant);
                    }
                    Some(_) => incomplete.push(participant),
                    None => {}
                }
            }
            if incomplete.is_empty() {
                Err(Ineligible::OversizedGroup(oversized))
            } else {
                Err(Ineligible::IncompleteGroup(incomplete))
            }
        }
    }
}
