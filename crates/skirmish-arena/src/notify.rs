//! Notification fan-out.

use skirmish_types::{MatchPair, Notice, ParticipantId, Position};

use crate::Notifier;

/// A fixed list of recipients captured once and reused.
///
/// The countdown snapshots its audience when it starts: both participants
/// first, then every observer within range at that moment. Players who walk
/// into range later are not added, and players who leave keep receiving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audience {
    members: Vec<ParticipantId>,
}

impl Audience {
    /// Capture both participants plus the observers near `center`.
    pub fn snapshot(
        notifier: &dyn Notifier,
        pair: MatchPair,
        center: Position,
        radius: f32,
    ) -> Self {
        let mut members = pair.members().to_vec();
        for observer in notifier.observers_near(center, radius) {
            if !members.contains(&observer) {
                members.push(observer);
            }
        }
        Self { members }
    }

    /// Send `notice` to every member.
    pub fn announce(&self, notifier: &mut dyn Notifier, notice: &Notice) {
        for member in &self.members {
            notifier.notify_one(*member, notice);
        }
    }

    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Send `notice` to both sides of `pair`.
pub(crate) fn notify_pair(notifier: &mut dyn Notifier, pair: MatchPair, notice: &Notice) {
    notifier.notify_both(pair.a, pair.b, notice);
}
