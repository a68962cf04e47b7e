//! Live encounter state.
//!
//! A [`LiveEncounter`] is owned by the arena core and only the lifecycle
//! handlers in `arena.rs` change it. This module holds the data plus the
//! small pieces of bookkeeping that do not need the rest of the arena.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use skirmish_timer::TimerId;
use skirmish_types::{
    BattleGroup, CombatantRef, EncounterId, MatchPair, Outcome, Resolution, Side,
};
use tokio::time::Instant;

use crate::{Audience, Phase};

/// One running encounter, from promotion until release.
#[derive(Debug)]
pub struct LiveEncounter {
    id: EncounterId,
    pair: MatchPair,
    group_a: BattleGroup,
    group_b: BattleGroup,
    combatants_a: Vec<CombatantRef>,
    combatants_b: Vec<CombatantRef>,
    phase: Phase,
    started_at: Instant,
    allied: bool,
    /// Index of the next spawn, counting both sides (A0, B0, A1, B1, ...).
    pub(crate) spawn_step: usize,
    /// Count still to be shown; 0 means the next step opens hostilities.
    pub(crate) countdown_remaining: u32,
    pub(crate) audience: Option<Audience>,
    /// The summon-stagger or countdown timer currently in flight.
    pub(crate) step_timer: Option<TimerId>,
    pub(crate) timeout_timer: Option<TimerId>,
}

impl LiveEncounter {
    pub(crate) fn new(
        id: EncounterId,
        pair: MatchPair,
        group_a: BattleGroup,
        group_b: BattleGroup,
        allied: bool,
        started_at: Instant,
    ) -> Self {
        let capacity = group_a.len();
        Self {
            id,
            pair,
            group_a,
            group_b,
            combatants_a: Vec::with_capacity(capacity),
            combatants_b: Vec::with_capacity(capacity),
            phase: Phase::Summoning,
            started_at,
            allied,
            spawn_step: 0,
            countdown_remaining: 0,
            audience: None,
            step_timer: None,
            timeout_timer: None,
        }
    }

    pub fn id(&self) -> EncounterId {
        self.id
    }

    pub fn pair(&self) -> MatchPair {
        self.pair
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Whether the two owners are allied in the wider game.
    pub fn allied(&self) -> bool {
        self.allied
    }

    pub fn group(&self, side: Side) -> &BattleGroup {
        match side {
            Side::A => &self.group_a,
            Side::B => &self.group_b,
        }
    }

    /// Familiars spawned for `side` and still tracked.
    pub fn combatants(&self, side: Side) -> &[CombatantRef] {
        match side {
            Side::A => &self.combatants_a,
            Side::B => &self.combatants_b,
        }
    }

    /// The `(side, slot)` to spawn next, or `None` once summoning is done.
    pub(crate) fn next_spawn(&self) -> Option<(Side, usize)> {
        let total = self.group_a.len() + self.group_b.len();
        if self.spawn_step >= total {
            return None;
        }
        let side = if self.spawn_step % 2 == 0 { Side::A } else { Side::B };
        Some((side, self.spawn_step / 2))
    }

    pub(crate) fn record_spawn(&mut self, side: Side, combatant: CombatantRef) {
        match side {
            Side::A => self.combatants_a.push(combatant),
            Side::B => self.combatants_b.push(combatant),
        }
        self.spawn_step += 1;
    }

    /// Every tracked familiar, both sides.
    pub(crate) fn all_combatants(&self) -> impl Iterator<Item = CombatantRef> + '_ {
        self.combatants_a
            .iter()
            .chain(self.combatants_b.iter())
            .copied()
    }

    /// Stop tracking every familiar and hand them back for destruction.
    pub(crate) fn take_combatants(&mut self) -> Vec<CombatantRef> {
        let mut all = std::mem::take(&mut self.combatants_a);
        all.append(&mut self.combatants_b);
        all
    }

    /// Move to `target`. Panics in debug builds if the move skips a phase.
    pub(crate) fn transition(&mut self, target: Phase) {
        debug_assert!(
            self.phase.can_transition_to(target),
            "invalid phase transition {} -> {}",
            self.phase,
            target
        );
        tracing::debug!(
            encounter = %self.id,
            from = %self.phase,
            to = %target,
            "encounter phase change"
        );
        self.phase = target;
    }

    pub fn info(&self) -> EncounterInfo {
        EncounterInfo {
            id: self.id,
            pair: self.pair,
            phase: self.phase,
            combatants_a: self.combatants_a.len(),
            combatants_b: self.combatants_b.len(),
        }
    }
}

/// A snapshot of encounter metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterInfo {
    pub id: EncounterId,
    pub pair: MatchPair,
    pub phase: Phase,
    /// Familiars currently tracked per side.
    pub combatants_a: usize,
    pub combatants_b: usize,
}

/// The record kept for a resolved encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterResult {
    pub encounter: EncounterId,
    pub pair: MatchPair,
    pub outcome: Outcome,
    pub resolution: Resolution,
    pub remaining_a: usize,
    pub remaining_b: usize,
    /// Time from promotion to resolution.
    pub duration: Duration,
}
