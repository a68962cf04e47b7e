//! An in-memory world shared by the arena integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use skirmish_arena::{
    AllianceQuery, Arena, ArenaConfig, CollaboratorError, CombatantSpawner, LiveParticipant,
    Notifier, ParticipantDirectory, SpawnRequest, World,
};
use skirmish_types::{
    CombatantRef, MatchPair, Notice, ParticipantId, Position, Side, TemplateId,
};
use tokio::time::{self, Instant};

pub fn pid(id: u64) -> ParticipantId {
    ParticipantId(id)
}

pub fn full_loadout() -> Vec<TemplateId> {
    vec![TemplateId(101), TemplateId(102), TemplateId(103)]
}

#[derive(Debug, Clone)]
pub struct Combatant {
    pub request: SpawnRequest,
    pub alive: bool,
    pub engaged: bool,
}

#[derive(Default)]
pub struct WorldState {
    pub online: HashSet<ParticipantId>,
    pub loadouts: HashMap<ParticipantId, Vec<TemplateId>>,
    pub alliances: HashSet<(ParticipantId, ParticipantId)>,
    pub observers: Vec<(ParticipantId, Position)>,
    pub inbox: Vec<(ParticipantId, Notice)>,
    pub broadcasts: Vec<Notice>,
    pub spawned: Vec<SpawnRequest>,
    pub combatants: HashMap<CombatantRef, Combatant>,
    /// Fail the n-th spawn call (0-based, counted across all encounters).
    pub fail_spawn_at: Option<usize>,
    /// Participants whose lookup returns an error instead of an answer.
    pub lookup_errors: HashSet<ParticipantId>,
    spawn_calls: usize,
    next_ref: u64,
}

/// Cloneable handle to the shared fake world. Every clone sees the same state.
#[derive(Clone, Default)]
pub struct FakeWorld {
    state: Arc<Mutex<WorldState>>,
}

impl FakeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> MutexGuard<'_, WorldState> {
        self.state.lock().unwrap()
    }

    /// Adds an online player with a complete three-slot loadout.
    pub fn player(&self, id: u64) -> ParticipantId {
        let p = pid(id);
        let mut state = self.state();
        state.online.insert(p);
        state.loadouts.insert(p, full_loadout());
        p
    }

    pub fn set_loadout(&self, p: ParticipantId, loadout: Vec<TemplateId>) {
        self.state().loadouts.insert(p, loadout);
    }

    pub fn go_offline(&self, p: ParticipantId) {
        self.state().online.remove(&p);
    }

    pub fn ally(&self, a: ParticipantId, b: ParticipantId) {
        let mut state = self.state();
        state.alliances.insert((a, b));
        state.alliances.insert((b, a));
    }

    pub fn observer(&self, id: u64, position: Position) -> ParticipantId {
        let p = pid(id);
        self.state().observers.push((p, position));
        p
    }

    pub fn world(&self) -> World {
        World::new(self.clone(), self.clone(), self.clone(), self.clone())
    }

    /// Every notice delivered to `p`, in order.
    pub fn notices_for(&self, p: ParticipantId) -> Vec<Notice> {
        self.state()
            .inbox
            .iter()
            .filter(|(to, _)| *to == p)
            .map(|(_, n)| n.clone())
            .collect()
    }

    /// The countdown values `p` was shown, in order.
    pub fn countdown_for(&self, p: ParticipantId) -> Vec<u32> {
        self.notices_for(p)
            .into_iter()
            .filter_map(|n| match n {
                Notice::Countdown { remaining } => Some(remaining),
                _ => None,
            })
            .collect()
    }

    pub fn last_notice(&self, p: ParticipantId) -> Option<Notice> {
        self.notices_for(p).pop()
    }

    /// Kills every familiar of `side` in `pair`.
    pub fn wipe_side(&self, pair: MatchPair, side: Side) {
        for c in self.state().combatants.values_mut() {
            if c.request.pair == pair && c.request.side == side {
                c.alive = false;
            }
        }
    }

    /// Kills one familiar of `side` in `pair`.
    pub fn kill_one(&self, pair: MatchPair, side: Side) {
        let mut state = self.state();
        if let Some(c) = state
            .combatants
            .values_mut()
            .find(|c| c.alive && c.request.pair == pair && c.request.side == side)
        {
            c.alive = false;
        }
    }

    pub fn alive_count(&self) -> usize {
        self.state().combatants.values().filter(|c| c.alive).count()
    }

    pub fn spawned_sides(&self) -> Vec<(Side, usize)> {
        self.state()
            .spawned
            .iter()
            .map(|r| (r.side, r.slot))
            .collect()
    }
}

impl ParticipantDirectory for FakeWorld {
    fn resolve(&self, id: ParticipantId) -> Result<Option<LiveParticipant>, CollaboratorError> {
        let state = self.state();
        if state.lookup_errors.contains(&id) {
            return Err(CollaboratorError::Lookup(format!("directory timeout for {id}")));
        }
        Ok(state.online.contains(&id).then(|| LiveParticipant {
            id,
            position: Position::default(),
        }))
    }

    fn loadout(&self, id: ParticipantId) -> Vec<TemplateId> {
        self.state().loadouts.get(&id).cloned().unwrap_or_default()
    }
}

impl AllianceQuery for FakeWorld {
    fn are_allied(&self, a: ParticipantId, b: ParticipantId) -> bool {
        self.state().alliances.contains(&(a, b))
    }
}

impl CombatantSpawner for FakeWorld {
    fn spawn(&mut self, request: &SpawnRequest) -> Result<CombatantRef, CollaboratorError> {
        let mut state = self.state();
        let call = state.spawn_calls;
        state.spawn_calls += 1;
        if state.fail_spawn_at == Some(call) {
            return Err(CollaboratorError::Spawn(format!(
                "no room for {} at slot {}",
                request.template, request.slot
            )));
        }
        state.next_ref += 1;
        let combatant = CombatantRef(state.next_ref);
        state.spawned.push(request.clone());
        state.combatants.insert(
            combatant,
            Combatant {
                request: request.clone(),
                alive: true,
                engaged: false,
            },
        );
        Ok(combatant)
    }

    fn engage(&mut self, combatant: CombatantRef) {
        if let Some(c) = self.state().combatants.get_mut(&combatant) {
            c.engaged = true;
        }
    }

    fn destroy(&mut self, combatant: CombatantRef) {
        if let Some(c) = self.state().combatants.get_mut(&combatant) {
            c.alive = false;
        }
    }

    fn is_alive(&self, combatant: CombatantRef) -> bool {
        self.state()
            .combatants
            .get(&combatant)
            .is_some_and(|c| c.alive)
    }

    fn remaining_count(&self, pair: MatchPair, side: Side) -> usize {
        self.state()
            .combatants
            .values()
            .filter(|c| c.alive && c.request.pair == pair && c.request.side == side)
            .count()
    }
}

impl Notifier for FakeWorld {
    fn notify_one(&mut self, participant: ParticipantId, notice: &Notice) {
        self.state().inbox.push((participant, notice.clone()));
    }

    fn observers_near(&self, position: Position, radius: f32) -> Vec<ParticipantId> {
        self.state()
            .observers
            .iter()
            .filter(|(_, at)| at.within(&position, radius))
            .map(|(p, _)| *p)
            .collect()
    }

    fn broadcast_near(&mut self, _position: Position, _radius: f32, notice: &Notice) {
        self.state().broadcasts.push(notice.clone());
    }
}

/// Default config with short, round numbers the tests can count on.
pub fn test_config() -> ArenaConfig {
    ArenaConfig {
        battle_interval: Duration::from_secs(30),
        match_start_countdown: 5,
        challenge_expiration: Duration::from_secs(20),
        match_timeout: Duration::from_secs(180),
        summon_stagger: Duration::from_millis(500),
        ..ArenaConfig::default()
    }
}

pub fn arena(fake: &FakeWorld) -> Arena {
    Arena::new(test_config(), fake.world()).unwrap()
}

/// Moves the paused clock forward and lets the arena catch up.
pub async fn advance(arena: &mut Arena, by: Duration) {
    time::advance(by).await;
    arena.advance_to(Instant::now());
}

pub fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}
