//! The arena core: challenges, queue, dispatch, and encounter lifecycle.
//!
//! [`Arena`] is plain synchronous state. It never sleeps and never spawns.
//! Whoever owns it (normally the actor in `actor.rs`) asks
//! [`Arena::next_wakeup`] when something is due, sleeps until then, and
//! calls [`Arena::advance_to`]. Every due dispatch tick and timer runs inside
//! that call, in deadline order, one after another. That is the whole
//! concurrency model: the queue, the cancellation set, and the active set
//! are only ever touched between two suspension points of a single task.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use skirmish_timer::{IntervalConfig, IntervalInfo, IntervalPolicy, IntervalTimer, TimerId, TimerQueue};
use skirmish_types::{
    BattleGroup, EncounterId, MatchPair, Notice, Outcome, ParticipantId, Resolution, Side,
};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::notify::notify_pair;
use crate::{
    eligibility, ArenaConfig, ArenaError, Audience, EncounterInfo, EncounterResult, Formation,
    Ineligible, LiveEncounter, MatchQueue, Phase, Popped, QueuePlacement, SpawnRequest, World,
};

/// Everything the arena schedules on its timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArenaTimer {
    ChallengeExpiry { pair: MatchPair, serial: u64 },
    SummonStep(EncounterId),
    CountdownStep(EncounterId),
    Timeout(EncounterId),
}

/// A challenge waiting for the target to accept.
#[derive(Debug)]
struct PendingChallenge {
    /// Distinguishes this challenge from an earlier one between the same pair.
    serial: u64,
    issued_at: Instant,
    expiry: TimerId,
}

/// What a participant is currently doing, as far as the arena knows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantStatus {
    Idle,
    Challenged { pair: MatchPair },
    Queued { position: usize, eta: Duration },
    InEncounter { encounter: EncounterId, phase: Phase },
}

/// A snapshot of arena state for status pages and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaInfo {
    pub pending_challenges: usize,
    /// Live queued matches (cancelled entries excluded).
    pub queued_matches: usize,
    /// Cancelled entries the dispatch loop has not reached yet.
    pub cancelled_entries: usize,
    pub encounters: Vec<EncounterInfo>,
    /// Most recent results, oldest first.
    pub recent_results: Vec<EncounterResult>,
    pub dispatch_ticks: u64,
    pub until_next_dispatch: Duration,
}

/// A single arena and everything queued or fighting in it.
pub struct Arena {
    config: ArenaConfig,
    world: World,
    formation: Formation,
    queue: MatchQueue,
    challenges: HashMap<MatchPair, PendingChallenge>,
    /// Reverse index: participant → the pending challenge they are part of.
    challenged: HashMap<ParticipantId, MatchPair>,
    /// The active-encounter set.
    encounters: BTreeMap<EncounterId, LiveEncounter>,
    /// Reverse index: participant → their live encounter.
    engaged: HashMap<ParticipantId, EncounterId>,
    results: VecDeque<EncounterResult>,
    clock: IntervalTimer,
    timers: TimerQueue<ArenaTimer>,
    next_encounter: u64,
    next_challenge: u64,
    /// Time of the event being handled. Follow-up timers are scheduled
    /// relative to this, so a late wake-up does not stretch a countdown.
    now: Instant,
}

impl Arena {
    /// Creates an arena. The first dispatch tick is one interval from now.
    ///
    /// # Errors
    /// [`ArenaError::InvalidConfig`] if the config fails validation.
    pub fn new(config: ArenaConfig, world: World) -> Result<Self, ArenaError> {
        let config = config.validated()?;
        let now = Instant::now();
        let clock = IntervalTimer::starting_at(
            IntervalConfig {
                period: config.battle_interval,
                policy: IntervalPolicy::Skip,
                initial_jitter_us: config.dispatch_jitter_ms.saturating_mul(1000),
            },
            now,
        );

        info!(
            team_size = config.team_size,
            interval_ms = config.battle_interval.as_millis() as u64,
            countdown = config.match_start_countdown,
            "arena created"
        );

        Ok(Self {
            formation: Formation::from_config(&config),
            config,
            world,
            queue: MatchQueue::new(),
            challenges: HashMap::new(),
            challenged: HashMap::new(),
            encounters: BTreeMap::new(),
            engaged: HashMap::new(),
            results: VecDeque::new(),
            clock,
            timers: TimerQueue::new(),
            next_encounter: 0,
            next_challenge: 0,
            now,
        })
    }

    // -----------------------------------------------------------------------
    // Challenges
    // -----------------------------------------------------------------------

    /// Issue a challenge from `challenger` to `target`.
    ///
    /// The challenge expires after `challenge_expiration` unless `target`
    /// accepts it first.
    ///
    /// # Errors
    /// - [`ArenaError::SelfChallenge`] if both are the same participant
    /// - [`ArenaError::Busy`] if either is already challenged, queued, or fighting
    pub fn challenge(
        &mut self,
        challenger: ParticipantId,
        target: ParticipantId,
    ) -> Result<MatchPair, ArenaError> {
        self.sync_clock();
        if challenger == target {
            return Err(ArenaError::SelfChallenge(challenger));
        }
        if let Some(busy) = [challenger, target].into_iter().find(|p| self.is_busy(*p)) {
            return Err(ArenaError::Busy(busy));
        }

        let pair = MatchPair::new(challenger, target);
        self.next_challenge += 1;
        let serial = self.next_challenge;
        let expiry = self.timers.schedule_at(
            self.now + self.config.challenge_expiration,
            ArenaTimer::ChallengeExpiry { pair, serial },
        );
        self.challenges.insert(
            pair,
            PendingChallenge {
                serial,
                issued_at: self.now,
                expiry,
            },
        );
        self.challenged.insert(challenger, pair);
        self.challenged.insert(target, pair);

        info!(%challenger, %target, "challenge issued");
        notify_pair(
            &mut *self.world.notifier,
            pair,
            &Notice::ChallengeIssued {
                challenger,
                target,
                expires_in_secs: self.config.challenge_expiration.as_secs(),
            },
        );
        Ok(pair)
    }

    /// Accept the pending challenge addressed to `participant` and queue it.
    ///
    /// If the pair is not eligible the challenge stays pending, so the
    /// players can fix their loadouts before it expires.
    ///
    /// # Errors
    /// - [`ArenaError::NoPendingChallenge`] if nobody challenged `participant`
    /// - [`ArenaError::NotChallenged`] if `participant` issued the challenge
    /// - [`ArenaError::Ineligible`] if the eligibility check fails
    pub fn accept(&mut self, participant: ParticipantId) -> Result<QueuePlacement, ArenaError> {
        self.sync_clock();
        let pair = *self
            .challenged
            .get(&participant)
            .ok_or(ArenaError::NoPendingChallenge(participant))?;
        if pair.b != participant {
            return Err(ArenaError::NotChallenged(participant));
        }

        let (group_a, group_b) = match self.check_eligible(pair.a, pair.b) {
            Ok(groups) => groups,
            Err(reason) => {
                debug!(%pair, %reason, "challenge not eligible for queue");
                notify_pair(
                    &mut *self.world.notifier,
                    pair,
                    &Notice::ChallengeRejected {
                        reason: reason.to_string(),
                    },
                );
                return Err(reason.into());
            }
        };

        if let Some(pending) = self.withdraw_challenge(pair) {
            debug!(
                %pair,
                waited_ms = self.now.saturating_duration_since(pending.issued_at).as_millis() as u64,
                "challenge accepted"
            );
        }
        Ok(self.enqueue(pair, group_a, group_b))
    }

    /// Drop the pending challenge `participant` is part of.
    ///
    /// Either side may call this: the target declines, the challenger
    /// withdraws. The other side is told.
    ///
    /// # Errors
    /// [`ArenaError::NoPendingChallenge`] if there is nothing to decline.
    pub fn decline(&mut self, participant: ParticipantId) -> Result<MatchPair, ArenaError> {
        self.sync_clock();
        let pair = *self
            .challenged
            .get(&participant)
            .ok_or(ArenaError::NoPendingChallenge(participant))?;
        self.withdraw_challenge(pair);

        let other = if pair.a == participant { pair.b } else { pair.a };
        info!(%pair, by = %participant, "challenge declined");
        self.world
            .notifier
            .notify_one(other, &Notice::ChallengeDeclined { by: participant });
        Ok(pair)
    }

    fn withdraw_challenge(&mut self, pair: MatchPair) -> Option<PendingChallenge> {
        let pending = self.challenges.remove(&pair)?;
        self.timers.cancel(pending.expiry);
        for p in pair.members() {
            self.challenged.remove(&p);
        }
        Some(pending)
    }

    fn expire_challenge(&mut self, pair: MatchPair, serial: u64) {
        match self.challenges.get(&pair) {
            Some(pending) if pending.serial == serial => {}
            _ => {
                debug!(%pair, "challenge already settled, expiry ignored");
                return;
            }
        }
        self.withdraw_challenge(pair);
        info!(%pair, "challenge expired");
        notify_pair(
            &mut *self.world.notifier,
            pair,
            &Notice::ChallengeExpired { pair },
        );
    }

    // -----------------------------------------------------------------------
    // Queue
    // -----------------------------------------------------------------------

    /// Decide whether `a` and `b` may be queued, snapshotting both battle groups.
    ///
    /// Has no side effects.
    ///
    /// # Errors
    /// See [`check_eligible`](crate::check_eligible).
    pub fn check_eligible(
        &self,
        a: ParticipantId,
        b: ParticipantId,
    ) -> Result<(BattleGroup, BattleGroup), Ineligible> {
        eligibility::check_eligible(
            MatchPair::new(a, b),
            |p| self.queue.contains(p) || self.engaged.contains_key(&p),
            &*self.world.directory,
            self.config.team_size,
        )
    }

    /// Queue `a` against `b` directly, without a challenge.
    ///
    /// # Errors
    /// - [`ArenaError::SelfChallenge`] if both are the same participant
    /// - [`ArenaError::Busy`] if either has a pending challenge
    /// - [`ArenaError::Ineligible`] if the eligibility check fails
    pub fn queue_match(
        &mut self,
        a: ParticipantId,
        b: ParticipantId,
    ) -> Result<QueuePlacement, ArenaError> {
        self.sync_clock();
        if a == b {
            return Err(ArenaError::SelfChallenge(a));
        }
        if let Some(busy) = [a, b].into_iter().find(|p| self.challenged.contains_key(p)) {
            return Err(ArenaError::Busy(busy));
        }
        let (group_a, group_b) = self.check_eligible(a, b)?;
        Ok(self.enqueue(MatchPair::new(a, b), group_a, group_b))
    }

    fn enqueue(&mut self, pair: MatchPair, group_a: BattleGroup, group_b: BattleGroup) -> QueuePlacement {
        let ticket = self.queue.push(pair, group_a, group_b, self.now);
        let (position, eta) = self.position_and_eta(pair.a);

        info!(
            %ticket,
            %pair,
            position,
            eta_ms = eta.as_millis() as u64,
            "match queued"
        );
        notify_pair(
            &mut *self.world.notifier,
            pair,
            &Notice::Queued {
                position,
                eta_secs: ceil_secs(eta),
            },
        );
        QueuePlacement { position, eta }
    }

    /// Cancel the queued match for `pair`, whichever way round its members
    /// are given. Returns `false` if it is not queued.
    ///
    /// Both participants are free to queue again immediately. The FIFO entry
    /// is skipped later by the dispatch loop.
    pub fn cancel(&mut self, pair: MatchPair) -> bool {
        match self.queue.cancel(pair) {
            Some(queued) => {
                info!(pair = %queued, "queued match cancelled");
                true
            }
            None => false,
        }
    }

    /// Take `participant`'s match out of the queue and tell both sides.
    ///
    /// # Errors
    /// [`ArenaError::NotQueued`] if the participant is not waiting in the queue.
    pub fn leave_queue(&mut self, participant: ParticipantId) -> Result<MatchPair, ArenaError> {
        self.sync_clock();
        let pair = self
            .queue
            .cancel_participant(participant)
            .ok_or(ArenaError::NotQueued(participant))?;
        info!(%pair, by = %participant, "queued match cancelled");
        notify_pair(
            &mut *self.world.notifier,
            pair,
            &Notice::QueueCancelled { by: participant },
        );
        Ok(pair)
    }

    /// Queue position and estimated wait for `participant`; `(0, 0)` if not queued.
    pub fn position_and_eta(&self, participant: ParticipantId) -> (usize, Duration) {
        let now = Instant::now().max(self.now);
        self.queue.position_and_eta(
            participant,
            self.clock.remaining(now),
            self.config.battle_interval,
        )
    }

    // -----------------------------------------------------------------------
    // Encounters
    // -----------------------------------------------------------------------

    /// Re-check an encounter after one of its familiars went down.
    ///
    /// If one side has nothing left standing the encounter resolves now.
    ///
    /// # Errors
    /// [`ArenaError::UnknownEncounter`] if the encounter is no longer live.
    pub fn report_casualty(&mut self, encounter: EncounterId) -> Result<(), ArenaError> {
        self.sync_clock();
        if !self.encounters.contains_key(&encounter) {
            return Err(ArenaError::UnknownEncounter(encounter));
        }
        self.check_completion(encounter);
        Ok(())
    }

    fn dispatch_tick(&mut self, info: IntervalInfo) {
        if self.queue.is_empty() {
            trace!(tick = info.tick, "no pending work");
            return;
        }

        while let Some(popped) = self.queue.pop_front() {
            let entry = match popped {
                Popped::Cancelled(entry) => {
                    debug!(ticket = %entry.ticket, pair = %entry.pair, "skipping cancelled match");
                    continue;
                }
                Popped::Live(entry) => entry,
            };

            if let Err(reason) = self.resolve_pair(entry.pair) {
                warn!(ticket = %entry.ticket, pair = %entry.pair, %reason, "queued match could not start");
                notify_pair(
                    &mut *self.world.notifier,
                    entry.pair,
                    &Notice::MatchAbandoned {
                        pair: entry.pair,
                        reason,
                    },
                );
                continue;
            }

            let pair = entry.pair;
            let waited = self.now.saturating_duration_since(entry.enqueued_at);
            let id = self.promote(pair, entry.group_a, entry.group_b);
            info!(
                tick = info.tick,
                encounter = %id,
                %pair,
                waited_ms = waited.as_millis() as u64,
                "match promoted"
            );
            self.summon_step(id);
            break;
        }
    }

    /// Check that both participants are online with a character in the world.
    fn resolve_pair(&self, pair: MatchPair) -> Result<(), String> {
        for p in pair.members() {
            match self.world.directory.resolve(p) {
                Ok(Some(_)) => {}
                Ok(None) => return Err(format!("{p} is not available")),
                Err(e) => return Err(e.to_string()),
            }
        }
        Ok(())
    }

    fn promote(&mut self, pair: MatchPair, group_a: BattleGroup, group_b: BattleGroup) -> EncounterId {
        self.next_encounter += 1;
        let id = EncounterId(self.next_encounter);
        let allied = self.world.alliances.are_allied(pair.a, pair.b);

        self.encounters.insert(
            id,
            LiveEncounter::new(id, pair, group_a, group_b, allied, self.now),
        );
        for p in pair.members() {
            self.engaged.insert(p, id);
        }
        notify_pair(
            &mut *self.world.notifier,
            pair,
            &Notice::Summoning { encounter: id, pair },
        );
        id
    }

    /// Spawn the next familiar, then wait `summon_stagger` or start the countdown.
    fn summon_step(&mut self, id: EncounterId) {
        let Some(enc) = self.encounters.get_mut(&id) else {
            debug!(encounter = %id, "summon step for released encounter");
            return;
        };
        enc.step_timer = None;
        if enc.phase() != Phase::Summoning {
            return;
        }
        let Some((side, slot)) = enc.next_spawn() else {
            self.begin_countdown(id);
            return;
        };
        let Some(template) = enc.group(side).get(slot) else {
            self.abort_encounter(id, format!("no familiar in slot {slot} of side {side}"));
            return;
        };

        let request = SpawnRequest {
            encounter: id,
            pair: enc.pair(),
            side,
            slot,
            template,
            position: self.formation.slot(side, slot),
            hostile: !enc.allied(),
        };

        match self.world.spawner.spawn(&request) {
            Ok(combatant) => {
                trace!(encounter = %id, %side, slot, %combatant, "familiar summoned");
                enc.record_spawn(side, combatant);
                if enc.next_spawn().is_some() {
                    enc.step_timer = Some(self.timers.schedule_at(
                        self.now + self.config.summon_stagger,
                        ArenaTimer::SummonStep(id),
                    ));
                } else {
                    self.begin_countdown(id);
                }
            }
            Err(e) => {
                warn!(encounter = %id, %side, slot, error = %e, "summoning failed");
                self.abort_encounter(id, e.to_string());
            }
        }
    }

    fn begin_countdown(&mut self, id: EncounterId) {
        let Some(enc) = self.encounters.get_mut(&id) else {
            return;
        };
        enc.transition(Phase::Countdown);

        let audience = Audience::snapshot(
            &*self.world.notifier,
            enc.pair(),
            self.formation.center(),
            self.config.spectate_distance,
        );
        info!(encounter = %id, audience = audience.len(), "countdown started");
        enc.audience = Some(audience);
        enc.countdown_remaining = self.config.match_start_countdown;
        self.countdown_step(id);
    }

    /// Announce the current count, or open hostilities once it reaches zero.
    fn countdown_step(&mut self, id: EncounterId) {
        let Some(enc) = self.encounters.get_mut(&id) else {
            debug!(encounter = %id, "countdown step for released encounter");
            return;
        };
        enc.step_timer = None;
        if enc.phase() != Phase::Countdown {
            return;
        }
        if enc.countdown_remaining == 0 {
            self.begin_active(id);
            return;
        }

        let notice = Notice::Countdown {
            remaining: enc.countdown_remaining,
        };
        if let Some(audience) = &enc.audience {
            audience.announce(&mut *self.world.notifier, &notice);
        }
        enc.countdown_remaining -= 1;
        enc.step_timer = Some(self.timers.schedule_at(
            self.now + Duration::from_secs(1),
            ArenaTimer::CountdownStep(id),
        ));
    }

    fn begin_active(&mut self, id: EncounterId) {
        let Some(enc) = self.encounters.get_mut(&id) else {
            return;
        };
        enc.transition(Phase::Active);
        enc.audience = None;

        for combatant in enc.all_combatants() {
            if self.world.spawner.is_alive(combatant) {
                self.world.spawner.engage(combatant);
            }
        }
        enc.timeout_timer = Some(self.timers.schedule_at(
            self.now + self.config.match_timeout,
            ArenaTimer::Timeout(id),
        ));

        let pair = enc.pair();
        info!(encounter = %id, %pair, "battle started");
        self.world.notifier.broadcast_near(
            self.formation.center(),
            self.config.spectate_distance,
            &Notice::BattleBegins { pair },
        );

        // A side can already be empty if something outside the arena killed
        // its familiars during the countdown.
        self.check_completion(id);
    }

    fn check_completion(&mut self, id: EncounterId) {
        let Some(enc) = self.encounters.get(&id) else {
            return;
        };
        if !enc.phase().is_fighting() {
            return;
        }
        let pair = enc.pair();
        let remaining_a = self.world.spawner.remaining_count(pair, Side::A);
        let remaining_b = self.world.spawner.remaining_count(pair, Side::B);
        trace!(encounter = %id, remaining_a, remaining_b, "completion check");
        if remaining_a == 0 || remaining_b == 0 {
            self.resolve(id, Resolution::Completion);
        }
    }

    fn on_timeout(&mut self, id: EncounterId) {
        match self.encounters.get_mut(&id) {
            Some(enc) if enc.phase().is_fighting() => enc.timeout_timer = None,
            _ => {
                debug!(encounter = %id, "timeout for settled encounter ignored");
                return;
            }
        }
        self.resolve(id, Resolution::Timeout);
    }

    /// Decide the result, release everything, and announce it.
    fn resolve(&mut self, id: EncounterId, resolution: Resolution) {
        let Some(mut enc) = self.encounters.remove(&id) else {
            return;
        };
        let pair = enc.pair();
        let remaining_a = self.world.spawner.remaining_count(pair, Side::A);
        let remaining_b = self.world.spawner.remaining_count(pair, Side::B);

        enc.transition(Phase::Resolved);
        self.release(&mut enc);

        let outcome = Outcome::from_remaining(pair, remaining_a, remaining_b);
        let duration = self.now.saturating_duration_since(enc.started_at());
        info!(
            encounter = %id,
            %pair,
            %resolution,
            ?outcome,
            remaining_a,
            remaining_b,
            "battle resolved"
        );
        notify_pair(
            &mut *self.world.notifier,
            pair,
            &Notice::battle_over(pair, outcome, resolution),
        );

        if self.config.result_history > 0 {
            if self.results.len() == self.config.result_history {
                self.results.pop_front();
            }
            self.results.push_back(EncounterResult {
                encounter: id,
                pair,
                outcome,
                resolution,
                remaining_a,
                remaining_b,
                duration,
            });
        }
    }

    /// Tear down an encounter that never got to fight.
    fn abort_encounter(&mut self, id: EncounterId, reason: String) {
        let Some(mut enc) = self.encounters.remove(&id) else {
            return;
        };
        let pair = enc.pair();
        self.release(&mut enc);
        warn!(encounter = %id, %pair, %reason, "encounter abandoned");
        notify_pair(
            &mut *self.world.notifier,
            pair,
            &Notice::MatchAbandoned { pair, reason },
        );
    }

    /// Free the participants, cancel the encounter's timers, and destroy
    /// every familiar that is still standing.
    fn release(&mut self, enc: &mut LiveEncounter) {
        for p in enc.pair().members() {
            if self.engaged.get(&p) == Some(&enc.id()) {
                self.engaged.remove(&p);
            }
        }
        for timer in [enc.step_timer.take(), enc.timeout_timer.take()]
            .into_iter()
            .flatten()
        {
            self.timers.cancel(timer);
        }
        for combatant in enc.take_combatants() {
            if self.world.spawner.is_alive(combatant) {
                self.world.spawner.destroy(combatant);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// The earliest instant at which something is due.
    pub fn next_wakeup(&mut self) -> Instant {
        let tick = self.clock.next_deadline();
        match self.timers.next_deadline() {
            Some(deadline) if deadline < tick => deadline,
            _ => tick,
        }
    }

    /// Run every dispatch tick and timer due at or before `now`, in order.
    ///
    /// Handlers that schedule follow-ups at or before `now` see them run in
    /// the same call. Timers win ties with the dispatch tick.
    pub fn advance_to(&mut self, now: Instant) {
        loop {
            let tick = self.clock.next_deadline();
            match self.timers.next_deadline() {
                Some(deadline) if deadline <= now && deadline <= tick => {
                    if let Some((_, timer)) = self.timers.pop_due(deadline) {
                        self.now = self.now.max(deadline);
                        self.fire(timer);
                    }
                }
                _ if tick <= now => {
                    self.now = self.now.max(tick);
                    // Small lateness keeps the cadence; a real overrun lets
                    // the clock skip ahead from `now`.
                    let observed = if now.saturating_duration_since(tick) > self.clock.period() / 10 {
                        now
                    } else {
                        tick
                    };
                    if let Some(info) = self.clock.poll(observed) {
                        self.dispatch_tick(info);
                    }
                }
                _ => break,
            }
        }
        self.now = self.now.max(now);
    }

    fn fire(&mut self, timer: ArenaTimer) {
        match timer {
            ArenaTimer::ChallengeExpiry { pair, serial } => self.expire_challenge(pair, serial),
            ArenaTimer::SummonStep(id) => self.summon_step(id),
            ArenaTimer::CountdownStep(id) => self.countdown_step(id),
            ArenaTimer::Timeout(id) => self.on_timeout(id),
        }
    }

    fn sync_clock(&mut self) {
        self.now = self.now.max(Instant::now());
    }

    /// Release everything: pending challenges, queued matches, and live
    /// encounters. Called when the arena stops.
    pub fn shutdown(&mut self) {
        let pending: Vec<MatchPair> = self.challenges.keys().copied().collect();
        for pair in pending {
            self.withdraw_challenge(pair);
        }
        for entry in self.queue.drain_live() {
            notify_pair(
                &mut *self.world.notifier,
                entry.pair,
                &Notice::MatchAbandoned {
                    pair: entry.pair,
                    reason: "the arena is closing".into(),
                },
            );
        }
        let live: Vec<EncounterId> = self.encounters.keys().copied().collect();
        for id in live {
            self.abort_encounter(id, "the arena is closing".into());
        }
        info!("arena shut down");
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Returns `true` if `participant` is challenged, queued, or fighting.
    pub fn is_busy(&self, participant: ParticipantId) -> bool {
        self.challenged.contains_key(&participant)
            || self.queue.contains(participant)
            || self.engaged.contains_key(&participant)
    }

    pub fn status(&self, participant: ParticipantId) -> ParticipantStatus {
        if let Some(enc) = self
            .engaged
            .get(&participant)
            .and_then(|id| self.encounters.get(id))
        {
            return ParticipantStatus::InEncounter {
                encounter: enc.id(),
                phase: enc.phase(),
            };
        }
        if self.queue.contains(participant) {
            let (position, eta) = self.position_and_eta(participant);
            return ParticipantStatus::Queued { position, eta };
        }
        if let Some(pair) = self.challenged.get(&participant) {
            return ParticipantStatus::Challenged { pair: *pair };
        }
        ParticipantStatus::Idle
    }

    pub fn encounter(&self, id: EncounterId) -> Option<&LiveEncounter> {
        self.encounters.get(&id)
    }

    /// The live encounter `participant` is fighting in.
    pub fn encounter_of(&self, participant: ParticipantId) -> Option<&LiveEncounter> {
        self.engaged
            .get(&participant)
            .and_then(|id| self.encounters.get(id))
    }

    pub fn encounter_count(&self) -> usize {
        self.encounters.len()
    }

    pub fn queue(&self) -> &MatchQueue {
        &self.queue
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn results(&self) -> impl Iterator<Item = &EncounterResult> {
        self.results.iter()
    }

    pub fn info(&self) -> ArenaInfo {
        ArenaInfo {
            pending_challenges: self.challenges.len(),
            queued_matches: self.queue.live_len(),
            cancelled_entries: self.queue.cancelled_len(),
            encounters: self.encounters.values().map(LiveEncounter::info).collect(),
            recent_results: self.results.iter().cloned().collect(),
            dispatch_ticks: self.clock.tick_count(),
            until_next_dispatch: self.clock.remaining(Instant::now().max(self.now)),
        }
    }
}

/// Whole seconds, rounded up, so a 0.4s wait is never shown as "0s".
fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}
