//! Integration tests for the arena core, driven on a paused clock.
//!
//! With the default test config a match queued at t=0 runs on this timeline:
//!
//! ```text
//! t=30.0  dispatch tick, promoted, A0 summoned
//! t=30.5  B0   t=31.0 A1   t=31.5 B1   t=32.0 A2   t=32.5 B2
//! t=32.5  countdown 5   t=33.5 4   t=34.5 3   t=35.5 2   t=36.5 1
//! t=37.5  active, familiars engaged
//! t=217.5 timeout
//! ```

mod support;

use std::time::Duration;

use skirmish_arena::{ArenaError, Ineligible, ParticipantStatus, Phase};
use skirmish_types::{MatchPair, Notice, Outcome, Position, Resolution, Side, TemplateId};

use support::{FakeWorld, advance, arena, secs};

/// Time from the dispatch tick until hostilities open.
const TO_ACTIVE: f64 = 7.5;

fn battle_over(notices: &[Notice]) -> Vec<Notice> {
    notices
        .iter()
        .filter(|n| matches!(n, Notice::BattleOver { .. }))
        .cloned()
        .collect()
}

// =========================================================================
// Dispatch
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_after_one_interval_the_pair_is_summoning() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);

    let placement = arena.queue_match(a, b).unwrap();
    assert_eq!(placement.position, 1);
    assert_eq!(placement.eta, Duration::from_secs(30));

    advance(&mut arena, secs(29.0)).await;
    assert!(arena.encounter_of(a).is_none());

    advance(&mut arena, secs(1.0)).await;
    let enc = arena.encounter_of(a).expect("promoted on the first tick");
    assert_eq!(enc.phase(), Phase::Summoning);
    assert_eq!(enc.pair(), MatchPair::new(a, b));
    assert_eq!(arena.encounter_count(), 1);
    assert!(matches!(
        fake.notices_for(b).last(),
        Some(Notice::Summoning { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_at_most_one_match_starts_per_tick() {
    let fake = FakeWorld::new();
    let mut arena = arena(&fake);
    for i in 0..3 {
        let (a, b) = (fake.player(i * 2 + 1), fake.player(i * 2 + 2));
        arena.queue_match(a, b).unwrap();
    }

    for expected in 1..=3 {
        advance(&mut arena, secs(30.0)).await;
        assert_eq!(arena.encounter_count(), expected);
    }
    assert_eq!(arena.queue().live_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_queue_positions_and_eta_grow_with_each_match() {
    let fake = FakeWorld::new();
    let mut arena = arena(&fake);
    advance(&mut arena, secs(10.0)).await;

    let mut etas = Vec::new();
    for i in 0..3 {
        let (a, b) = (fake.player(i * 2 + 1), fake.player(i * 2 + 2));
        let placement = arena.queue_match(a, b).unwrap();
        assert_eq!(placement.position, i as usize + 1);
        etas.push(placement.eta);
    }
    assert_eq!(
        etas,
        vec![secs(20.0), secs(50.0), secs(80.0)],
        "remaining interval plus one interval per match ahead"
    );
    assert_eq!(
        fake.last_notice(support::pid(6)),
        Some(Notice::Queued {
            position: 3,
            eta_secs: 80
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_frees_both_sides_immediately() {
    let fake = FakeWorld::new();
    let (a, b, c) = (fake.player(1), fake.player(2), fake.player(3));
    let mut arena = arena(&fake);

    arena.queue_match(a, b).unwrap();
    assert!(matches!(
        arena.check_eligible(a, c),
        Err(Ineligible::AlreadyQueued(p)) if p == a
    ));

    assert!(arena.cancel(MatchPair::new(a, b)));
    assert!(arena.check_eligible(a, b).is_ok());
    assert_eq!(arena.status(a), ParticipantStatus::Idle);

    // The stale entry is still ahead in the FIFO but is skipped in the
    // same tick, so the new match starts right away.
    arena.queue_match(a, c).unwrap();
    advance(&mut arena, secs(30.0)).await;
    let enc = arena.encounter_of(a).expect("new match promoted");
    assert_eq!(enc.pair(), MatchPair::new(a, c));
    assert!(arena.encounter_of(b).is_none());
    assert_eq!(arena.queue().cancelled_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_accepts_the_pair_in_either_order() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);

    arena.queue_match(a, b).unwrap();
    assert!(arena.cancel(MatchPair::new(b, a)));
    assert_eq!(arena.status(a), ParticipantStatus::Idle);
    assert_eq!(arena.status(b), ParticipantStatus::Idle);
    assert!(!arena.cancel(MatchPair::new(a, b)), "already cancelled");

    advance(&mut arena, secs(30.0)).await;
    assert_eq!(arena.encounter_count(), 0);
    assert_eq!(arena.queue().cancelled_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_leave_queue_notifies_both() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);

    arena.queue_match(a, b).unwrap();
    assert_eq!(arena.leave_queue(b).unwrap(), MatchPair::new(a, b));
    assert_eq!(
        fake.last_notice(a),
        Some(Notice::QueueCancelled { by: b })
    );
    assert!(matches!(arena.leave_queue(b), Err(ArenaError::NotQueued(_))));

    advance(&mut arena, secs(30.0)).await;
    assert_eq!(arena.encounter_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_entry_is_abandoned_and_next_pair_starts() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let (c, d) = (fake.player(3), fake.player(4));
    let mut arena = arena(&fake);

    arena.queue_match(a, b).unwrap();
    arena.queue_match(c, d).unwrap();
    fake.go_offline(b);

    advance(&mut arena, secs(30.0)).await;
    assert!(matches!(
        fake.last_notice(a),
        Some(Notice::MatchAbandoned { .. })
    ));
    assert!(matches!(
        fake.last_notice(b),
        Some(Notice::MatchAbandoned { .. })
    ));
    assert_eq!(arena.status(a), ParticipantStatus::Idle);
    assert!(arena.encounter_of(c).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_directory_failure_counts_as_unavailable() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);

    arena.queue_match(a, b).unwrap();
    fake.state().lookup_errors.insert(a);

    advance(&mut arena, secs(30.0)).await;
    assert_eq!(arena.encounter_count(), 0);
    match fake.last_notice(b) {
        Some(Notice::MatchAbandoned { reason, .. }) => assert!(reason.contains("timeout")),
        other => panic!("expected MatchAbandoned, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_empty_queue_ticks_do_nothing() {
    let fake = FakeWorld::new();
    let mut arena = arena(&fake);

    advance(&mut arena, secs(30.0)).await;
    advance(&mut arena, secs(30.0)).await;
    let info = arena.info();
    assert_eq!(info.dispatch_ticks, 2);
    assert!(info.encounters.is_empty());
    assert!(fake.state().inbox.is_empty());
}

// =========================================================================
// Summoning and countdown
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_familiars_spawn_interleaved_on_their_slots() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);
    arena.queue_match(a, b).unwrap();

    advance(&mut arena, secs(30.0)).await;
    assert_eq!(fake.spawned_sides(), vec![(Side::A, 0)]);

    advance(&mut arena, secs(1.0)).await;
    assert_eq!(fake.spawned_sides().len(), 3);

    advance(&mut arena, secs(1.5)).await;
    assert_eq!(
        fake.spawned_sides(),
        vec![
            (Side::A, 0),
            (Side::B, 0),
            (Side::A, 1),
            (Side::B, 1),
            (Side::A, 2),
            (Side::B, 2)
        ]
    );
    assert_eq!(arena.encounter_of(a).unwrap().phase(), Phase::Countdown);

    let state = fake.state();
    assert!(state.spawned.iter().all(|r| r.hostile));
    let a_side: Vec<f32> = state
        .spawned
        .iter()
        .filter(|r| r.side == Side::A)
        .map(|r| r.position.x)
        .collect();
    let b_side: Vec<f32> = state
        .spawned
        .iter()
        .filter(|r| r.side == Side::B)
        .map(|r| r.position.x)
        .collect();
    assert!(a_side.iter().zip(&b_side).all(|(xa, xb)| xa < xb));
    assert_eq!(
        state.spawned.iter().map(|r| r.template).collect::<Vec<_>>()[..2],
        [TemplateId(101), TemplateId(101)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_countdown_reaches_each_audience_member_once_per_second() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let near = fake.observer(50, Position::new(10.0, 0.0, 0.0));
    let far = fake.observer(51, Position::new(500.0, 0.0, 0.0));
    // A participant standing nearby must not get every count twice.
    fake.observer(1, Position::new(1.0, 0.0, 0.0));
    let mut arena = arena(&fake);
    arena.queue_match(a, b).unwrap();

    advance(&mut arena, secs(30.0 + 2.5)).await;
    assert_eq!(fake.countdown_for(a), vec![5]);

    // Someone walking in after the countdown started is not added.
    let late = fake.observer(52, Position::new(0.0, 0.0, 0.0));

    advance(&mut arena, secs(5.0)).await;
    for p in [a, b, near] {
        assert_eq!(fake.countdown_for(p), vec![5, 4, 3, 2, 1], "audience member {p}");
    }
    assert!(fake.countdown_for(far).is_empty());
    assert!(fake.countdown_for(late).is_empty());

    assert_eq!(arena.encounter_of(a).unwrap().phase(), Phase::Active);
    let state = fake.state();
    assert!(state.combatants.values().all(|c| c.engaged));
    assert_eq!(
        state.broadcasts,
        vec![Notice::BattleBegins {
            pair: MatchPair::new(a, b)
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn test_allied_owners_get_non_hostile_familiars() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    fake.ally(a, b);
    let mut arena = arena(&fake);
    arena.queue_match(a, b).unwrap();

    advance(&mut arena, secs(30.0 + TO_ACTIVE)).await;
    let enc = arena.encounter_of(a).unwrap();
    assert!(enc.allied());
    assert_eq!(enc.phase(), Phase::Active);
    let state = fake.state();
    assert_eq!(state.spawned.len(), 6);
    assert!(state.spawned.iter().all(|r| !r.hostile));
    assert!(state.combatants.values().all(|c| c.engaged));
}

#[tokio::test(start_paused = true)]
async fn test_spawn_failure_tears_the_encounter_down() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    fake.state().fail_spawn_at = Some(2);
    let mut arena = arena(&fake);
    arena.queue_match(a, b).unwrap();

    advance(&mut arena, secs(31.0)).await;
    assert_eq!(arena.encounter_count(), 0);
    assert_eq!(fake.state().spawned.len(), 2);
    assert_eq!(fake.alive_count(), 0, "already spawned familiars are removed");
    assert!(matches!(
        fake.last_notice(a),
        Some(Notice::MatchAbandoned { .. })
    ));
    assert_eq!(arena.status(b), ParticipantStatus::Idle);

    // Nothing left behind fires later.
    advance(&mut arena, secs(10.0)).await;
    assert!(fake.countdown_for(a).is_empty());
}

// =========================================================================
// Resolution
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_wiping_side_a_makes_b_the_winner() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);
    arena.queue_match(a, b).unwrap();
    advance(&mut arena, secs(30.0 + TO_ACTIVE)).await;

    let pair = MatchPair::new(a, b);
    let id = arena.encounter_of(a).unwrap().id();
    fake.kill_one(pair, Side::B);
    fake.wipe_side(pair, Side::A);
    arena.report_casualty(id).unwrap();

    assert!(arena.encounter(id).is_none());
    assert_eq!(fake.alive_count(), 0, "survivors are removed");
    let over = battle_over(&fake.notices_for(a));
    assert_eq!(
        over,
        vec![Notice::BattleOver {
            pair,
            outcome: Outcome::Victory {
                winner: b,
                loser: a
            },
            resolution: Resolution::Completion,
        }]
    );
    assert_eq!(over[0].winning_side(), Some(Side::B));

    let result = arena.results().next().unwrap();
    assert_eq!(result.remaining_a, 0);
    assert_eq!(result.remaining_b, 2);
    assert_eq!(arena.status(a), ParticipantStatus::Idle);
    assert!(arena.check_eligible(a, b).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_after_completion_is_ignored() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);
    arena.queue_match(a, b).unwrap();
    advance(&mut arena, secs(30.0 + TO_ACTIVE)).await;

    let id = arena.encounter_of(a).unwrap().id();
    fake.wipe_side(MatchPair::new(a, b), Side::B);
    arena.report_casualty(id).unwrap();

    advance(&mut arena, secs(200.0)).await;
    assert_eq!(battle_over(&fake.notices_for(a)).len(), 1);
    assert_eq!(arena.results().count(), 1);
    assert!(matches!(
        arena.report_casualty(id),
        Err(ArenaError::UnknownEncounter(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_timeout_compares_survivors() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);
    arena.queue_match(a, b).unwrap();
    advance(&mut arena, secs(30.0 + TO_ACTIVE)).await;

    fake.kill_one(MatchPair::new(a, b), Side::B);
    advance(&mut arena, secs(179.0)).await;
    assert_eq!(arena.encounter_count(), 1);

    advance(&mut arena, secs(1.0)).await;
    assert_eq!(arena.encounter_count(), 0);
    assert_eq!(
        fake.last_notice(b),
        Some(Notice::BattleOver {
            pair: MatchPair::new(a, b),
            outcome: Outcome::Victory {
                winner: a,
                loser: b
            },
            resolution: Resolution::Timeout,
        })
    );
    assert_eq!(fake.alive_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_equal_survivors_at_timeout_is_a_tie() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);
    arena.queue_match(a, b).unwrap();
    advance(&mut arena, secs(30.0 + TO_ACTIVE + 180.0)).await;

    let result = arena.results().next().expect("resolved by timeout");
    assert_eq!(result.outcome, Outcome::Tie);
    assert_eq!(result.resolution, Resolution::Timeout);
    assert_eq!(result.duration, secs(TO_ACTIVE + 180.0));
}

#[tokio::test(start_paused = true)]
async fn test_side_emptied_during_countdown_resolves_on_start() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);
    arena.queue_match(a, b).unwrap();
    advance(&mut arena, secs(33.0)).await;

    fake.wipe_side(MatchPair::new(a, b), Side::A);
    // Casualties during the countdown do not end it early.
    let id = arena.encounter_of(a).unwrap().id();
    arena.report_casualty(id).unwrap();
    assert_eq!(arena.encounter(id).unwrap().phase(), Phase::Countdown);

    advance(&mut arena, secs(5.0)).await;
    assert!(arena.encounter(id).is_none());
    assert_eq!(
        battle_over(&fake.notices_for(b))[0].winning_side(),
        Some(Side::B)
    );
}

// =========================================================================
// Challenges
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_accepted_challenge_is_queued() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);

    let pair = arena.challenge(a, b).unwrap();
    assert_eq!(arena.status(b), ParticipantStatus::Challenged { pair });
    assert!(matches!(
        fake.last_notice(b),
        Some(Notice::ChallengeIssued { expires_in_secs: 20, .. })
    ));
    assert!(matches!(arena.accept(a), Err(ArenaError::NotChallenged(_))));

    advance(&mut arena, secs(5.0)).await;
    let placement = arena.accept(b).unwrap();
    assert_eq!(placement.position, 1);
    assert_eq!(placement.eta, secs(25.0));
    assert_eq!(arena.info().pending_challenges, 0);

    // The expiry timer was cancelled with the challenge.
    advance(&mut arena, secs(20.0)).await;
    assert!(
        !fake
            .notices_for(a)
            .iter()
            .any(|n| matches!(n, Notice::ChallengeExpired { .. }))
    );
    assert!(matches!(
        arena.status(a),
        ParticipantStatus::Queued { position: 1, .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_unanswered_challenge_expires() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);

    let pair = arena.challenge(a, b).unwrap();
    advance(&mut arena, secs(19.0)).await;
    assert_eq!(arena.info().pending_challenges, 1);

    advance(&mut arena, secs(1.0)).await;
    assert_eq!(fake.last_notice(a), Some(Notice::ChallengeExpired { pair }));
    assert_eq!(fake.last_notice(b), Some(Notice::ChallengeExpired { pair }));
    assert_eq!(arena.status(b), ParticipantStatus::Idle);
    assert!(matches!(
        arena.accept(b),
        Err(ArenaError::NoPendingChallenge(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_old_expiry_does_not_cancel_a_new_challenge() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);

    arena.challenge(a, b).unwrap();
    arena.decline(a).unwrap();
    advance(&mut arena, secs(10.0)).await;
    arena.challenge(a, b).unwrap();

    advance(&mut arena, secs(10.0)).await;
    assert_eq!(arena.info().pending_challenges, 1);
    advance(&mut arena, secs(10.0)).await;
    assert_eq!(arena.info().pending_challenges, 0);
}

#[tokio::test(start_paused = true)]
async fn test_decline_tells_the_other_side() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);

    arena.challenge(a, b).unwrap();
    assert_eq!(arena.decline(b).unwrap(), MatchPair::new(a, b));
    assert_eq!(
        fake.last_notice(a),
        Some(Notice::ChallengeDeclined { by: b })
    );
    assert_eq!(arena.status(a), ParticipantStatus::Idle);
    assert!(matches!(
        arena.decline(b),
        Err(ArenaError::NoPendingChallenge(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_busy_participants_cannot_be_challenged() {
    let fake = FakeWorld::new();
    let (a, b, c) = (fake.player(1), fake.player(2), fake.player(3));
    let mut arena = arena(&fake);

    assert!(matches!(
        arena.challenge(a, a),
        Err(ArenaError::SelfChallenge(_))
    ));
    arena.challenge(a, b).unwrap();
    assert!(matches!(arena.challenge(c, b), Err(ArenaError::Busy(p)) if p == b));
    assert!(matches!(arena.queue_match(a, c), Err(ArenaError::Busy(p)) if p == a));
}

#[tokio::test(start_paused = true)]
async fn test_ineligible_accept_keeps_the_challenge() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    fake.set_loadout(b, vec![TemplateId(101), TemplateId::EMPTY, TemplateId(103)]);
    let mut arena = arena(&fake);

    arena.challenge(a, b).unwrap();
    let err = arena.accept(b).unwrap_err();
    assert!(matches!(
        err,
        ArenaError::Ineligible(Ineligible::IncompleteGroup(ref who)) if who == &vec![b]
    ));
    assert!(matches!(
        fake.last_notice(a),
        Some(Notice::ChallengeRejected { .. })
    ));
    assert_eq!(arena.info().pending_challenges, 1);

    fake.set_loadout(b, support::full_loadout());
    assert!(arena.accept(b).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_loadout_edits_after_queueing_do_not_reach_the_match() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let mut arena = arena(&fake);
    arena.queue_match(a, b).unwrap();

    fake.set_loadout(a, vec![TemplateId(900), TemplateId(901), TemplateId(902)]);
    advance(&mut arena, secs(30.0)).await;
    assert_eq!(fake.state().spawned[0].template, TemplateId(101));
}

// =========================================================================
// Shutdown and info
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_shutdown_releases_everything() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let (c, d) = (fake.player(3), fake.player(4));
    let (e, f) = (fake.player(5), fake.player(6));
    let mut arena = arena(&fake);
    arena.queue_match(a, b).unwrap();
    arena.queue_match(c, d).unwrap();
    arena.challenge(e, f).unwrap();
    advance(&mut arena, secs(33.0)).await;

    arena.shutdown();
    assert_eq!(fake.alive_count(), 0);
    for p in [a, b, c, d] {
        assert!(matches!(
            fake.last_notice(p),
            Some(Notice::MatchAbandoned { .. })
        ));
        assert_eq!(arena.status(p), ParticipantStatus::Idle);
    }
    let info = arena.info();
    assert_eq!(info.pending_challenges, 0);
    assert_eq!(info.queued_matches, 0);
    assert!(info.encounters.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_info_reports_live_state_and_bounded_history() {
    let fake = FakeWorld::new();
    let (a, b) = (fake.player(1), fake.player(2));
    let config = skirmish_arena::ArenaConfig {
        result_history: 1,
        ..support::test_config()
    };
    let mut arena = skirmish_arena::Arena::new(config, fake.world()).unwrap();

    for round in 0..2 {
        arena.queue_match(a, b).unwrap();
        advance(&mut arena, secs(30.0)).await;
        let info = arena.info();
        assert_eq!(info.encounters.len(), 1);
        assert_eq!(info.encounters[0].phase, Phase::Summoning);

        advance(&mut arena, secs(TO_ACTIVE)).await;
        let id = arena.encounter_of(a).unwrap().id();
        fake.wipe_side(MatchPair::new(a, b), Side::A);
        arena.report_casualty(id).unwrap();
        assert_eq!(arena.info().recent_results.len(), 1, "round {round}");
        // Re-align with the dispatch clock for the next round.
        advance(&mut arena, secs(30.0 - TO_ACTIVE)).await;
    }

    let info = arena.info();
    assert_eq!(info.recent_results[0].encounter.0, 2);
    assert!(info.dispatch_ticks >= 2);
}
