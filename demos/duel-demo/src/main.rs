use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rand::Rng;
use skirmish::prelude::*;

// ---------------------------------------------------------------------------
// In-memory world
// ---------------------------------------------------------------------------

const MAX_HP: i32 = 100;

#[derive(Debug)]
struct Familiar {
    encounter: EncounterId,
    side: Side,
    template: TemplateId,
    pair: MatchPair,
    hp: i32,
    engaged: bool,
}

#[derive(Default)]
struct Realm {
    online: HashSet<ParticipantId>,
    loadouts: HashMap<ParticipantId, Vec<TemplateId>>,
    guilds: HashMap<ParticipantId, u32>,
    /// Ordered so a seeded round is reproducible.
    familiars: BTreeMap<CombatantRef, Familiar>,
    next_ref: u64,
}

impl Realm {
    fn add_player(&mut self, id: ParticipantId, guild: u32, loadout: Vec<TemplateId>) {
        self.online.insert(id);
        self.guilds.insert(id, guild);
        self.loadouts.insert(id, loadout);
    }

    fn alive(&self, c: &CombatantRef) -> bool {
        self.familiars.get(c).is_some_and(|f| f.hp > 0)
    }
}

/// Every collaborator trait is implemented on a clone of the same realm.
#[derive(Clone, Default)]
struct SharedRealm(Arc<Mutex<Realm>>);

impl SharedRealm {
    fn lock(&self) -> MutexGuard<'_, Realm> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn world(&self) -> World {
        World::new(self.clone(), self.clone(), self.clone(), self.clone())
    }
}

impl ParticipantDirectory for SharedRealm {
    fn resolve(&self, id: ParticipantId) -> Result<Option<LiveParticipant>, CollaboratorError> {
        Ok(self.lock().online.contains(&id).then(|| LiveParticipant {
            id,
            position: Position::default(),
        }))
    }

    fn loadout(&self, id: ParticipantId) -> Vec<TemplateId> {
        self.lock().loadouts.get(&id).cloned().unwrap_or_default()
    }
}

impl AllianceQuery for SharedRealm {
    fn are_allied(&self, a: ParticipantId, b: ParticipantId) -> bool {
        let realm = self.lock();
        matches!((realm.guilds.get(&a), realm.guilds.get(&b)), (Some(x), Some(y)) if x == y)
    }
}

impl CombatantSpawner for SharedRealm {
    fn spawn(&mut self, request: &SpawnRequest) -> Result<CombatantRef, CollaboratorError> {
        let mut realm = self.lock();
        realm.next_ref += 1;
        let combatant = CombatantRef(realm.next_ref);
        realm.familiars.insert(
            combatant,
            Familiar {
                encounter: request.encounter,
                side: request.side,
                template: request.template,
                pair: request.pair,
                hp: MAX_HP,
                engaged: false,
            },
        );
        tracing::debug!(
            %combatant,
            template = %request.template,
            x = request.position.x,
            y = request.position.y,
            hostile = request.hostile,
            "familiar appears"
        );
        Ok(combatant)
    }

    fn engage(&mut self, combatant: CombatantRef) {
        if let Some(f) = self.lock().familiars.get_mut(&combatant) {
            f.engaged = true;
        }
    }

    fn destroy(&mut self, combatant: CombatantRef) {
        self.lock().familiars.remove(&combatant);
    }

    fn is_alive(&self, combatant: CombatantRef) -> bool {
        self.lock().alive(&combatant)
    }

    fn remaining_count(&self, pair: MatchPair, side: Side) -> usize {
        self.lock()
            .familiars
            .values()
            .filter(|f| f.pair == pair && f.side == side && f.hp > 0)
            .count()
    }
}

impl Notifier for SharedRealm {
    fn notify_one(&mut self, participant: ParticipantId, notice: &Notice) {
        tracing::info!(to = %participant, "{notice}");
    }

    fn observers_near(&self, _position: Position, _radius: f32) -> Vec<ParticipantId> {
        Vec::new()
    }

    fn broadcast_near(&mut self, _position: Position, radius: f32, notice: &Notice) {
        tracing::info!(radius, "[area] {notice}");
    }
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

/// One round: every engaged familiar hits a random engaged enemy.
///
/// Returns the encounters that lost a familiar this round.
fn combat_round(realm: &mut Realm, rng: &mut impl Rng) -> Vec<EncounterId> {
    let attackers: Vec<CombatantRef> = realm
        .familiars
        .iter()
        .filter(|(_, f)| f.engaged && f.hp > 0)
        .map(|(c, _)| *c)
        .collect();

    let mut casualties = Vec::new();
    for attacker in attackers {
        let Some((encounter, side)) = realm
            .familiars
            .get(&attacker)
            .filter(|f| f.hp > 0)
            .map(|f| (f.encounter, f.side))
        else {
            continue;
        };
        let targets: Vec<CombatantRef> = realm
            .familiars
            .iter()
            .filter(|(_, f)| f.encounter == encounter && f.side != side && f.engaged && f.hp > 0)
            .map(|(c, _)| *c)
            .collect();
        if targets.is_empty() {
            continue;
        }
        let target = targets[rng.random_range(0..targets.len())];
        let damage = rng.random_range(10..=30);
        if let Some(f) = realm.familiars.get_mut(&target) {
            f.hp -= damage;
            if f.hp <= 0 {
                tracing::debug!(%attacker, %target, template = %f.template, "familiar down");
                if !casualties.contains(&encounter) {
                    casualties.push(encounter);
                }
            }
        }
    }
    casualties
}

// ---------------------------------------------------------------------------
// Demo
// ---------------------------------------------------------------------------

const CONFIG: &str = r#"{
    "team_size": 3,
    "battle_interval": 3000,
    "match_start_countdown": 3,
    "challenge_expiration": 10000,
    "match_timeout": 20000,
    "summon_stagger": 200
}"#;

fn loadout(first: u32) -> Vec<TemplateId> {
    (first..first + 3).map(TemplateId).collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    skirmish::init_tracing();

    let realm = SharedRealm::default();
    {
        let mut r = realm.lock();
        r.add_player(ParticipantId(1), 1, loadout(10));
        r.add_player(ParticipantId(2), 2, loadout(20));
        // 3 and 4 share a guild: their familiars spawn non-hostile.
        r.add_player(ParticipantId(3), 3, loadout(30));
        r.add_player(ParticipantId(4), 3, loadout(40));
        r.add_player(ParticipantId(5), 4, loadout(50));
        r.add_player(ParticipantId(6), 5, vec![TemplateId(60), TemplateId::EMPTY]);
    }

    let arena = ArenaBuilder::new().config_json(CONFIG)?.build(realm.world())?;

    arena.challenge(ParticipantId(1), ParticipantId(2)).await?;
    arena.accept(ParticipantId(2)).await?;
    arena.challenge(ParticipantId(3), ParticipantId(4)).await?;
    arena.accept(ParticipantId(4)).await?;

    arena.challenge(ParticipantId(5), ParticipantId(6)).await?;
    if let Err(e) = arena.accept(ParticipantId(6)).await {
        tracing::warn!(error = %e, "challenge could not be queued");
        arena.decline(ParticipantId(5)).await?;
    }

    let mut round = tokio::time::interval(Duration::from_millis(500));
    let mut info = arena.get_info().await?;
    for _ in 0..240 {
        round.tick().await;
        let casualties = combat_round(&mut realm.lock(), &mut rand::rng());
        for encounter in casualties {
            arena.report_casualty(encounter).await?;
        }
        info = arena.get_info().await?;
        if info.recent_results.len() >= 2 && info.encounters.is_empty() {
            break;
        }
    }

    for result in &info.recent_results {
        let verdict = match result.outcome {
            Outcome::Victory { winner, loser } => format!("{winner} beat {loser}"),
            Outcome::Tie => "tie".to_string(),
        };
        println!(
            "{} {}: {verdict} ({:?}, {} vs {} standing, {:.1}s)",
            result.encounter,
            result.pair,
            result.resolution,
            result.remaining_a,
            result.remaining_b,
            result.duration.as_secs_f64()
        );
    }

    arena.shutdown().await?;
    Ok(())
}
