//! Collaborator traits — the seams between the arena and the game world.
//!
//! The arena decides *when* things happen; the world decides *how*. Player
//! lookup, alliances, spawning familiars, and delivering chat all live on
//! the other side of these traits.
//!
//! Every method is synchronous and is only ever called from the arena's
//! own task, so implementations never see two calls at once. A collaborator
//! that needs to tell the arena something (a familiar died, a player wants
//! out of the queue) goes through [`ArenaHandle`](crate::ArenaHandle)
//! instead of calling back in.

use skirmish_types::{
    CombatantRef, EncounterId, MatchPair, Notice, ParticipantId, Position, Side, TemplateId,
};

use crate::CollaboratorError;

/// The live state of a reachable participant.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveParticipant {
    pub id: ParticipantId,
    /// Where the player's character currently stands.
    pub position: Position,
}

/// Looks players up.
pub trait ParticipantDirectory: Send + 'static {
    /// Returns the participant's live state, or `None` if they are offline
    /// or have no character in the world.
    fn resolve(&self, id: ParticipantId) -> Result<Option<LiveParticipant>, CollaboratorError>;

    /// The participant's current loadout, empty slots included.
    ///
    /// The arena copies this when the match is queued and never reads it
    /// again for that match.
    fn loadout(&self, id: ParticipantId) -> Vec<TemplateId>;
}

/// Answers whether two players are on the same side in the wider game.
pub trait AllianceQuery: Send + 'static {
    fn are_allied(&self, a: ParticipantId, b: ParticipantId) -> bool;
}

/// Everything the spawner needs to place one familiar.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub encounter: EncounterId,
    pub pair: MatchPair,
    pub side: Side,
    /// Slot index within the side, `0..team_size`.
    pub slot: usize,
    pub template: TemplateId,
    pub position: Position,
    /// `false` when the two owners are allied: the familiar must start out
    /// non-hostile to the other side.
    pub hostile: bool,
}

/// Creates and removes familiars in the world.
pub trait CombatantSpawner: Send + 'static {
    /// Spawns one familiar. Familiars start passive; see [`engage`](Self::engage).
    fn spawn(&mut self, request: &SpawnRequest) -> Result<CombatantRef, CollaboratorError>;

    /// Enables aggro so the familiar starts fighting.
    fn engage(&mut self, combatant: CombatantRef);

    /// Removes a familiar from the world. Must be idempotent.
    fn destroy(&mut self, combatant: CombatantRef);

    /// Returns `true` if the familiar is still in the world.
    fn is_alive(&self, combatant: CombatantRef) -> bool;

    /// How many familiars spawned for `pair` on `side` are still standing.
    fn remaining_count(&self, pair: MatchPair, side: Side) -> usize;
}

/// Delivers notices to players.
///
/// Delivery is best effort. The arena does not retry and does not care
/// whether anyone was listening.
pub trait Notifier: Send + 'static {
    fn notify_one(&mut self, participant: ParticipantId, notice: &Notice);

    fn notify_both(&mut self, a: ParticipantId, b: ParticipantId, notice: &Notice) {
        self.notify_one(a, notice);
        self.notify_one(b, notice);
    }

    /// Players currently within `radius` of `position`.
    fn observers_near(&self, position: Position, radius: f32) -> Vec<ParticipantId>;

    /// Sends a notice to everyone within `radius` of `position`.
    fn broadcast_near(&mut self, position: Position, radius: f32, notice: &Notice);
}

/// The full set of collaborators an arena runs against.
pub struct World {
    pub directory: Box<dyn ParticipantDirectory>,
    pub alliances: Box<dyn AllianceQuery>,
    pub spawner: Box<dyn CombatantSpawner>,
    pub notifier: Box<dyn Notifier>,
}

impl World {
    pub fn new(
        directory: impl ParticipantDirectory,
        alliances: impl AllianceQuery,
        spawner: impl CombatantSpawner,
        notifier: impl Notifier,
    ) -> Self {
        Self {
            directory: Box::new(directory),
            alliances: Box::new(alliances),
            spawner: Box::new(spawner),
            notifier: Box::new(notifier),
        }
    }
}
