//! Arena actor: a Tokio task that owns an [`Arena`].
//!
//! Commands arrive over an mpsc channel; requests that need an answer carry
//! a oneshot reply channel. Between commands the actor sleeps until the
//! arena's next wakeup (dispatch tick or timer) and then advances it.

use skirmish_types::{EncounterId, MatchPair, ParticipantId};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};

use crate::{Arena, ArenaError, ArenaInfo, ParticipantStatus, QueuePlacement};

/// Commands sent to an arena actor through its channel.
pub(crate) enum ArenaCommand {
    Challenge {
        challenger: ParticipantId,
        target: ParticipantId,
        reply: oneshot::Sender<Result<MatchPair, ArenaError>>,
    },

    Accept {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<QueuePlacement, ArenaError>>,
    },

    Decline {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<MatchPair, ArenaError>>,
    },

    /// Queue a pair directly, skipping the challenge.
    QueueMatch {
        a: ParticipantId,
        b: ParticipantId,
        reply: oneshot::Sender<Result<QueuePlacement, ArenaError>>,
    },

    LeaveQueue {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<MatchPair, ArenaError>>,
    },

    Status {
        participant: ParticipantId,
        reply: oneshot::Sender<ParticipantStatus>,
    },

    /// A familiar in this encounter went down.
    Casualty { encounter: EncounterId },

    GetInfo {
        reply: oneshot::Sender<ArenaInfo>,
    },

    Shutdown,
}

/// Handle to a running arena actor.
///
/// Cheap to clone; it is just an `mpsc::Sender` wrapper. Every method fails
/// with [`ArenaError::Unavailable`] once the actor has stopped.
#[derive(Clone)]
pub struct ArenaHandle {
    sender: mpsc::Sender<ArenaCommand>,
}

impl ArenaHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> ArenaCommand,
    ) -> Result<T, ArenaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| ArenaError::Unavailable)?;
        reply_rx.await.map_err(|_| ArenaError::Unavailable)
    }

    /// Issues a challenge from `challenger` to `target`.
    pub async fn challenge(
        &self,
        challenger: ParticipantId,
        target: ParticipantId,
    ) -> Result<MatchPair, ArenaError> {
        self.request(|reply| ArenaCommand::Challenge {
            challenger,
            target,
            reply,
        })
        .await?
    }

    /// Accepts the challenge addressed to `participant` and queues the match.
    pub async fn accept(&self, participant: ParticipantId) -> Result<QueuePlacement, ArenaError> {
        self.request(|reply| ArenaCommand::Accept { participant, reply })
            .await?
    }

    /// Declines (or withdraws) the challenge `participant` is part of.
    pub async fn decline(&self, participant: ParticipantId) -> Result<MatchPair, ArenaError> {
        self.request(|reply| ArenaCommand::Decline { participant, reply })
            .await?
    }

    /// Queues `a` against `b` without a challenge.
    pub async fn queue_match(
        &self,
        a: ParticipantId,
        b: ParticipantId,
    ) -> Result<QueuePlacement, ArenaError> {
        self.request(|reply| ArenaCommand::QueueMatch { a, b, reply })
            .await?
    }

    /// Takes `participant`'s match out of the queue.
    pub async fn leave_queue(&self, participant: ParticipantId) -> Result<MatchPair, ArenaError> {
        self.request(|reply| ArenaCommand::LeaveQueue { participant, reply })
            .await?
    }

    pub async fn status(&self, participant: ParticipantId) -> Result<ParticipantStatus, ArenaError> {
        self.request(|reply| ArenaCommand::Status { participant, reply })
            .await
    }

    /// Reports that a familiar in `encounter` died (fire-and-forget).
    pub async fn report_casualty(&self, encounter: EncounterId) -> Result<(), ArenaError> {
        self.sender
            .send(ArenaCommand::Casualty { encounter })
            .await
            .map_err(|_| ArenaError::Unavailable)
    }

    pub async fn get_info(&self) -> Result<ArenaInfo, ArenaError> {
        self.request(|reply| ArenaCommand::GetInfo { reply }).await
    }

    /// Tells the arena to shut down. Everything queued or fighting is released.
    pub async fn shutdown(&self) -> Result<(), ArenaError> {
        self.sender
            .send(ArenaCommand::Shutdown)
            .await
            .map_err(|_| ArenaError::Unavailable)
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The actor state. Runs inside a Tokio task.
struct ArenaActor {
    arena: Arena,
    receiver: mpsc::Receiver<ArenaCommand>,
}

impl ArenaActor {
    /// Runs the actor loop until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::info!("arena actor started");

        loop {
            let wakeup = self.arena.next_wakeup();
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else {
                        tracing::debug!("all handles dropped");
                        break;
                    };
                    // Anything that fell due while the command was in flight
                    // runs first, so the command sees up-to-date state.
                    self.arena.advance_to(Instant::now());
                    if !self.handle(cmd) {
                        break;
                    }
                }
                () = time::sleep_until(wakeup) => {
                    self.arena.advance_to(Instant::now());
                }
            }
        }

        self.arena.shutdown();
        tracing::info!("arena actor stopped");
    }

    /// Handles one command. Returns `false` when the actor should stop.
    fn handle(&mut self, cmd: ArenaCommand) -> bool {
        match cmd {
            ArenaCommand::Challenge {
                challenger,
                target,
                reply,
            } => {
                let _ = reply.send(self.arena.challenge(challenger, target));
            }
            ArenaCommand::Accept { participant, reply } => {
                let _ = reply.send(self.arena.accept(participant));
            }
            ArenaCommand::Decline { participant, reply } => {
                let _ = reply.send(self.arena.decline(participant));
            }
            ArenaCommand::QueueMatch { a, b, reply } => {
                let _ = reply.send(self.arena.queue_match(a, b));
            }
            ArenaCommand::LeaveQueue { participant, reply } => {
                let _ = reply.send(self.arena.leave_queue(participant));
            }
            ArenaCommand::Status { participant, reply } => {
                let _ = reply.send(self.arena.status(participant));
            }
            ArenaCommand::Casualty { encounter } => {
                if let Err(e) = self.arena.report_casualty(encounter) {
                    tracing::debug!(error = %e, "casualty report ignored");
                }
            }
            ArenaCommand::GetInfo { reply } => {
                let _ = reply.send(self.arena.info());
            }
            ArenaCommand::Shutdown => {
                tracing::info!("arena shutting down");
                return false;
            }
        }
        true
    }
}

/// Spawns an arena actor task and returns a handle to it.
///
/// `channel_size` bounds the command channel; when it is full, senders wait.
pub fn spawn_arena(arena: Arena, channel_size: usize) -> ArenaHandle {
    let (tx, rx) = mpsc::channel(channel_size.max(1));
    let actor = ArenaActor {
        arena,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    ArenaHandle { sender: tx }
}

/// Default bound for the command channel.
pub const DEFAULT_CHANNEL_SIZE: usize = 64;
