//! Deadline-triggered draw scheduler
//!
//! Each tick lists every room and, for each room whose deadline has passed
//! and whose draw has not completed:
//!
//! 1. lists its participants
//! 2. decrypts their addresses (undecryptable participants are excluded)
//! 3. draws one gift-giving cycle
//! 4. sends one notification per participant, isolating failures
//! 5. flips the room's draw flag
//!
//! Steps 1 and 3 may defer the room to the next tick. Once a cycle has been
//! drawn the flag is always written, even if some sends failed: a second
//! draw would hand out a different pairing than the one already delivered.
//!
//! Ticks never overlap. The scheduler owns a "tick in progress" guard and the
//! run loop only waits for the next timer once the current tick is done.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use time::OffsetDateTime;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant, MissedTickBehavior};
use uuid::Uuid;

use super::assignment::{assign, AssignError};
use crate::crypto::PiiKey;
use crate::notify::{Notification, Notifier};
use crate::room::{Contact, Participant, Room};
use crate::store::{RoomStore, RoomStoreError};

/// Configuration for the draw scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Time between ticks
    pub interval: Duration,
    /// Schedule ticks on wall-clock multiples of `interval`
    ///  (the top of the hour for the default interval)
    pub align_to_interval: bool,
    /// Run one tick as soon as the scheduler starts, catching up on
    ///  deadlines that passed while the process was down
    pub tick_on_start: bool,
    /// Upper bound on every room store call
    pub store_timeout: Duration,
    /// Upper bound on every notification send
    pub send_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            align_to_interval: true,
            tick_on_start: true,
            store_timeout: Duration::from_secs(30),
            send_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("a draw tick is already in progress")]
    TickInProgress,
    #[error("failed to list rooms: {0}")]
    ListRooms(String),
    #[error("listing rooms timed out after {0:?}")]
    ListRoomsTimeout(Duration),
}

/// Why an eligible room was left for the next tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferReason {
    ParticipantsUnavailable(String),
    ParticipantsTimeout,
    Validation(AssignError),
}

/// What happened to the participants of one drawn room
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawSummary {
    pub assignments: usize,
    pub sent: usize,
    pub failed: usize,
    /// Participants left out because their address did not decrypt
    pub excluded: usize,
}

/// Result of processing one eligible room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomOutcome {
    /// Drawn, notified and recorded
    Drawn(DrawSummary),
    /// Drawn and notified, but the completion write failed.
    ///  The room may be drawn again with a different pairing.
    Unrecorded { summary: DrawSummary, error: String },
    /// Nothing was sent; the room stays eligible
    Deferred(DeferReason),
}

/// Everything one tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub rooms_seen: usize,
    /// Eligible rooms in the order they were processed
    pub outcomes: Vec<(Uuid, RoomOutcome)>,
}

impl TickReport {
    pub fn outcome(&self, room_id: Uuid) -> Option<&RoomOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == room_id)
            .map(|(_, outcome)| outcome)
    }

    fn summaries(&self) -> impl Iterator<Item = &DrawSummary> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            RoomOutcome::Drawn(summary) => Some(summary),
            RoomOutcome::Unrecorded { summary, .. } => Some(summary),
            RoomOutcome::Deferred(_) => None,
        })
    }

    /// Rooms drawn and recorded; see [`TickReport::rooms_unrecorded`]
    pub fn rooms_drawn(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, RoomOutcome::Drawn(_)))
            .count()
    }

    pub fn rooms_deferred(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, RoomOutcome::Deferred(_)))
            .count()
    }

    pub fn rooms_unrecorded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, RoomOutcome::Unrecorded { .. }))
            .count()
    }

    pub fn notifications_sent(&self) -> usize {
        self.summaries().map(|s| s.sent).sum()
    }

    pub fn notifications_failed(&self) -> usize {
        self.summaries().map(|s| s.failed).sum()
    }

    pub fn participants_excluded(&self) -> usize {
        self.summaries().map(|s| s.excluded).sum()
    }
}

/// Clears the in-progress flag when a tick ends, however it ends
struct TickGuard<'a>(&'a AtomicBool);

impl<'a> TickGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TickGuard(flag))
    }
}

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Time from `now` until the next wall-clock multiple of `interval`
pub(crate) fn delay_until_boundary(now: OffsetDateTime, interval: Duration) -> Duration {
    let period = interval.as_secs().max(1);
    let elapsed = now.unix_timestamp().rem_euclid(period as i64) as u64;
    Duration::from_secs(period - elapsed)
}

/// Runs draws for rooms whose deadline has passed
///
/// Generic over the room store and the notification transport so the same
/// engine runs against SQLite in the daemon and in-memory fakes in tests.
pub struct DrawScheduler<S, N> {
    store: S,
    notifier: N,
    key: PiiKey,
    config: SchedulerConfig,
    rng: Mutex<StdRng>,
    ticking: AtomicBool,
}

impl<S, N> std::fmt::Debug for DrawScheduler<S, N>
where
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawScheduler")
            .field("store", &self.store)
            .field("config", &self.config)
            .field("ticking", &self.is_ticking())
            .finish()
    }
}

impl<S, N> DrawScheduler<S, N>
where
    S: RoomStore,
    N: Notifier,
{
    pub fn new(store: S, notifier: N, key: PiiKey, config: SchedulerConfig) -> Self {
        Self {
            store,
            notifier,
            key,
            config,
            rng: Mutex::new(StdRng::from_os_rng()),
            ticking: AtomicBool::new(false),
        }
    }

    /// Replace the shuffle source, e.g. with a seeded RNG in tests
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

impl<S, N> DrawScheduler<S, N> {
    pub fn is_ticking(&self) -> bool {
        self.ticking.load(Ordering::Acquire)
    }
}

impl<S, N> DrawScheduler<S, N>
where
    S: RoomStore,
    N: Notifier,
{
    /// Run one draw pass against the current time
    pub async fn tick(&self) -> Result<TickReport, SchedulerError> {
        self.tick_at(OffsetDateTime::now_utc()).await
    }

    /// Run one draw pass, judging deadlines against `now`
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::TickInProgress`] if another tick is running
    /// - [`SchedulerError::ListRooms`] / [`SchedulerError::ListRoomsTimeout`]
    ///   if rooms could not be listed; nothing else was touched
    ///
    /// Per-room failures never fail the tick; they are logged and reported
    /// in the returned [`TickReport`].
    pub async fn tick_at(&self, now: OffsetDateTime) -> Result<TickReport, SchedulerError> {
        let _guard = TickGuard::acquire(&self.ticking).ok_or(SchedulerError::TickInProgress)?;

        let rooms = match timeout(self.config.store_timeout, self.store.list_rooms()).await {
            Ok(Ok(rooms)) => rooms,
            Ok(Err(e)) => return Err(SchedulerError::ListRooms(e.to_string())),
            Err(_) => return Err(SchedulerError::ListRoomsTimeout(self.config.store_timeout)),
        };

        let mut report = TickReport {
            rooms_seen: rooms.len(),
            outcomes: Vec::new(),
        };

        for room in rooms.iter().filter(|room| room.is_eligible(now)) {
            let outcome = self.draw_room(room).await;
            report.outcomes.push((room.id, outcome));
        }

        Ok(report)
    }

    #[tracing::instrument(skip_all, fields(room_id = %room.id))]
    async fn draw_room(&self, room: &Room) -> RoomOutcome {
        let participants =
            match timeout(self.config.store_timeout, self.store.list_participants(room.id)).await {
                Ok(Ok(participants)) => participants,
                Ok(Err(e)) => {
                    tracing::error!("failed to list participants, retrying next tick: {}", e);
                    return RoomOutcome::Deferred(DeferReason::ParticipantsUnavailable(
                        e.to_string(),
                    ));
                }
                Err(_) => {
                    tracing::error!(
                        "listing participants timed out after {:?}, retrying next tick",
                        self.config.store_timeout
                    );
                    return RoomOutcome::Deferred(DeferReason::ParticipantsTimeout);
                }
            };

        let (contacts, excluded) = self.decrypt_contacts(&participants);

        let drawn = {
            let mut rng = self.rng.lock();
            assign(contacts, &mut *rng)
        };
        let assignments = match drawn {
            Ok(assignments) => assignments,
            Err(e) => {
                tracing::warn!(excluded, "room cannot be drawn yet: {}", e);
                return RoomOutcome::Deferred(DeferReason::Validation(e));
            }
        };

        let mut summary = DrawSummary {
            assignments: assignments.len(),
            excluded,
            ..Default::default()
        };

        for assignment in assignments {
            let participant_id = assignment.giver.participant_id;
            let notification = Notification {
                room_id: room.id,
                room_name: room.name.clone(),
                giver_name: assignment.giver.name,
                giver_email: assignment.giver.email,
                giftee_name: assignment.giftee_name,
            };

            match timeout(self.config.send_timeout, self.notifier.notify(&notification)).await {
                Ok(Ok(())) => summary.sent += 1,
                Ok(Err(e)) => {
                    tracing::error!(%participant_id, "failed to notify participant: {}", e);
                    summary.failed += 1;
                }
                Err(_) => {
                    tracing::error!(
                        %participant_id,
                        "notifying participant timed out after {:?}",
                        self.config.send_timeout
                    );
                    summary.failed += 1;
                }
            }
        }

        match timeout(
            self.config.store_timeout,
            self.store.mark_draw_completed(room.id),
        )
        .await
        {
            Ok(Ok(())) => {
                tracing::info!(
                    participants = summary.assignments,
                    sent = summary.sent,
                    failed = summary.failed,
                    excluded = summary.excluded,
                    "draw completed"
                );
                RoomOutcome::Drawn(summary)
            }
            Ok(Err(RoomStoreError::AlreadyDrawn(_))) => {
                tracing::error!(
                    "room was already marked drawn by another draw; \
                     participants may hold two different assignments"
                );
                RoomOutcome::Unrecorded {
                    summary,
                    error: "room already drawn".to_string(),
                }
            }
            Ok(Err(e)) => {
                tracing::error!(
                    "DRAW NOT RECORDED: notifications were sent but the completion flag \
                     could not be written; the next tick will draw this room again with a \
                     different pairing: {}",
                    e
                );
                RoomOutcome::Unrecorded {
                    summary,
                    error: e.to_string(),
                }
            }
            Err(_) => {
                tracing::error!(
                    "DRAW NOT RECORDED: completion write timed out after {:?}; \
                     the next tick may draw this room again with a different pairing",
                    self.config.store_timeout
                );
                RoomOutcome::Unrecorded {
                    summary,
                    error: "completion write timed out".to_string(),
                }
            }
        }
    }

    /// Decrypt every participant's address, leaving out the ones that fail
    fn decrypt_contacts(&self, participants: &[Participant]) -> (Vec<Contact>, usize) {
        let mut contacts = Vec::with_capacity(participants.len());
        let mut excluded = 0;

        for participant in participants {
            match self.key.decrypt_string(&participant.email_ciphertext) {
                Ok(email) => contacts.push(Contact {
                    participant_id: participant.id,
                    name: participant.name.clone(),
                    email,
                }),
                Err(e) => {
                    tracing::warn!(
                        participant_id = %participant.id,
                        "excluding participant from draw, address does not decrypt: {}",
                        e
                    );
                    excluded += 1;
                }
            }
        }

        (contacts, excluded)
    }

    async fn tick_logged(&self) {
        match self.tick().await {
            Ok(report) if report.outcomes.is_empty() => {
                tracing::debug!(rooms = report.rooms_seen, "draw tick found no eligible rooms");
            }
            Ok(report) => {
                tracing::info!(
                    rooms = report.rooms_seen,
                    drawn = report.rooms_drawn(),
                    deferred = report.rooms_deferred(),
                    unrecorded = report.rooms_unrecorded(),
                    sent = report.notifications_sent(),
                    failed = report.notifications_failed(),
                    excluded = report.participants_excluded(),
                    "draw tick finished"
                );
            }
            Err(e) => tracing::error!("draw tick failed: {}", e),
        }
    }

    /// Tick on the configured interval until `shutdown_rx` fires
    ///
    /// Shutdown is only observed between ticks; a tick that has started
    /// always runs to completion.
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<()>) {
        let interval = self.config.interval.max(Duration::from_secs(1));
        let first = if self.config.align_to_interval {
            delay_until_boundary(OffsetDateTime::now_utc(), interval)
        } else {
            interval
        };

        let mut ticker = tokio::time::interval_at(Instant::now() + first, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = interval.as_secs(),
            first_tick_in_secs = first.as_secs(),
            "Draw scheduler started"
        );

        if self.config.tick_on_start {
            self.tick_logged().await;
        }

        loop {
            // shutdown wins over a timer that fired during the last tick
            tokio::select! {
                biased;
                _ = shutdown_rx.changed() => {
                    tracing::info!("Draw scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.tick_logged().await;
                }
            }
        }
    }

    /// Spawn the run loop on the current runtime
    pub fn start(self: Arc<Self>) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(());
        let task = tokio::spawn(async move {
            self.run(shutdown_rx).await;
        });

        SchedulerHandle { shutdown_tx, task }
    }
}

/// Handle to a scheduler spawned with [`DrawScheduler::start`]
#[derive(Debug)]
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signal shutdown and wait for any in-flight tick to finish
    pub async fn stop(self) -> Result<(), tokio::task::JoinError> {
        let _ = self.shutdown_tx.send(());
        self.task.await
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
