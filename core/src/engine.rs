//! The refresh loop and event channel driving a [`Session`].
//!
//! Background work (collections and kill batches) runs on spawned tasks
//! that only send their result back over a single mpsc channel. The
//! owner of the [`Engine`] drains that channel with
//! [`Engine::next_event`] and applies each event with [`Engine::handle`],
//! one at a time, so the session is never touched concurrently.
//!
//! # Usage Pattern
//! ```ignore
//! let mut engine = SystemEngine::system(&config, config.initial_view(), user);
//! loop {
//!     let event = engine.next_event().await;
//!     engine.handle(event);
//!     // draw engine.session()
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::adapters::{SignalKiller, SocketScanner, SysinfoProcessTable};
use crate::application::{SnapshotCollector, TerminationSummary, Terminator};
use crate::config::Config;
use crate::domain::{ProcessSnapshot, ViewParameters};
use crate::error::Result;
use crate::ports::{ConnectionSource, ProcessKillerPort, ProcessTable};
use crate::session::{Action, Command, Session};

/// Period of the spinner / notification-expiry tick.
pub const HOUSEKEEPING_INTERVAL: Duration = Duration::from_millis(250);

/// Engine wired to the real OS adapters.
pub type SystemEngine = Engine<SysinfoProcessTable, SocketScanner, SignalKiller>;

/// Something the session loop must react to.
#[derive(Debug)]
pub enum EngineEvent {
    /// The refresh interval elapsed.
    RefreshDue,
    /// Spinner and notification housekeeping is due.
    Housekeeping,
    /// A collection finished.
    SnapshotReady(Result<ProcessSnapshot>),
    /// A kill batch finished.
    KillFinished(TerminationSummary),
}

/// Owns the session and schedules collections and kills for it.
pub struct Engine<P, C, K>
where
    P: ProcessTable + 'static,
    C: ConnectionSource + 'static,
    K: ProcessKillerPort + 'static,
{
    session: Session,
    collector: Arc<SnapshotCollector<P, C>>,
    terminator: Arc<Terminator<K>>,
    current_user: Arc<str>,

    events_tx: UnboundedSender<EngineEvent>,
    events_rx: UnboundedReceiver<EngineEvent>,
    refresh_timer: Interval,
    housekeeping_timer: Interval,

    // At most one collection runs; requests made meanwhile collapse into one
    collection_in_flight: bool,
    refresh_pending: bool,
}

impl SystemEngine {
    /// Engine backed by sysinfo, the platform socket scanner and signals.
    pub fn system(config: &Config, view: ViewParameters, current_user: impl Into<String>) -> Self {
        let collector = SnapshotCollector::new(SysinfoProcessTable::new(), SocketScanner::new());
        let terminator = Terminator::new(
            SignalKiller::with_grace_period(config.grace_period()),
            config.kill_mode.is_force(),
        );
        let session = Session::new(view).with_notification_ttl(config.notification_ttl());

        Self::new(
            collector,
            terminator,
            current_user,
            session,
            config.refresh_interval(),
        )
    }
}

impl<P, C, K> Engine<P, C, K>
where
    P: ProcessTable + 'static,
    C: ConnectionSource + 'static,
    K: ProcessKillerPort + 'static,
{
    /// Create an engine. Must be called inside a tokio runtime.
    ///
    /// The first refresh tick fires immediately, so the initial
    /// collection starts with the first call to `next_event`.
    pub fn new(
        collector: SnapshotCollector<P, C>,
        terminator: Terminator<K>,
        current_user: impl Into<String>,
        session: Session,
        refresh_interval: Duration,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let mut refresh_timer = interval(refresh_interval);
        refresh_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut housekeeping_timer = interval(HOUSEKEEPING_INTERVAL);
        housekeeping_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let current_user: String = current_user.into();
        info!(user = %current_user, interval = ?refresh_interval, "Session starting");

        Self {
            session,
            collector: Arc::new(collector),
            terminator: Arc::new(terminator),
            current_user: Arc::from(current_user),
            events_tx,
            events_rx,
            refresh_timer,
            housekeeping_timer,
            collection_in_flight: false,
            refresh_pending: false,
        }
    }

    // MARK: - State Access

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether a collection is outstanding.
    pub fn is_collecting(&self) -> bool {
        self.collection_in_flight
    }

    // MARK: - Event Loop

    /// Wait for the next event. Finished background work is delivered
    /// before timer ticks.
    pub async fn next_event(&mut self) -> EngineEvent {
        tokio::select! {
            biased;
            Some(event) = self.events_rx.recv() => event,
            _ = self.refresh_timer.tick() => EngineEvent::RefreshDue,
            _ = self.housekeeping_timer.tick() => EngineEvent::Housekeeping,
        }
    }

    /// Apply one event to the session.
    pub fn handle(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::RefreshDue => self.request_refresh(),
            EngineEvent::Housekeeping => self.session.tick(std::time::Instant::now()),
            EngineEvent::SnapshotReady(result) => {
                self.collection_in_flight = false;
                if let Err(e) = &result {
                    warn!(error = %e, "Collection failed");
                }
                self.session.apply_snapshot(result);

                if self.refresh_pending {
                    self.refresh_pending = false;
                    self.request_refresh();
                }
            }
            EngineEvent::KillFinished(summary) => {
                info!(
                    requested = summary.requested,
                    succeeded = summary.succeeded,
                    "Kill batch finished"
                );
                self.session.apply_termination(summary);
                self.request_refresh();
            }
        }
    }

    /// Apply a user action. Returns `false` once the session should end.
    pub fn dispatch(&mut self, action: Action) -> bool {
        match self.session.handle(action) {
            Some(Command::Quit) => return false,
            Some(Command::Refresh) => self.request_refresh(),
            Some(Command::Terminate(pids)) => self.spawn_termination(pids),
            None => {}
        }
        true
    }

    // MARK: - Background Work

    /// Start a collection, or queue one if a collection is already running.
    pub fn request_refresh(&mut self) {
        if self.collection_in_flight {
            debug!("Collection in flight, queueing refresh");
            self.refresh_pending = true;
            return;
        }

        self.collection_in_flight = true;
        self.session.begin_collection();

        let collector = Arc::clone(&self.collector);
        let current_user = Arc::clone(&self.current_user);
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = collector.collect(&current_user).await;
            // Receiver only goes away when the engine is dropped
            let _ = events_tx.send(EngineEvent::SnapshotReady(result));
        });
    }

    fn spawn_termination(&mut self, pids: Vec<u32>) {
        info!(count = pids.len(), force = self.terminator.is_force(), "Terminating processes");

        let terminator = Arc::clone(&self.terminator);
        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let summary = terminator.terminate(&pids).await;
            let _ = events_tx.send(EngineEvent::KillFinished(summary));
        });
    }
}
