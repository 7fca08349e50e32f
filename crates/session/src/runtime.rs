use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::info;

use market_core::Period;

use crate::chart::{ChartHost, DisplayMode};
use crate::error::SessionError;
use crate::feed::MarketFeed;
use crate::period::spawn_period_fetch;
use crate::scheduler::spawn_cycle;
use crate::session::{SessionConfig, SessionCore, Snapshot};
use crate::sink;

const COMMAND_CAPACITY: usize = 32;
const COMPLETION_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ChangePeriod(Period),
    RefreshPeriod,
    ContainerResized(u32),
    SetHeight(u32),
    SetMode(DisplayMode),
    Shutdown,
}

/// Caller side of a running session.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Snapshot>,
}

impl SessionHandle {
    pub async fn send(&self, command: Command) -> Result<(), SessionError> {
        self.commands.send(command).await.map_err(|_| SessionError::Closed)
    }

    pub async fn change_period(&self, period: Period) -> Result<(), SessionError> {
        self.send(Command::ChangePeriod(period)).await
    }

    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(Command::Shutdown).await
    }

    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }
}

/// A session task. Everything that touches the series happens inside
/// [`Session::run`]; fetches run as spawned tasks and report back.
pub struct Session<F: MarketFeed, H: ChartHost> {
    feed: Arc<F>,
    core: SessionCore<H>,
    commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<Snapshot>,
}

impl<F: MarketFeed, H: ChartHost> Session<F, H> {
    pub fn new(feed: Arc<F>, config: SessionConfig, host: H) -> Result<(Self, SessionHandle), SessionError> {
        let core = SessionCore::new(config, host)?;
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (snap_tx, snap_rx) = watch::channel(core.snapshot());

        let session = Self {
            feed,
            core,
            commands: cmd_rx,
            snapshots: snap_tx,
        };
        let handle = SessionHandle {
            commands: cmd_tx,
            snapshots: snap_rx,
        };
        Ok((session, handle))
    }

    /// Runs until `Shutdown` or until every handle is dropped.
    pub async fn run(mut self) {
        let (poll_tx, mut poll_rx) = mpsc::channel(COMPLETION_CAPACITY);
        let (period_tx, mut period_rx) = mpsc::channel(COMPLETION_CAPACITY);

        info!(
            coin = self.core.coin(),
            interval_secs = self.core.poll_interval().as_secs(),
            "session started"
        );

        self.core.mount();
        if let Some(req) = self.core.refresh_period() {
            spawn_period_fetch(&self.feed, self.core.coin(), req, &period_tx);
        }
        self.publish();

        // первый тик сразу
        let mut ticker = tokio::time::interval(self.core.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Some(seq) = self.core.begin_poll() {
                        spawn_cycle(&self.feed, self.core.coin(), self.core.pool(), seq, &poll_tx);
                    }
                }

                Some(completion) = poll_rx.recv() => {
                    self.core.on_poll(completion);
                }

                Some(completion) = period_rx.recv() => {
                    self.core.on_period(completion);
                }

                cmd = self.commands.recv() => match cmd {
                    Some(Command::ChangePeriod(period)) => {
                        if let Some(req) = self.core.request_period(period) {
                            spawn_period_fetch(&self.feed, self.core.coin(), req, &period_tx);
                        }
                    }
                    Some(Command::RefreshPeriod) => {
                        if let Some(req) = self.core.refresh_period() {
                            spawn_period_fetch(&self.feed, self.core.coin(), req, &period_tx);
                        }
                    }
                    Some(Command::ContainerResized(width)) => self.core.on_container_resized(width),
                    Some(Command::SetHeight(height)) => self.core.set_height(height),
                    Some(Command::SetMode(mode)) => self.core.set_mode(mode),
                    Some(Command::Shutdown) | None => {
                        self.core.teardown();
                        self.publish();
                        break;
                    }
                },
            }

            self.publish();
        }
    }

    fn publish(&mut self) {
        sink::consume(self.core.drain_events());
        self.snapshots.send_replace(self.core.snapshot());
    }
}
