use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::Sender;

use gecko::FetchError;
use market_core::{Candle, PriceSnapshot, Trade};
use state_machine::seq::{LatestGate, Seq, SeqCounter};

use crate::error::SessionError;
use crate::event::{Channel, FeedKind};
use crate::feed::MarketFeed;

/// Never poll tighter than this, whatever the caller asks for.
pub const DEFAULT_POLL_FLOOR: Duration = Duration::from_secs(30);

/// Live refresh tier picked by the user.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cadence {
    Fast,
    Slow,
}

impl Cadence {
    pub fn requested(self) -> Duration {
        match self {
            Cadence::Fast => Duration::from_secs(1),
            Cadence::Slow => Duration::from_secs(60),
        }
    }

    pub fn effective(self, floor: Duration) -> Duration {
        self.requested().max(floor)
    }
}

impl FromStr for Cadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1s" | "fast" => Ok(Cadence::Fast),
            "1m" | "slow" => Ok(Cadence::Slow),
            _ => Err(format!("unknown cadence: {s} (expected 1s or 1m)")),
        }
    }
}

#[derive(Debug)]
pub enum FeedResult {
    Price(Result<Option<PriceSnapshot>, FetchError>),
    Trades(Result<Vec<Trade>, FetchError>),
    Ohlc(Result<Option<Candle>, FetchError>),
}

/// One feed's answer for one poll cycle.
#[derive(Debug)]
pub struct PollCompletion {
    pub seq: Seq,
    pub result: FeedResult,
}

impl PollCompletion {
    pub fn feed(&self) -> FeedKind {
        match self.result {
            FeedResult::Price(_) => FeedKind::Price,
            FeedResult::Trades(_) => FeedKind::Trades,
            FeedResult::Ohlc(_) => FeedKind::Ohlc,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FeedHealth {
    /// Nothing has come back yet.
    Pending,
    Fresh,
    Failed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FeedUpdate {
    Applied(FeedKind),
    /// Completion was current but carried nothing to replace the held value.
    Unchanged(FeedKind),
}

/// Last known value of one feed. One gate covers every outcome, success or
/// failure: only a cycle newer than anything seen for this feed may touch
/// it. A failure never clears the value.
#[derive(Debug)]
struct FeedSlot<T> {
    kind: FeedKind,
    value: Option<T>,
    latest: LatestGate,
    health: FeedHealth,
}

impl<T> FeedSlot<T> {
    fn new(kind: FeedKind) -> Self {
        Self {
            kind,
            value: None,
            latest: LatestGate::new(),
            health: FeedHealth::Pending,
        }
    }

    fn succeed(&mut self, seq: Seq, value: Option<T>) -> Result<FeedUpdate, SessionError> {
        if !self.latest.admit(seq) {
            return Err(self.stale(seq));
        }
        self.health = FeedHealth::Fresh;

        match value {
            Some(v) => {
                self.value = Some(v);
                Ok(FeedUpdate::Applied(self.kind))
            }
            None => Ok(FeedUpdate::Unchanged(self.kind)),
        }
    }

    fn fail(&mut self, seq: Seq, error: FetchError) -> Result<FeedUpdate, SessionError> {
        if !self.latest.admit(seq) {
            return Err(self.stale(seq));
        }
        self.health = FeedHealth::Failed;
        Err(SessionError::UpstreamUnavailable(error))
    }

    fn stale(&self, seq: Seq) -> SessionError {
        SessionError::StaleCompletion {
            channel: Channel::Feed(self.kind),
            seq,
        }
    }
}

/// Timer-side bookkeeping of the live feeds. Cycles are numbered when the
/// timer fires; their three fetches resolve independently and in any order.
#[derive(Debug)]
pub struct PollScheduler {
    interval: Duration,
    cycles: SeqCounter,
    price: FeedSlot<PriceSnapshot>,
    trades: FeedSlot<Vec<Trade>>,
    ohlc: FeedSlot<Candle>,
}

impl PollScheduler {
    pub fn new(cadence: Cadence, floor: Duration) -> Self {
        Self {
            interval: cadence.effective(floor),
            cycles: SeqCounter::new(),
            price: FeedSlot::new(FeedKind::Price),
            trades: FeedSlot::new(FeedKind::Trades),
            ohlc: FeedSlot::new(FeedKind::Ohlc),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn begin_cycle(&mut self) -> Seq {
        self.cycles.next()
    }

    /// `Err(UpstreamUnavailable)` records a failed feed; `Err(StaleCompletion)`
    /// means a newer cycle of this feed was already observed and nothing
    /// changed.
    pub fn apply(&mut self, completion: PollCompletion) -> Result<FeedUpdate, SessionError> {
        let seq = completion.seq;
        match completion.result {
            FeedResult::Price(Ok(p)) => self.price.succeed(seq, p),
            FeedResult::Price(Err(e)) => self.price.fail(seq, e),

            // пустой список не затирает последние известные трейды
            FeedResult::Trades(Ok(t)) => self.trades.succeed(seq, Some(t).filter(|t| !t.is_empty())),
            FeedResult::Trades(Err(e)) => self.trades.fail(seq, e),

            FeedResult::Ohlc(Ok(c)) => self.ohlc.succeed(seq, c),
            FeedResult::Ohlc(Err(e)) => self.ohlc.fail(seq, e),
        }
    }

    pub fn price(&self) -> Option<&PriceSnapshot> {
        self.price.value.as_ref()
    }

    pub fn trades(&self) -> &[Trade] {
        self.trades.value.as_deref().unwrap_or(&[])
    }

    pub fn live_candle(&self) -> Option<Candle> {
        self.ohlc.value
    }

    pub fn health(&self, feed: FeedKind) -> FeedHealth {
        match feed {
            FeedKind::Price => self.price.health,
            FeedKind::Trades => self.trades.health,
            FeedKind::Ohlc => self.ohlc.health,
        }
    }

    /// At least one feed's most recent outcome was a failure.
    pub fn is_degraded(&self) -> bool {
        [FeedKind::Price, FeedKind::Trades, FeedKind::Ohlc]
            .into_iter()
            .any(|f| self.health(f) == FeedHealth::Failed)
    }

    pub fn has_data(&self) -> bool {
        self.price.value.is_some() || self.trades.value.is_some() || self.ohlc.value.is_some()
    }
}

/// Fires the three fetches of one cycle as separate tasks. Each reports back
/// on its own; nothing waits for the other two.
pub fn spawn_cycle<F: MarketFeed>(
    feed: &Arc<F>,
    coin: &str,
    pool: &str,
    seq: Seq,
    tx: &Sender<PollCompletion>,
) {
    {
        let (feed, tx, coin) = (Arc::clone(feed), tx.clone(), coin.to_string());
        tokio::spawn(async move {
            let result = FeedResult::Price(feed.coin_price(&coin).await);
            let _ = tx.send(PollCompletion { seq, result }).await;
        });
    }
    {
        let (feed, tx, pool) = (Arc::clone(feed), tx.clone(), pool.to_string());
        tokio::spawn(async move {
            let result = FeedResult::Trades(feed.pool_trades(&pool).await);
            let _ = tx.send(PollCompletion { seq, result }).await;
        });
    }
    {
        let (feed, tx, coin) = (Arc::clone(feed), tx.clone(), coin.to_string());
        tokio::spawn(async move {
            let result = FeedResult::Ohlc(feed.latest_ohlc(&coin).await);
            let _ = tx.send(PollCompletion { seq, result }).await;
        });
    }
}
