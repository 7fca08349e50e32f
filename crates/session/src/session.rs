use std::mem;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use market_core::{Candle, Period, PriceSnapshot, Trade};
use series::{Series, merge, normalize};
use state_machine::seq::Seq;

use crate::chart::{ChartBinding, ChartHost, DisplayMode};
use crate::error::SessionError;
use crate::event::{Channel, FeedKind, SessionEvent};
use crate::period::{PeriodCompletion, PeriodController, PeriodRequest};
use crate::scheduler::{Cadence, DEFAULT_POLL_FLOOR, FeedUpdate, PollCompletion, PollScheduler};

pub const DEFAULT_HEIGHT: u32 = 360;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub coin: String,
    /// `network_address`; empty disables the trades feed.
    pub pool: String,
    pub period: Period,
    pub cadence: Cadence,
    pub poll_floor: Duration,
    pub height: u32,
    pub mode: DisplayMode,
}

impl SessionConfig {
    pub fn new(coin: impl Into<String>) -> Self {
        Self {
            coin: coin.into(),
            pool: String::new(),
            period: Period::Daily,
            cadence: Cadence::Slow,
            poll_floor: DEFAULT_POLL_FLOOR,
            height: DEFAULT_HEIGHT,
            mode: DisplayMode::LiveTailing,
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.coin.trim().is_empty() {
            return Err(SessionError::ConfigurationMissing("coin id".into()));
        }
        if self.height == 0 {
            return Err(SessionError::ConfigurationMissing("chart height".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum SessionStatus {
    /// No history and no live value yet.
    Loading,
    Live,
    /// Some feed's latest outcome was a failure; last known values are kept.
    Degraded,
}

/// What the session currently shows. Published after every step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub coin: String,
    pub pool: String,
    /// Period indicator; moves on request, reverts on failure.
    pub period: Period,
    /// Period whose history is in `series`.
    pub displayed: Option<Period>,
    pub price: Option<PriceSnapshot>,
    pub trades: Vec<Trade>,
    pub live: Option<Candle>,
    pub series: Series,
    pub status: SessionStatus,
    pub period_loading: bool,
    pub period_error: Option<String>,
    pub closed: bool,
}

/// Synchronous heart of a session. Owns the series and decides what every
/// completion does to it; spawning and timing belong to the runtime.
pub struct SessionCore<H: ChartHost> {
    coin: String,
    pool: String,
    series: Series,
    scheduler: PollScheduler,
    periods: PeriodController,
    period_error: Option<String>,
    chart: ChartBinding<H>,
    closed: bool,
    events: Vec<SessionEvent>,
}

impl<H: ChartHost> SessionCore<H> {
    pub fn new(config: SessionConfig, host: H) -> Result<Self, SessionError> {
        config.validate()?;

        Ok(Self {
            scheduler: PollScheduler::new(config.cadence, config.poll_floor),
            periods: PeriodController::new(config.period),
            period_error: None,
            chart: ChartBinding::new(host, config.height, config.period, config.mode),
            series: Series::new(),
            coin: config.coin,
            pool: config.pool,
            closed: false,
            events: Vec::new(),
        })
    }

    pub fn coin(&self) -> &str {
        &self.coin
    }

    pub fn pool(&self) -> &str {
        &self.pool
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    #[cfg(test)]
    pub(crate) fn chart(&self) -> &ChartBinding<H> {
        &self.chart
    }

    pub fn poll_interval(&self) -> Duration {
        self.scheduler.interval()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    /// Builds the chart if the container is ready; no-op otherwise.
    pub fn mount(&mut self) {
        if self.closed {
            return;
        }
        if let Some((width, height)) = self.chart.mount(&self.series) {
            self.events.push(SessionEvent::ChartMounted { width, height });
        }
    }

    // --- live polling -------------------------------------------------------

    pub fn begin_poll(&mut self) -> Option<Seq> {
        if self.closed {
            return None;
        }
        let seq = self.scheduler.begin_cycle();
        self.events.push(SessionEvent::PollStarted { seq });
        Some(seq)
    }

    pub fn on_poll(&mut self, completion: PollCompletion) {
        if self.closed {
            return;
        }
        let (feed, seq) = (completion.feed(), completion.seq);

        match self.scheduler.apply(completion) {
            Ok(FeedUpdate::Applied(kind)) => {
                self.events.push(SessionEvent::FeedApplied { feed: kind, seq });
                if kind == FeedKind::Ohlc {
                    self.series = merge(mem::take(&mut self.series), self.scheduler.live_candle());
                    self.events.push(SessionEvent::SeriesMerged {
                        candles: self.series.len(),
                    });
                    self.chart.push(&self.series, false);
                }
            }
            Ok(FeedUpdate::Unchanged(kind)) => {
                self.events.push(SessionEvent::FeedUnchanged { feed: kind, seq });
            }
            Err(SessionError::StaleCompletion { .. }) => {
                self.events.push(SessionEvent::Discarded {
                    channel: Channel::Feed(feed),
                    seq,
                });
            }
            Err(e) => {
                self.events.push(SessionEvent::FeedFailed {
                    feed,
                    seq,
                    reason: e.to_string(),
                });
            }
        }
    }

    // --- period -------------------------------------------------------------

    /// Initial load, or an explicit reload of the active period.
    pub fn refresh_period(&mut self) -> Option<PeriodRequest> {
        if self.closed {
            return None;
        }
        let req = self.periods.refresh();
        self.on_period_requested(req);
        Some(req)
    }

    /// `None` when closed or when `period` is already active.
    pub fn request_period(&mut self, period: Period) -> Option<PeriodRequest> {
        if self.closed {
            return None;
        }
        let req = self.periods.request_change(period)?;
        self.chart.set_period(period);
        self.on_period_requested(req);
        Some(req)
    }

    fn on_period_requested(&mut self, req: PeriodRequest) {
        self.period_error = None;
        self.events.push(SessionEvent::PeriodRequested {
            period: req.period,
            seq: req.seq,
        });
    }

    pub fn on_period(&mut self, completion: PeriodCompletion) {
        if self.closed {
            return;
        }
        let (period, seq) = (completion.period, completion.seq);

        match self.periods.complete(completion) {
            Ok(points) => {
                let history = normalize(&points);
                self.series = merge(history, self.scheduler.live_candle());
                self.period_error = None;
                self.events.push(SessionEvent::PeriodApplied {
                    period,
                    seq,
                    candles: self.series.len(),
                });
                self.chart.push(&self.series, true);
            }
            Err(SessionError::StaleCompletion { .. }) => {
                debug!(%period, %seq, "superseded period response");
                self.events.push(SessionEvent::Discarded {
                    channel: Channel::Period,
                    seq,
                });
            }
            Err(e) => {
                let showing = self.periods.active();
                self.chart.set_period(showing);
                self.period_error = Some(e.to_string());
                self.events.push(SessionEvent::PeriodFailed {
                    period,
                    seq,
                    reason: e.to_string(),
                    showing,
                });
            }
        }
    }

    // --- chart --------------------------------------------------------------

    pub fn on_container_resized(&mut self, width: u32) {
        if self.closed {
            return;
        }
        if self.chart.is_mounted() {
            self.chart.on_container_resized(width);
        } else {
            self.mount();
        }
    }

    pub fn set_height(&mut self, height: u32) {
        if self.closed || height == 0 {
            return;
        }
        let was_mounted = self.chart.is_mounted();
        let remounted = self.chart.set_height(height, &self.series);

        if was_mounted && (remounted.is_some() || !self.chart.is_mounted()) {
            self.events.push(SessionEvent::ChartReleased);
        }
        if let Some((width, height)) = remounted {
            self.events.push(SessionEvent::ChartMounted { width, height });
        }
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if !self.closed {
            self.chart.set_mode(mode);
        }
    }

    /// Releases the chart and stops accepting completions. Idempotent.
    pub fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self.chart.teardown() {
            self.events.push(SessionEvent::ChartReleased);
        }
        self.events.push(SessionEvent::Closed);
    }

    pub fn status(&self) -> SessionStatus {
        if self.scheduler.is_degraded() {
            SessionStatus::Degraded
        } else if self.series.is_empty() && !self.scheduler.has_data() {
            SessionStatus::Loading
        } else {
            SessionStatus::Live
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            coin: self.coin.clone(),
            pool: self.pool.clone(),
            period: self.periods.active(),
            displayed: self.periods.displayed(),
            price: self.scheduler.price().cloned(),
            trades: self.scheduler.trades().to_vec(),
            live: self.scheduler.live_candle(),
            series: self.series.clone(),
            status: self.status(),
            period_loading: self.periods.is_fetching(),
            period_error: self.period_error.clone(),
            closed: self.closed,
        }
    }
}
