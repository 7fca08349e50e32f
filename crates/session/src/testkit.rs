use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use gecko::FetchError;
use market_core::types::{Money, Pct, Price, Qty, TimestampMs, TimestampSec};
use market_core::{Candle, OhlcPoint, PriceSnapshot, RangeParams, Side, Trade};
use series::Series;

use crate::chart::{ChartConfig, ChartHost, OptionsPatch, RenderSurface};
use crate::event::FeedKind;
use crate::feed::MarketFeed;

//
// --- Fixtures ----------------------------------------------------------------
//

pub fn candle(t: i64, close: f64) -> Candle {
    Candle::new(TimestampSec(t), close, close, close, close)
}

pub fn point(t_ms: i64, close: f64) -> OhlcPoint {
    [t_ms as f64, close, close, close, close]
}

pub fn series_of(times: &[i64]) -> Series {
    Series::try_from_vec(times.iter().map(|t| candle(*t, 1.0)).collect()).unwrap()
}

pub fn price(usd: f64) -> PriceSnapshot {
    PriceSnapshot {
        coin: "bitcoin".into(),
        usd: Price(usd),
        change_24h: Pct(0.0),
        observed_at: TimestampMs(0),
    }
}

pub fn trade(p: f64) -> Trade {
    Trade {
        price: Price(p),
        timestamp: TimestampMs(0),
        side: Side::Buy,
        amount: Qty(1.0),
        value: Money(p),
    }
}

pub fn http_error() -> FetchError {
    FetchError::Http {
        status: reqwest::StatusCode::BAD_GATEWAY,
        message: "Bad Gateway".into(),
    }
}

//
// --- Feed --------------------------------------------------------------------
//

#[derive(Clone)]
struct RangeScript {
    delay: Duration,
    points: Vec<OhlcPoint>,
}

/// Scripted upstream. Ranges answer per `days` after a virtual delay; live
/// feeds take their delays per call from a queue, then answer at once.
#[derive(Default)]
pub struct FakeFeed {
    ranges: Mutex<HashMap<u32, RangeScript>>,
    delays: Mutex<HashMap<FeedKind, VecDeque<Duration>>>,
    live_queue: Mutex<VecDeque<Candle>>,
    live: Mutex<Option<Candle>>,
    price: Mutex<Option<f64>>,
    fail_trades: Mutex<bool>,
    range_calls: AtomicUsize,
    live_calls: AtomicUsize,
}

impl FakeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn range(self, days: u32, delay: Duration, points: Vec<OhlcPoint>) -> Self {
        self.ranges.lock().unwrap().insert(days, RangeScript { delay, points });
        self
    }

    /// Per-call delays of one live feed, in call order.
    pub fn delays(self, feed: FeedKind, delays: Vec<Duration>) -> Self {
        self.delays.lock().unwrap().insert(feed, delays.into());
        self
    }

    /// Candles handed out by successive OHLC calls before falling back to
    /// the fixed live value.
    pub fn live_sequence(self, candles: Vec<Candle>) -> Self {
        *self.live_queue.lock().unwrap() = candles.into();
        self
    }

    async fn wait(&self, feed: FeedKind) {
        let delay = self
            .delays
            .lock()
            .unwrap()
            .get_mut(&feed)
            .and_then(|q| q.pop_front());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    pub fn set_live(&self, c: Candle) {
        *self.live.lock().unwrap() = Some(c);
    }

    pub fn price(self, usd: f64) -> Self {
        *self.price.lock().unwrap() = Some(usd);
        self
    }

    pub fn failing_trades(self) -> Self {
        *self.fail_trades.lock().unwrap() = true;
        self
    }

    pub fn range_calls(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }

    pub fn live_calls(&self) -> usize {
        self.live_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketFeed for FakeFeed {
    async fn coin_price(&self, _coin: &str) -> Result<Option<PriceSnapshot>, FetchError> {
        self.wait(FeedKind::Price).await;
        let usd = *self.price.lock().unwrap();
        Ok(usd.map(price))
    }

    async fn pool_trades(&self, _pool_id: &str) -> Result<Vec<Trade>, FetchError> {
        self.wait(FeedKind::Trades).await;
        if *self.fail_trades.lock().unwrap() {
            return Err(http_error());
        }
        Ok(vec![trade(1.0)])
    }

    async fn latest_ohlc(&self, _coin: &str) -> Result<Option<Candle>, FetchError> {
        self.live_calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.live_queue.lock().unwrap().pop_front();
        self.wait(FeedKind::Ohlc).await;
        Ok(queued.or(*self.live.lock().unwrap()))
    }

    async fn ohlc_range(&self, _coin: &str, range: RangeParams) -> Result<Vec<OhlcPoint>, FetchError> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.ranges.lock().unwrap().get(&range.days).cloned();
        let Some(script) = script else {
            return Ok(Vec::new());
        };
        tokio::time::sleep(script.delay).await;
        Ok(script.points)
    }
}

//
// --- Chart host --------------------------------------------------------------
//

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetData(usize),
    Options(Option<bool>),
    Fit,
    Resize(u32),
}

#[derive(Default)]
struct HostLog {
    width: Option<u32>,
    configs: Vec<ChartConfig>,
    calls: Vec<Call>,
    observing: bool,
    disconnects: usize,
    destroyed: usize,
}

/// Host whose surfaces write into a shared log; clones observe the same log.
#[derive(Clone, Default)]
pub struct RecordingHost {
    log: Arc<Mutex<HostLog>>,
}

impl RecordingHost {
    pub fn new(width: Option<u32>) -> Self {
        let host = Self::default();
        host.log.lock().unwrap().width = width;
        host
    }

    pub fn set_width(&mut self, width: Option<u32>) {
        self.log.lock().unwrap().width = width;
    }

    pub fn created(&self) -> usize {
        self.log.lock().unwrap().configs.len()
    }

    pub fn last_config(&self) -> Option<ChartConfig> {
        self.log.lock().unwrap().configs.last().cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.log.lock().unwrap().calls.clear();
    }

    pub fn observing(&self) -> bool {
        self.log.lock().unwrap().observing
    }

    pub fn disconnects(&self) -> usize {
        self.log.lock().unwrap().disconnects
    }

    pub fn destroyed(&self) -> usize {
        self.log.lock().unwrap().destroyed
    }
}

pub struct RecordingSurface {
    log: Arc<Mutex<HostLog>>,
}

impl RenderSurface for RecordingSurface {
    fn set_data(&mut self, series: &Series) {
        self.log.lock().unwrap().calls.push(Call::SetData(series.len()));
    }

    fn apply_options(&mut self, patch: &OptionsPatch) {
        self.log.lock().unwrap().calls.push(Call::Options(patch.time_visible));
    }

    fn fit_visible_range(&mut self) {
        self.log.lock().unwrap().calls.push(Call::Fit);
    }

    fn resize(&mut self, width: u32) {
        self.log.lock().unwrap().calls.push(Call::Resize(width));
    }

    fn destroy(&mut self) {
        self.log.lock().unwrap().destroyed += 1;
    }
}

impl ChartHost for RecordingHost {
    type Surface = RecordingSurface;

    fn container_width(&self) -> Option<u32> {
        self.log.lock().unwrap().width
    }

    fn create_surface(&mut self, config: &ChartConfig) -> RecordingSurface {
        self.log.lock().unwrap().configs.push(config.clone());
        RecordingSurface {
            log: Arc::clone(&self.log),
        }
    }

    fn observe_resize(&mut self) {
        self.log.lock().unwrap().observing = true;
    }

    fn disconnect_resize(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.observing = false;
        log.disconnects += 1;
    }
}
