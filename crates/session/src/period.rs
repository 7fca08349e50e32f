use std::sync::Arc;

use tokio::sync::mpsc::Sender;
use tracing::trace;

use gecko::FetchError;
use market_core::{OhlcPoint, Period, RangeParams};
use state_machine::cause::PeriodCause;
use state_machine::seq::{Seq, SeqCounter};
use state_machine::state::PeriodState;
use state_machine::transition::transition;

use crate::error::SessionError;
use crate::event::Channel;
use crate::feed::MarketFeed;

/// Historical range fetch the caller must issue.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PeriodRequest {
    pub seq: Seq,
    pub period: Period,
    pub range: RangeParams,
}

#[derive(Debug)]
pub struct PeriodCompletion {
    pub seq: Seq,
    pub period: Period,
    pub result: Result<Vec<OhlcPoint>, FetchError>,
}

/// Gates historical fetches so only the latest request may replace the
/// series. The active period moves optimistically on request; `displayed`
/// is the period whose data is actually shown.
#[derive(Debug)]
pub struct PeriodController {
    state: PeriodState,
    active: Period,
    displayed: Option<Period>,
    seqs: SeqCounter,
}

impl PeriodController {
    pub fn new(initial: Period) -> Self {
        Self {
            state: PeriodState::Idle,
            active: initial,
            displayed: None,
            seqs: SeqCounter::new(),
        }
    }

    pub fn active(&self) -> Period {
        self.active
    }

    pub fn displayed(&self) -> Option<Period> {
        self.displayed
    }

    pub fn is_fetching(&self) -> bool {
        matches!(self.state, PeriodState::Fetching { .. })
    }

    /// `None` when `period` is already active.
    pub fn request_change(&mut self, period: Period) -> Option<PeriodRequest> {
        if period == self.active {
            return None;
        }
        Some(self.issue(period))
    }

    /// Re-fetches the active period unconditionally.
    pub fn refresh(&mut self) -> PeriodRequest {
        self.issue(self.active)
    }

    fn issue(&mut self, period: Period) -> PeriodRequest {
        let seq = self.seqs.next();
        let cause = PeriodCause::FetchIssued { period, seq };

        if let Ok(next) = transition(self.state, cause) {
            trace!(from = ?self.state, to = ?next, "period transition");
            self.state = next;
        }
        self.active = period;

        PeriodRequest {
            seq,
            period,
            range: period.resolve(),
        }
    }

    /// Accepts the latest request's outcome and returns its points; anything
    /// older comes back as `StaleCompletion`. On failure the active period
    /// falls back to the one still on screen.
    pub fn complete(&mut self, completion: PeriodCompletion) -> Result<Vec<OhlcPoint>, SessionError> {
        let seq = completion.seq;
        let cause = match completion.result {
            Ok(_) => PeriodCause::FetchResolved { seq },
            Err(_) => PeriodCause::FetchFailed { seq },
        };

        let next = transition(self.state, cause).map_err(|_| SessionError::StaleCompletion {
            channel: Channel::Period,
            seq,
        })?;
        trace!(from = ?self.state, to = ?next, "period transition");
        self.state = next;

        match completion.result {
            Ok(points) => {
                self.displayed = Some(completion.period);
                Ok(points)
            }
            Err(e) => {
                if let Some(shown) = self.displayed {
                    self.active = shown;
                }
                Err(SessionError::UpstreamUnavailable(e))
            }
        }
    }
}

pub fn spawn_period_fetch<F: MarketFeed>(
    feed: &Arc<F>,
    coin: &str,
    request: PeriodRequest,
    tx: &Sender<PeriodCompletion>,
) {
    let (feed, tx, coin) = (Arc::clone(feed), tx.clone(), coin.to_string());
    tokio::spawn(async move {
        let result = feed.ohlc_range(&coin, request.range).await;
        let _ = tx
            .send(PeriodCompletion {
                seq: request.seq,
                period: request.period,
                result,
            })
            .await;
    });
}
