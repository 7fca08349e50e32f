use tracing::{debug, info, trace, warn};

use crate::event::SessionEvent;

pub fn consume(events: Vec<SessionEvent>) {
    for e in events {
        match e {
            SessionEvent::ChartMounted { width, height } => {
                info!(width, height, "chart mounted");
            }
            SessionEvent::ChartReleased => {
                debug!("chart released");
            }
            SessionEvent::PollStarted { seq } => {
                trace!(%seq, "poll started");
            }
            SessionEvent::FeedApplied { feed, seq } => {
                debug!(%feed, %seq, "feed applied");
            }
            SessionEvent::FeedUnchanged { feed, seq } => {
                trace!(%feed, %seq, "feed unchanged");
            }
            SessionEvent::FeedFailed { feed, seq, reason } => {
                warn!(%feed, %seq, %reason, "feed failed, keeping last value");
            }
            SessionEvent::SeriesMerged { candles } => {
                trace!(candles, "live candle merged");
            }
            SessionEvent::PeriodRequested { period, seq } => {
                info!(%period, %seq, "period requested");
            }
            SessionEvent::PeriodApplied { period, seq, candles } => {
                info!(%period, %seq, candles, "period applied");
            }
            SessionEvent::PeriodFailed {
                period,
                seq,
                reason,
                showing,
            } => {
                warn!(%period, %seq, %reason, %showing, "period fetch failed");
            }
            SessionEvent::Discarded { channel, seq } => {
                debug!(%channel, %seq, "stale completion discarded");
            }
            SessionEvent::Closed => {
                info!("session closed");
            }
        }
    }
}
