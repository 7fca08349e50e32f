use std::fmt;

use market_core::Period;
use state_machine::seq::Seq;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Price,
    Trades,
    Ohlc,
}

/// Independent sequence spaces. Staleness is only ever judged within one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    Feed(FeedKind),
    Period,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FeedKind::Price => "price",
            FeedKind::Trades => "trades",
            FeedKind::Ohlc => "ohlc",
        })
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Feed(kind) => write!(f, "feed:{kind}"),
            Channel::Period => f.write_str("period"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ChartMounted { width: u32, height: u32 },
    ChartReleased,
    PollStarted { seq: Seq },
    FeedApplied { feed: FeedKind, seq: Seq },
    FeedUnchanged { feed: FeedKind, seq: Seq },
    FeedFailed { feed: FeedKind, seq: Seq, reason: String },
    SeriesMerged { candles: usize },
    PeriodRequested { period: Period, seq: Seq },
    PeriodApplied { period: Period, seq: Seq, candles: usize },
    PeriodFailed { period: Period, seq: Seq, reason: String, showing: Period },
    Discarded { channel: Channel, seq: Seq },
    Closed,
}
