use serde::{Deserialize, Serialize};

use crate::types::{Price, TimestampMs, TimestampSec};

/// Raw provider point: `[timestamp_ms, open, high, low, close]`.
pub type OhlcPoint = [f64; 5];

/// One OHLC bucket. Time is in seconds; OHLC consistency is not checked here.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: TimestampSec,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
}

impl Candle {
    pub fn new(time: TimestampSec, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open: Price(open),
            high: Price(high),
            low: Price(low),
            close: Price(close),
        }
    }

    /// Provider points carry milliseconds; the candle keeps seconds.
    pub fn from_point(p: &OhlcPoint) -> Self {
        let ms = TimestampMs(p[0] as i64);
        Self::new(ms.to_secs(), p[1], p[2], p[3], p[4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_is_converted_to_seconds() {
        let c = Candle::from_point(&[1_700_000_060_000.0, 1.0, 2.0, 0.5, 1.5]);
        assert_eq!(c.time, TimestampSec(1_700_000_060));
        assert_eq!(c.high, Price(2.0));
        assert_eq!(c.close, Price(1.5));
    }
}
