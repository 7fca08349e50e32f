use market_core::Candle;

use crate::dedup::{DedupPolicy, dedup_sorted};
use crate::series::Series;

/// Folds a live (possibly still forming) candle into a historical series.
///
/// - same time as the last candle: the last candle is replaced
/// - anything else: appended, then re-sorted if it landed out of order
///
/// Ties are resolved in favour of the live candle. Candles the live sample
/// does not collide with are left as they were, and re-applying the same
/// sample is a no-op.
pub fn merge(history: Series, live: Option<Candle>) -> Series {
    let Some(live) = live else {
        return history;
    };

    let mut candles = history.into_vec();

    match candles.last().map(|c| c.time) {
        Some(tail) if tail == live.time => {
            if let Some(last) = candles.last_mut() {
                *last = live;
            }
            return Series::from_sorted(candles);
        }
        Some(tail) if tail > live.time => {}
        _ => {
            candles.push(live);
            return Series::from_sorted(candles);
        }
    }

    // live older than the tail: stable sort keeps it after any historical
    // candle at the same time, so last-wins dedup picks it
    candles.push(live);
    candles.sort_by_key(|c| c.time);
    dedup_sorted(&mut candles, DedupPolicy::LastWins);

    Series::from_sorted(candles)
}
