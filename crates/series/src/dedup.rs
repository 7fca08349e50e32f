use market_core::Candle;

/// Which candle survives when several share a timestamp.
///
/// Bulk normalization keeps the first one seen; the live merge boundary keeps
/// the last one so the freshest in-progress candle is shown.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    #[default]
    FirstWins,
    LastWins,
}

/// Collapses runs of equal timestamps. Input must already be sorted by time.
pub fn dedup_sorted(candles: &mut Vec<Candle>, policy: DedupPolicy) {
    match policy {
        DedupPolicy::FirstWins => candles.dedup_by_key(|c| c.time),
        DedupPolicy::LastWins => {
            // dedup_by держит первый из пары, поэтому переносим более поздний на его место
            candles.dedup_by(|later, kept| {
                if later.time == kept.time {
                    *kept = *later;
                    true
                } else {
                    false
                }
            });
        }
    }
}
