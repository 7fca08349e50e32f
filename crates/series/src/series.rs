use serde::Serialize;
use thiserror::Error;

use market_core::Candle;
use market_core::types::TimestampSec;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("candle at index {index} ({time}) is not after the previous one ({prev})")]
    NotAscending {
        index: usize,
        prev: TimestampSec,
        time: TimestampSec,
    },
}

/// Candles strictly ascending by time, one per timestamp.
///
/// The only ways to build one are [`Series::try_from_vec`], which checks the
/// invariant, and the normalize/merge functions of this crate, which
/// establish it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series(Vec<Candle>);

impl Series {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn try_from_vec(candles: Vec<Candle>) -> Result<Self, SeriesError> {
        if let Some(index) = first_violation(&candles) {
            return Err(SeriesError::NotAscending {
                index,
                prev: candles[index - 1].time,
                time: candles[index].time,
            });
        }
        Ok(Self(candles))
    }

    /// Caller guarantees ascending, unique times.
    pub(crate) fn from_sorted(candles: Vec<Candle>) -> Self {
        debug_assert!(first_violation(&candles).is_none());
        Self(candles)
    }

    pub(crate) fn into_vec(self) -> Vec<Candle> {
        self.0
    }

    pub fn as_slice(&self) -> &[Candle] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&Candle> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candle> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Candle;
    type IntoIter = std::slice::Iter<'a, Candle>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn first_violation(candles: &[Candle]) -> Option<usize> {
    candles
        .windows(2)
        .position(|w| w[1].time <= w[0].time)
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(t: i64) -> Candle {
        Candle::new(TimestampSec(t), 1.0, 1.0, 1.0, 1.0)
    }

    #[test]
    fn accepts_strictly_ascending() {
        let s = Series::try_from_vec(vec![c(0), c(60), c(120)]).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.last().map(|c| c.time), Some(TimestampSec(120)));
    }

    #[test]
    fn rejects_duplicate_time() {
        let err = Series::try_from_vec(vec![c(0), c(60), c(60)]).unwrap_err();
        assert_eq!(
            err,
            SeriesError::NotAscending {
                index: 2,
                prev: TimestampSec(60),
                time: TimestampSec(60),
            }
        );
    }

    #[test]
    fn rejects_descending() {
        assert!(Series::try_from_vec(vec![c(60), c(0)]).is_err());
    }
}
