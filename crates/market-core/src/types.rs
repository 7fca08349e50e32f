//! Core domain types.
//!
//! Цель:
//! - запретить "голые" f64 в бизнес-логике
//! - зафиксировать единицы измерения (секунды vs миллисекунды)

use std::fmt;

use serde::{Deserialize, Serialize};

/// Цена в USD
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub f64);

/// Количество токена
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Qty(pub f64);

/// Денежная сумма (USD)
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(pub f64);

/// Процентное изменение (2.5 = +2.5%)
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pct(pub f64);

/// Время в миллисекундах (unix epoch), так отдаёт провайдер
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimestampMs(pub i64);

/// Время в секундах (unix epoch), так хранит серия и график
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimestampSec(pub i64);

//
// --- Conversions ------------------------------------------------------------
//

impl TimestampMs {
    /// Floors towards negative infinity so pre-epoch values stay monotonic.
    pub fn to_secs(self) -> TimestampSec {
        TimestampSec(self.0.div_euclid(1_000))
    }
}

//
// --- Display (для логов) ----------------------------------------------------
//

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl fmt::Display for Qty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

impl fmt::Display for Pct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

impl fmt::Display for TimestampSec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millis_floor_to_seconds() {
        assert_eq!(TimestampMs(60_000).to_secs(), TimestampSec(60));
        assert_eq!(TimestampMs(60_999).to_secs(), TimestampSec(60));
        assert_eq!(TimestampMs(-1).to_secs(), TimestampSec(-1));
    }

    #[test]
    fn pct_display_has_one_decimal() {
        assert_eq!(Pct(2.345).to_string(), "2.3%");
        assert_eq!(Price(1234.5).to_string(), "$1234.50");
    }
}
