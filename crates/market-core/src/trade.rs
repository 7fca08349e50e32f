use serde::{Deserialize, Serialize};

use crate::types::{Money, Pct, Price, Qty, TimestampMs};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// One pool trade tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub price: Price,
    pub timestamp: TimestampMs,
    pub side: Side,
    pub amount: Qty,
    pub value: Money,
}

/// Scalar price view of a coin at the moment it was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub coin: String,
    pub usd: Price,
    pub change_24h: Pct,
    pub observed_at: TimestampMs,
}
