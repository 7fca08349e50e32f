pub mod candle;
pub mod period;
pub mod trade;
pub mod types;

pub use candle::{Candle, OhlcPoint};
pub use period::{Period, RangeParams};
pub use trade::{PriceSnapshot, Side, Trade};
