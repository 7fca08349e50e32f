use async_trait::async_trait;

use gecko::{FetchError, GeckoRest};
use market_core::{Candle, OhlcPoint, PriceSnapshot, RangeParams, Trade};

/// Everything a session reads from upstream.
#[async_trait]
pub trait MarketFeed: Send + Sync + 'static {
    async fn coin_price(&self, coin: &str) -> Result<Option<PriceSnapshot>, FetchError>;

    async fn pool_trades(&self, pool_id: &str) -> Result<Vec<Trade>, FetchError>;

    async fn latest_ohlc(&self, coin: &str) -> Result<Option<Candle>, FetchError>;

    async fn ohlc_range(&self, coin: &str, range: RangeParams) -> Result<Vec<OhlcPoint>, FetchError>;
}

#[async_trait]
impl MarketFeed for GeckoRest {
    async fn coin_price(&self, coin: &str) -> Result<Option<PriceSnapshot>, FetchError> {
        GeckoRest::coin_price(self, coin).await
    }

    async fn pool_trades(&self, pool_id: &str) -> Result<Vec<Trade>, FetchError> {
        GeckoRest::pool_trades(self, pool_id).await
    }

    async fn latest_ohlc(&self, coin: &str) -> Result<Option<Candle>, FetchError> {
        GeckoRest::latest_ohlc(self, coin).await
    }

    async fn ohlc_range(&self, coin: &str, range: RangeParams) -> Result<Vec<OhlcPoint>, FetchError> {
        GeckoRest::ohlc_range(self, coin, range).await
    }
}
