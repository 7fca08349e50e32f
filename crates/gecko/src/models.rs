//! Upstream payload shapes and their conversion into domain types.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use market_core::types::{Money, Pct, Price, Qty, TimestampMs};
use market_core::{PriceSnapshot, Side, Trade};

// --- /coins/{id} -------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct CoinDetails {
    pub market_data: MarketData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MarketData {
    pub current_price: UsdValue,
    #[serde(default)]
    pub price_change_percentage_24h_in_currency: UsdValue,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UsdValue {
    #[serde(default)]
    pub usd: Option<f64>,
}

impl CoinDetails {
    pub(crate) fn into_snapshot(self, coin: &str, observed_at: TimestampMs) -> Option<PriceSnapshot> {
        let usd = self.market_data.current_price.usd?;
        let change = self
            .market_data
            .price_change_percentage_24h_in_currency
            .usd
            .unwrap_or(0.0);

        Some(PriceSnapshot {
            coin: coin.to_string(),
            usd: Price(usd),
            change_24h: Pct(change),
            observed_at,
        })
    }
}

// --- /onchain/networks/{network}/pools/{address}/trades -----------------------

#[derive(Debug, Deserialize)]
pub(crate) struct DataList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TradeResource {
    pub attributes: TradeAttributes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TradeAttributes {
    pub price_in_usd: String,
    pub block_timestamp: String,
    pub kind: String,
    pub from_token_amount: String,
    pub volume_in_usd: String,
}

impl TradeAttributes {
    /// `None` when a numeric field or the timestamp does not parse.
    pub(crate) fn into_trade(self) -> Option<Trade> {
        let price: f64 = self.price_in_usd.parse().ok()?;
        let amount: f64 = self.from_token_amount.parse().ok()?;
        let value: f64 = self.volume_in_usd.parse().ok()?;
        let ts = DateTime::parse_from_rfc3339(&self.block_timestamp).ok()?;

        let side = if self.kind == "buy" { Side::Buy } else { Side::Sell };

        Some(Trade {
            price: Price(price),
            timestamp: TimestampMs(ts.timestamp_millis()),
            side,
            amount: Qty(amount),
            value: Money(value),
        })
    }
}

pub(crate) fn trades_from(list: DataList<TradeResource>) -> Vec<Trade> {
    let total = list.data.len();
    let trades: Vec<Trade> = list
        .data
        .into_iter()
        .filter_map(|r| r.attributes.into_trade())
        .collect();

    if trades.len() != total {
        debug!(skipped = total - trades.len(), "dropped unparsable trades");
    }
    trades
}

// --- pools -------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct PoolResource {
    pub id: String,
    pub attributes: PoolAttributes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PoolAttributes {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub name: String,
}

/// Liquidity pool reference. `id` is `network_address`, the form the trades
/// endpoint is addressed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolData {
    pub id: String,
    pub address: String,
    pub name: String,
    pub network: String,
}

impl From<PoolResource> for PoolData {
    fn from(r: PoolResource) -> Self {
        let network = r
            .id
            .split_once('_')
            .map(|(network, _)| network.to_string())
            .unwrap_or_default();
        Self {
            id: r.id,
            address: r.attributes.address,
            name: r.attributes.name,
            network,
        }
    }
}

/// Splits a pool id into `(network, address)`.
pub(crate) fn split_pool_id(pool_id: &str) -> Option<(&str, &str)> {
    let (network, address) = pool_id.split_once('_')?;
    if network.is_empty() || address.is_empty() {
        return None;
    }
    Some((network, address))
}

// --- search / trending -------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub coins: Vec<SearchCoin>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub data: Option<TrendingData>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingData {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<UsdChange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsdChange {
    #[serde(default)]
    pub usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendingEntry {
    pub item: TrendingCoin,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TrendingResponse {
    #[serde(default)]
    pub coins: Vec<TrendingEntry>,
}
