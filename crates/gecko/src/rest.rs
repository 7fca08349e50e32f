use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use market_core::types::TimestampMs;
use market_core::{Candle, OhlcPoint, PriceSnapshot, RangeParams, Trade};

use crate::cache::ResponseCache;
use crate::config::GeckoConfig;
use crate::error::{FetchError, error_message};
use crate::models::{
    CoinDetails, DataList, PoolData, PoolResource, SearchCoin, SearchResponse, TradeResource,
    TrendingCoin, TrendingResponse, split_pool_id, trades_from,
};

/// Live reads: never served from cache.
pub const LIVE: Duration = Duration::ZERO;
/// Default revalidation window for everything else.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

pub type Query<'a> = [(&'a str, String)];

#[derive(Clone)]
pub struct GeckoRest {
    client: reqwest::Client,
    base: String,
    api_key: String,
    cache: Arc<ResponseCache>,
}

impl GeckoRest {
    pub fn new(config: GeckoConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base: config.base_url,
            api_key: config.api_key,
            cache: Arc::new(ResponseCache::new()),
        })
    }

    /// Generic GET. Empty query values are skipped; `ttl == LIVE` bypasses
    /// the response cache in both directions.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query<'_>,
        ttl: Duration,
    ) -> Result<T, FetchError> {
        let url = join_url(&self.base, path);
        let query: Vec<(&str, &str)> = query
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        let key = cache_key(&url, &query);

        let body = match self.cache.get(&key, ttl).await {
            Some(hit) => {
                debug!(%url, "cache hit");
                hit
            }
            None => {
                let body = self.get_json(&url, &query).await?;
                if !ttl.is_zero() {
                    self.cache.put(key, body.clone()).await;
                }
                body
            }
        };

        serde_json::from_value(body).map_err(|source| FetchError::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> Result<serde_json::Value, FetchError> {
        debug!(%url, "GET");

        let resp = self
            .client
            .get(url)
            .query(query)
            .header(API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            warn!(%url, %status, %message, "upstream error");
            return Err(FetchError::Http { status, message });
        }

        Ok(resp.json().await?)
    }

    // --- live reads ---------------------------------------------------------

    /// Current USD price and 24h change. `None` if the coin has no USD quote.
    pub async fn coin_price(&self, coin: &str) -> Result<Option<PriceSnapshot>, FetchError> {
        let details: CoinDetails = self
            .fetch(
                &format!("coins/{coin}"),
                &[
                    ("localization", "false".into()),
                    ("tickers", "false".into()),
                    ("market_data", "true".into()),
                    ("community_data", "false".into()),
                    ("developer_data", "false".into()),
                    ("sparkline", "false".into()),
                ],
                LIVE,
            )
            .await?;

        let now = TimestampMs(chrono::Utc::now().timestamp_millis());
        Ok(details.into_snapshot(coin, now))
    }

    /// Recent trades of a `network_address` pool. A malformed pool id yields
    /// no trades without a request.
    pub async fn pool_trades(&self, pool_id: &str) -> Result<Vec<Trade>, FetchError> {
        let Some((network, address)) = split_pool_id(pool_id) else {
            debug!(pool_id, "pool id is not network_address, skipping trades");
            return Ok(Vec::new());
        };

        let list: DataList<TradeResource> = self
            .fetch(&format!("onchain/networks/{network}/pools/{address}/trades"), &[], LIVE)
            .await?;

        Ok(trades_from(list))
    }

    /// Latest (possibly still forming) candle of the 1-day OHLC feed.
    pub async fn latest_ohlc(&self, coin: &str) -> Result<Option<Candle>, FetchError> {
        let points = self.ohlc(coin, RangeParams { days: 1 }, LIVE).await?;
        Ok(points.last().map(Candle::from_point))
    }

    // --- cached reads -------------------------------------------------------

    pub async fn ohlc_range(&self, coin: &str, range: RangeParams) -> Result<Vec<OhlcPoint>, FetchError> {
        self.ohlc(coin, range, DEFAULT_TTL).await
    }

    async fn ohlc(&self, coin: &str, range: RangeParams, ttl: Duration) -> Result<Vec<OhlcPoint>, FetchError> {
        self.fetch(
            &format!("coins/{coin}/ohlc"),
            &[
                ("vs_currency", "usd".into()),
                ("days", range.days.to_string()),
                ("precision", "full".into()),
            ],
            ttl,
        )
        .await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchCoin>, FetchError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let resp: SearchResponse = self
            .fetch("search", &[("query", query.to_string())], DEFAULT_TTL)
            .await?;
        Ok(resp.coins)
    }

    pub async fn trending(&self) -> Result<Vec<TrendingCoin>, FetchError> {
        let resp: TrendingResponse = self.fetch("search/trending", &[], DEFAULT_TTL).await?;
        Ok(resp.coins.into_iter().map(|e| e.item).collect())
    }

    /// Best pool for a coin: the on-chain token lookup when network and
    /// contract are known, a general pool search otherwise.
    pub async fn pools(
        &self,
        coin: &str,
        network: Option<&str>,
        contract: Option<&str>,
    ) -> Result<Option<PoolData>, FetchError> {
        let list: DataList<PoolResource> = match (network, contract) {
            (Some(network), Some(contract)) if !network.is_empty() && !contract.is_empty() => {
                self.fetch(
                    &format!("onchain/networks/{network}/tokens/{contract}/pools"),
                    &[],
                    DEFAULT_TTL,
                )
                .await?
            }
            _ => {
                self.fetch("onchain/search/pools", &[("query", coin.to_string())], DEFAULT_TTL)
                    .await?
            }
        };

        Ok(list.data.into_iter().next().map(PoolData::from))
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

fn cache_key(url: &str, query: &[(&str, &str)]) -> String {
    let mut pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
    pairs.sort();
    format!("{url}?{}", pairs.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_join_tolerates_slashes() {
        assert_eq!(join_url("https://a/api/v3/", "/coins/x"), "https://a/api/v3/coins/x");
        assert_eq!(join_url("https://a/api/v3", "coins/x"), "https://a/api/v3/coins/x");
    }

    #[test]
    fn cache_key_ignores_param_order() {
        let a = cache_key("u", &[("b", "2"), ("a", "1")]);
        let b = cache_key("u", &[("a", "1"), ("b", "2")]);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn malformed_pool_id_skips_request() {
        // адрес невалидный, до сети дело не доходит
        let rest = GeckoRest::new(GeckoConfig::new("http://127.0.0.1:9", "k").unwrap()).unwrap();
        assert!(rest.pool_trades("not-a-pool").await.unwrap().is_empty());
        assert!(rest.search("  ").await.unwrap().is_empty());
    }
}
