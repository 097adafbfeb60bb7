//! HTTP Market Data Gateway
//!
//! Live implementation backed by CoinGecko (token markets), DefiLlama
//! (protocol TVL) and GoldRush (wallet balances and NFTs).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::error::{AdvisorError, Result};
use crate::model::{NftHoldings, ProtocolMetric, TokenBalance, TokenMetric, WalletHoldings};

use super::MarketDataGateway;

const COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
const DEFILLAMA_URL: &str = "https://api.llama.fi";
const GOLDRUSH_URL: &str = "https://api.covalenthq.com/v1";

/// HTTP gateway configuration
#[derive(Clone, Debug)]
pub struct HttpGatewayConfig {
    pub coingecko_url: String,
    pub defillama_url: String,
    pub goldrush_url: String,
    /// GoldRush API key; `None` degrades wallet/NFT lookups to
    /// `MissingCredential`
    pub goldrush_api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            coingecko_url: COINGECKO_URL.into(),
            defillama_url: DEFILLAMA_URL.into(),
            goldrush_url: GOLDRUSH_URL.into(),
            goldrush_api_key: None,
            timeout_secs: 10,
        }
    }
}

impl HttpGatewayConfig {
    pub fn from_env() -> Self {
        Self {
            goldrush_api_key: std::env::var("GOLDRUSH_API_KEY").ok(),
            ..Default::default()
        }
    }
}

/// Live market data gateway
pub struct HttpGateway {
    client: reqwest::Client,
    config: HttpGatewayConfig,
}

/// Map a ticker symbol to its CoinGecko coin id. Unknown symbols fall back
/// to the lowercase symbol, which CoinGecko resolves for many smaller coins.
fn coin_id(symbol: &str) -> String {
    match symbol.to_lowercase().as_str() {
        "eth" => "ethereum".into(),
        "btc" => "bitcoin".into(),
        "usdc" => "usd-coin".into(),
        "usdt" => "tether".into(),
        "dai" => "dai".into(),
        "sol" => "solana".into(),
        "matic" => "matic-network".into(),
        "uni" => "uniswap".into(),
        "link" => "chainlink".into(),
        "aave" => "aave".into(),
        other => other.to_string(),
    }
}

/// Accept a numeric field arriving as either a JSON number or a numeric
/// string (GoldRush quotes USD values as strings on some chains).
fn f64_flexible<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
        None,
    }

    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => n,
        NumberOrString::Text(s) => s.parse().unwrap_or(0.0),
        NumberOrString::None => 0.0,
    })
}

/// CoinGecko `coins/markets` row
#[derive(Deserialize)]
struct CoinMarketRow {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    total_volume: Option<f64>,
}

/// DefiLlama `/protocols` row
#[derive(Deserialize)]
struct LlamaProtocolRow {
    #[serde(default)]
    slug: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tvl: Option<f64>,
    #[serde(default)]
    change_7d: Option<f64>,
}

/// GoldRush response envelope
#[derive(Deserialize)]
struct GoldRushEnvelope<T> {
    data: Option<GoldRushData<T>>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GoldRushData<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// GoldRush balances item
#[derive(Deserialize)]
struct BalanceItem {
    #[serde(default)]
    contract_name: Option<String>,
    #[serde(default)]
    contract_ticker_symbol: Option<String>,
    #[serde(default)]
    balance: Option<String>,
    #[serde(default)]
    contract_decimals: Option<u32>,
    #[serde(default, deserialize_with = "f64_flexible")]
    quote: f64,
}

/// GoldRush NFT item
#[derive(Deserialize)]
struct NftItem {
    #[serde(default)]
    contract_name: Option<String>,
}

impl HttpGateway {
    pub fn from_config(config: HttpGatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    /// Create from environment variables (`GOLDRUSH_API_KEY`)
    pub fn from_env() -> Self {
        Self::from_config(HttpGatewayConfig::from_env())
    }

    fn goldrush_key(&self) -> Result<&str> {
        self.config
            .goldrush_api_key
            .as_deref()
            .ok_or_else(|| AdvisorError::MissingCredential("GOLDRUSH_API_KEY".into()))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AdvisorError::RemoteData(format!(
                "request failed with status {status}: {body}"
            )))
        }
    }

    async fn goldrush_items<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Vec<T>> {
        let key = self.goldrush_key()?;

        let response = self
            .client
            .get(url)
            .basic_auth(key, Option::<&str>::None)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let envelope: GoldRushEnvelope<T> = response
            .json()
            .await
            .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;

        if envelope.error {
            return Err(AdvisorError::RemoteData(
                envelope
                    .error_message
                    .unwrap_or_else(|| "unknown GoldRush error".into()),
            ));
        }

        Ok(envelope.data.map(|d| d.items).unwrap_or_default())
    }
}

#[async_trait]
impl MarketDataGateway for HttpGateway {
    async fn token_metrics(&self, symbols: &[&str]) -> Result<Vec<TokenMetric>> {
        let ids: Vec<String> = symbols.iter().map(|s| coin_id(s)).collect();
        let url = format!(
            "{}/coins/markets?vs_currency=usd&ids={}&order=market_cap_desc&per_page=100&page=1&sparkline=false",
            self.config.coingecko_url,
            ids.join(",")
        );

        let response = self.client.get(&url).send().await?;
        let response = Self::check_status(response).await?;

        let rows: Vec<CoinMarketRow> = response
            .json()
            .await
            .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| TokenMetric {
                symbol: row.symbol.to_uppercase(),
                name: row.name,
                price: row.current_price.unwrap_or(0.0),
                market_cap_usd: row.market_cap.unwrap_or(0.0),
                volume_24h_usd: row.total_volume.unwrap_or(0.0),
                change_24h: row.price_change_percentage_24h.unwrap_or(0.0),
            })
            .collect())
    }

    async fn protocol_metrics(&self, slugs: &[&str]) -> Result<Vec<ProtocolMetric>> {
        let url = format!("{}/protocols", self.config.defillama_url);

        let response = self.client.get(&url).send().await?;
        let response = Self::check_status(response).await?;

        let rows: Vec<LlamaProtocolRow> = response
            .json()
            .await
            .map_err(|e| AdvisorError::MalformedResponse(e.to_string()))?;

        let wanted: Vec<String> = slugs.iter().map(|s| s.to_lowercase()).collect();

        Ok(rows
            .into_iter()
            .filter(|row| wanted.contains(&row.slug.to_lowercase()))
            .map(|row| ProtocolMetric {
                slug: row.slug,
                name: row.name,
                tvl: row.tvl.unwrap_or(0.0),
                change_7d: row.change_7d.unwrap_or(0.0),
            })
            .collect())
    }

    async fn wallet_holdings(&self, chain: &str, address: &str) -> Result<WalletHoldings> {
        let url = format!(
            "{}/{chain}/address/{address}/balances_v2/",
            self.config.goldrush_url
        );

        let items: Vec<BalanceItem> = self.goldrush_items(&url).await?;

        Ok(WalletHoldings {
            address: address.to_string(),
            balances: items
                .into_iter()
                .map(|item| TokenBalance {
                    name: item.contract_name.unwrap_or_default(),
                    symbol: item.contract_ticker_symbol.unwrap_or_default(),
                    raw_balance: item.balance.unwrap_or_else(|| "0".into()),
                    decimals: item.contract_decimals.unwrap_or(18),
                    usd_value: item.quote,
                })
                .collect(),
        })
    }

    async fn nft_holdings(&self, chain: &str, address: &str) -> Result<NftHoldings> {
        let url = format!(
            "{}/{chain}/address/{address}/balances_nft/",
            self.config.goldrush_url
        );

        let items: Vec<NftItem> = self.goldrush_items(&url).await?;

        Ok(NftHoldings {
            address: address.to_string(),
            collections: items
                .into_iter()
                .filter_map(|item| item.contract_name)
                .collect(),
        })
    }

    fn name(&self) -> &str {
        "HttpGateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_id_mapping() {
        assert_eq!(coin_id("ETH"), "ethereum");
        assert_eq!(coin_id("usdc"), "usd-coin");
        assert_eq!(coin_id("ORA"), "ora");
    }

    #[tokio::test]
    async fn test_wallet_without_key_is_missing_credential() {
        let gateway = HttpGateway::from_config(HttpGatewayConfig::default());
        let err = gateway
            .wallet_holdings("eth-mainnet", "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045")
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::MissingCredential(_)));
    }

    #[test]
    fn test_balance_item_accepts_string_quote() {
        let item: BalanceItem = serde_json::from_str(
            r#"{"contract_name":"Ether","contract_ticker_symbol":"ETH",
                "balance":"1000000000000000000","contract_decimals":18,"quote":"3245.67"}"#,
        )
        .unwrap();
        assert!((item.quote - 3245.67).abs() < 1e-9);

        let item: BalanceItem =
            serde_json::from_str(r#"{"contract_name":"Ether","quote":12.5}"#).unwrap();
        assert!((item.quote - 12.5).abs() < 1e-9);
    }
}
