//! Mock Market Data Gateway
//!
//! For testing and offline demo use. Returns realistic static data.

use async_trait::async_trait;

use crate::error::{AdvisorError, Result};
use crate::model::{NftHoldings, ProtocolMetric, TokenBalance, TokenMetric, WalletHoldings};

use super::MarketDataGateway;

/// Deterministic gateway with fixture data
#[derive(Clone, Debug, Default)]
pub struct MockGateway;

impl MockGateway {
    pub fn new() -> Self {
        Self
    }

    /// (name, price, 24h change, market cap, 24h volume)
    fn token_fixture(symbol: &str) -> Option<(&'static str, f64, f64, f64, f64)> {
        match symbol.to_uppercase().as_str() {
            "ETH" => Some(("Ethereum", 3245.67, 2.5, 3.895e11, 1.57e10)),
            "BTC" => Some(("Bitcoin", 51234.89, 1.2, 9.783e11, 2.84e10)),
            "USDC" => Some(("USD Coin", 1.0, 0.0, 4.52e10, 3.1e9)),
            "DAI" => Some(("Dai", 1.0, 0.1, 5.3e9, 2.8e8)),
            "ORA" => Some(("ORA", 4.56, 15.3, 1.2e9, 4.567e8)),
            _ => None,
        }
    }

    fn protocol_fixture(slug: &str) -> Option<(&'static str, f64, f64)> {
        match slug.to_lowercase().as_str() {
            "uniswap" => Some(("Uniswap", 4_100_000_000.0, 1.2)),
            "aave" => Some(("Aave", 11_400_000_000.0, -0.8)),
            "compound" => Some(("Compound", 2_300_000_000.0, 0.4)),
            _ => None,
        }
    }
}

#[async_trait]
impl MarketDataGateway for MockGateway {
    async fn token_metrics(&self, symbols: &[&str]) -> Result<Vec<TokenMetric>> {
        Ok(symbols
            .iter()
            .filter_map(|symbol| {
                Self::token_fixture(symbol).map(|(name, price, change, cap, volume)| {
                    TokenMetric {
                        symbol: symbol.to_uppercase(),
                        name: name.into(),
                        price,
                        market_cap_usd: cap,
                        volume_24h_usd: volume,
                        change_24h: change,
                    }
                })
            })
            .collect())
    }

    async fn protocol_metrics(&self, slugs: &[&str]) -> Result<Vec<ProtocolMetric>> {
        Ok(slugs
            .iter()
            .filter_map(|slug| {
                Self::protocol_fixture(slug).map(|(name, tvl, change_7d)| ProtocolMetric {
                    slug: slug.to_lowercase(),
                    name: name.into(),
                    tvl,
                    change_7d,
                })
            })
            .collect())
    }

    async fn wallet_holdings(&self, _chain: &str, address: &str) -> Result<WalletHoldings> {
        if !address.starts_with("0x") {
            return Err(AdvisorError::RemoteData(format!(
                "unknown address format: {address}"
            )));
        }

        Ok(WalletHoldings {
            address: address.to_string(),
            balances: vec![
                TokenBalance {
                    name: "Ether".into(),
                    symbol: "ETH".into(),
                    raw_balance: "1245500000000000000000".into(),
                    decimals: 18,
                    usd_value: 4_042_480.0,
                },
                TokenBalance {
                    name: "USD Coin".into(),
                    symbol: "USDC".into(),
                    raw_balance: "250000000000".into(),
                    decimals: 6,
                    usd_value: 250_000.0,
                },
                TokenBalance {
                    name: "Dai".into(),
                    symbol: "DAI".into(),
                    raw_balance: "120000000000000000000000".into(),
                    decimals: 18,
                    usd_value: 120_000.0,
                },
            ],
        })
    }

    async fn nft_holdings(&self, _chain: &str, address: &str) -> Result<NftHoldings> {
        Ok(NftHoldings {
            address: address.to_string(),
            collections: vec![
                "CryptoPunks".into(),
                "Art Blocks".into(),
                "ENS: Ethereum Name Service".into(),
            ],
        })
    }

    fn name(&self) -> &str {
        "MockGateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_known_tokens_resolve() {
        let gateway = MockGateway::new();
        let metrics = gateway.token_metrics(&["eth", "usdc"]).await.unwrap();

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].symbol, "ETH");
        assert!(metrics[0].market_cap_usd > 1e11);
    }

    #[tokio::test]
    async fn test_unknown_symbols_are_skipped() {
        let gateway = MockGateway::new();
        let metrics = gateway.token_metrics(&["eth", "notreal"]).await.unwrap();
        assert_eq!(metrics.len(), 1);
    }

    #[tokio::test]
    async fn test_wallet_fixture() {
        let gateway = MockGateway::new();
        let holdings = gateway
            .wallet_holdings("eth-mainnet", "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045")
            .await
            .unwrap();
        assert_eq!(holdings.balances.len(), 3);
    }
}
