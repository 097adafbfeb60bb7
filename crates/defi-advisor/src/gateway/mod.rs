//! Market Data Gateway
//!
//! Uniform accessor over the external data sources: token prices, protocol
//! TVL, wallet holdings and NFT holdings. Operations are independent,
//! idempotent and side-effect-free against the session cache; callers decide
//! whether to cache.

mod http;
mod mock;

pub use http::{HttpGateway, HttpGatewayConfig};
pub use mock::MockGateway;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{NftHoldings, ProtocolMetric, TokenMetric, WalletHoldings};

/// Gateway trait (Strategy pattern)
///
/// Implement this per data-source stack; a failure in one operation must
/// never prevent the others from completing.
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Current market metrics for a list of token symbols
    async fn token_metrics(&self, symbols: &[&str]) -> Result<Vec<TokenMetric>>;

    /// TVL metrics for a list of protocol slugs
    async fn protocol_metrics(&self, slugs: &[&str]) -> Result<Vec<ProtocolMetric>>;

    /// Token balances held by a wallet address on a chain
    async fn wallet_holdings(&self, chain: &str, address: &str) -> Result<WalletHoldings>;

    /// NFT collections owned by a wallet address on a chain
    async fn nft_holdings(&self, chain: &str, address: &str) -> Result<NftHoldings>;

    /// Gateway name
    fn name(&self) -> &str;
}
