//! DeFi Advisor
//!
//! Risk scoring and query-context engine for DeFi liquidity pools.
//! Fetches token, protocol and wallet data on demand, scores pool risk
//! across smart-contract, economic and centralization categories, and
//! resolves conversational queries through a generation provider with a
//! deterministic rule-based fallback.

pub mod cache;
pub mod context;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod gateway;
pub mod model;
pub mod resolver;
pub mod risk;
pub mod session;

pub use cache::{CacheEntry, CachePayload, DataCache, WalletSnapshot, WalletUpdate};
pub use context::ContextAssembler;
pub use error::{AdvisorError, Result};
pub use extract::{EntityExtractor, ExtractedEntities, Topic};
pub use fallback::fallback_answer;
pub use gateway::{HttpGateway, HttpGatewayConfig, MarketDataGateway, MockGateway};
pub use model::{
    NftHoldings, PoolIdentifier, ProtocolMetric, RiskAssessment, RiskCategory, RiskCategoryScore,
    RiskLevel, TokenBalance, TokenMetric, WalletHoldings,
};
pub use resolver::{ResolverConfig, ResponseResolver};
pub use risk::{RiskBands, RiskScorer, RiskWeights};
pub use session::{SessionContext, SessionId};

/// System prompt framing every generation request
pub const DEFI_ASSISTANT_PROMPT: &str = "You are a helpful DeFi assistant that explains complex DeFi concepts in simple terms. Focus on being educational and providing accurate information about blockchain, cryptocurrencies, and decentralized finance protocols. When discussing risks, be balanced and factual.";

/// Assistant message opening a fresh session
pub const GREETING: &str = "Hello! I'm your DeFi assistant powered by Claude. How can I help you understand DeFi protocols today?";
