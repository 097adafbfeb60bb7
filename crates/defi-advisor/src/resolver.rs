//! Response Resolver
//!
//! Orchestrates one conversational turn: extract entities from the query,
//! fetch their data concurrently, assemble the data context, ask the
//! generation provider, and fall back to the rule table when generation is
//! unavailable. A turn always produces exactly one assistant message.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use navigator_core::{Completion, GenerationOptions, GenerationProvider, Message};

use crate::cache::{CachePayload, WalletUpdate};
use crate::context::ContextAssembler;
use crate::error::{AdvisorError, Result};
use crate::extract::{EntityExtractor, ExtractedEntities, Topic};
use crate::fallback::fallback_answer;
use crate::gateway::MarketDataGateway;
use crate::model::{PoolIdentifier, RiskAssessment, TokenMetric};
use crate::risk::RiskScorer;
use crate::session::SessionContext;
use crate::DEFI_ASSISTANT_PROMPT;

/// Token symbols fetched up front so the first turn already has context
const WARM_UP_SYMBOLS: [&str; 4] = ["eth", "btc", "usdc", "dai"];

/// Protocol slugs fetched up front
const WARM_UP_PROTOCOLS: [&str; 3] = ["uniswap", "aave", "compound"];

/// Resolver configuration
#[derive(Clone, Debug)]
pub struct ResolverConfig {
    /// Chain identifier for wallet lookups
    pub chain: String,
    /// Ceiling for each independent entity fetch
    pub fetch_timeout: Duration,
    /// Options forwarded to the generation provider
    pub generation: GenerationOptions,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            chain: "eth-mainnet".to_string(),
            fetch_timeout: Duration::from_secs(10),
            generation: GenerationOptions::default(),
        }
    }
}

/// One-turn orchestrator over gateway, provider, extractor and scorer
pub struct ResponseResolver {
    gateway: Arc<dyn MarketDataGateway>,
    provider: Option<Arc<dyn GenerationProvider>>,
    extractor: EntityExtractor,
    scorer: RiskScorer,
    assembler: ContextAssembler,
    config: ResolverConfig,
}

impl ResponseResolver {
    pub fn new(
        gateway: Arc<dyn MarketDataGateway>,
        provider: Option<Arc<dyn GenerationProvider>>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            gateway,
            provider,
            extractor: EntityExtractor::new(),
            scorer: RiskScorer::default(),
            assembler: ContextAssembler::new(),
            config,
        }
    }

    /// Resolve one user query into an assistant message.
    ///
    /// Entity fetch failures degrade to a smaller context; generation
    /// failures degrade to the fallback rule table. This method never
    /// returns an error to the caller.
    pub async fn respond(&self, session: &mut SessionContext, query: &str) -> Message {
        session.conversation.push(Message::user(query));

        let entities = self.extractor.extract(query);
        debug!(?entities, "extracted entities");

        self.fetch_entities(session, &entities).await;

        let context = self.assembler.assemble(&session.cache);
        let system_prompt = format!(
            "{DEFI_ASSISTANT_PROMPT}\n\nHere is the latest DeFi data that you can reference:\n{context}"
        );

        let answer = match self.generate(session, system_prompt).await {
            Ok(completion) => completion.content,
            Err(err) => {
                warn!(error = %err, "generation unavailable, using fallback rules");
                fallback_answer(query, entities.pool.as_ref())
            }
        };

        let message = Message::assistant(answer);
        session.conversation.push(message.clone());
        session.touch();
        message
    }

    /// Score a pool from fresh token metrics.
    ///
    /// Only a malformed pool identifier is surfaced as an error; data-source
    /// failures degrade to the conservative baseline assessment.
    pub async fn assess_pool(&self, pool_name: &str) -> Result<RiskAssessment> {
        let pool: PoolIdentifier = pool_name.parse()?;
        let symbols = [pool.token0(), pool.token1()];

        match self
            .guard("token metrics", self.gateway.token_metrics(&symbols))
            .await
        {
            Some(metrics) => {
                let token0 = Self::metric_for(&metrics, pool.token0());
                let token1 = Self::metric_for(&metrics, pool.token1());
                Ok(self.scorer.score(&pool, &token0, &token1))
            }
            None => Ok(self.scorer.default_assessment(&pool.display_name())),
        }
    }

    /// Prefetch the baseline tokens and protocols into the session cache.
    /// Failures are logged and otherwise ignored.
    pub async fn warm_up(&self, session: &mut SessionContext) {
        let (tokens, protocols) = tokio::join!(
            self.guard("warm-up tokens", self.gateway.token_metrics(&WARM_UP_SYMBOLS)),
            self.guard(
                "warm-up protocols",
                self.gateway.protocol_metrics(&WARM_UP_PROTOCOLS)
            ),
        );

        if let Some(list) = tokens {
            for token in list {
                session
                    .cache
                    .put(token.symbol.to_lowercase(), CachePayload::Token(token));
            }
        }
        if let Some(list) = protocols {
            for protocol in list {
                session
                    .cache
                    .put(protocol.slug.clone(), CachePayload::Protocol(protocol));
            }
        }
    }

    /// Fetch the data every extracted entity calls for, concurrently.
    ///
    /// Each fetch is independently timed out; one failure never blocks the
    /// others, and only successful results touch the cache.
    async fn fetch_entities(&self, session: &mut SessionContext, entities: &ExtractedEntities) {
        let mut symbols: Vec<&str> = Vec::new();
        if let Some(pool) = &entities.pool {
            symbols.push(pool.token0());
            symbols.push(pool.token1());
        }
        if entities.topics.contains(&Topic::Ethereum) && !symbols.contains(&"eth") {
            symbols.push("eth");
        }

        let slugs: Vec<&str> = if entities.topics.contains(&Topic::Uniswap) {
            vec!["uniswap"]
        } else {
            Vec::new()
        };

        let address = entities.address.as_deref();
        let want_nfts = entities.topics.contains(&Topic::Nft);

        let tokens_task = async {
            if symbols.is_empty() {
                None
            } else {
                self.guard("token metrics", self.gateway.token_metrics(&symbols))
                    .await
            }
        };
        let protocols_task = async {
            if slugs.is_empty() {
                None
            } else {
                self.guard("protocol metrics", self.gateway.protocol_metrics(&slugs))
                    .await
            }
        };
        let balances_task = async {
            match address {
                Some(addr) => {
                    self.guard(
                        "wallet holdings",
                        self.gateway.wallet_holdings(&self.config.chain, addr),
                    )
                    .await
                }
                None => None,
            }
        };
        let nfts_task = async {
            match address {
                Some(addr) if want_nfts => {
                    self.guard(
                        "nft holdings",
                        self.gateway.nft_holdings(&self.config.chain, addr),
                    )
                    .await
                }
                _ => None,
            }
        };

        let (tokens, protocols, balances, nfts) =
            tokio::join!(tokens_task, protocols_task, balances_task, nfts_task);

        if let Some(list) = tokens {
            for token in list {
                session
                    .cache
                    .put(token.symbol.to_lowercase(), CachePayload::Token(token));
            }
        }
        if let Some(list) = protocols {
            for protocol in list {
                session
                    .cache
                    .put(protocol.slug.clone(), CachePayload::Protocol(protocol));
            }
        }
        if let Some(addr) = address {
            if balances.is_some() || nfts.is_some() {
                session.cache.merge_wallet(
                    addr,
                    WalletUpdate {
                        balances,
                        nfts,
                    },
                );
            }
        }
    }

    /// Ask the generation provider for a completion over the dialogue
    async fn generate(
        &self,
        session: &SessionContext,
        system_prompt: String,
    ) -> std::result::Result<Completion, navigator_core::CoreError> {
        let provider = self.provider.as_ref().ok_or_else(|| {
            navigator_core::CoreError::MissingCredential("no generation provider configured".into())
        })?;

        let options = GenerationOptions {
            system_prompt: Some(system_prompt),
            ..self.config.generation.clone()
        };
        let dialogue: Vec<Message> = session.conversation.dialogue().cloned().collect();
        provider.complete(&dialogue, &options).await
    }

    /// Run a fetch under the configured timeout, logging failures
    async fn guard<T>(
        &self,
        source: &str,
        fut: impl std::future::Future<Output = Result<T>>,
    ) -> Option<T> {
        match timeout(self.config.fetch_timeout, fut).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(err)) => {
                warn!(source, error = %err, "entity fetch failed");
                None
            }
            Err(_) => {
                warn!(source, timeout_secs = self.config.fetch_timeout.as_secs(), "entity fetch timed out");
                None
            }
        }
    }

    /// Pick the metric for a symbol, or an all-zero placeholder that lands
    /// in the riskiest scoring bands
    fn metric_for(metrics: &[TokenMetric], symbol: &str) -> TokenMetric {
        metrics
            .iter()
            .find(|m| m.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
            .unwrap_or_else(|| TokenMetric::new(symbol.to_uppercase(), symbol.to_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::gateway::MockGateway;
    use crate::model::{NftHoldings, ProtocolMetric, RiskLevel, WalletHoldings};

    fn resolver(gateway: Arc<dyn MarketDataGateway>) -> ResponseResolver {
        ResponseResolver::new(gateway, None, ResolverConfig::default())
    }

    /// Gateway whose wallet operations always fail
    struct FlakyWalletGateway {
        inner: MockGateway,
    }

    #[async_trait]
    impl MarketDataGateway for FlakyWalletGateway {
        async fn token_metrics(&self, symbols: &[&str]) -> Result<Vec<TokenMetric>> {
            self.inner.token_metrics(symbols).await
        }

        async fn protocol_metrics(&self, slugs: &[&str]) -> Result<Vec<ProtocolMetric>> {
            self.inner.protocol_metrics(slugs).await
        }

        async fn wallet_holdings(&self, _chain: &str, _address: &str) -> Result<WalletHoldings> {
            Err(AdvisorError::RemoteData("balance service down".into()))
        }

        async fn nft_holdings(&self, _chain: &str, _address: &str) -> Result<NftHoldings> {
            Err(AdvisorError::RemoteData("nft service down".into()))
        }

        fn name(&self) -> &str {
            "flaky-wallet"
        }
    }

    #[tokio::test]
    async fn test_fallback_without_provider() {
        let resolver = resolver(Arc::new(MockGateway::new()));
        let mut session = SessionContext::new();

        let reply = resolver.respond(&mut session, "Explain impermanent loss").await;
        assert!(reply
            .content
            .starts_with("Impermanent loss occurs when you provide liquidity"));
        // user turn plus assistant turn
        assert_eq!(session.message_count(), 2);
    }

    #[tokio::test]
    async fn test_pool_mention_populates_token_cache() {
        let resolver = resolver(Arc::new(MockGateway::new()));
        let mut session = SessionContext::new();

        resolver
            .respond(&mut session, "What are the risks of investing in ETH/USDC?")
            .await;

        assert!(session.cache.get("eth").is_some());
        assert!(session.cache.get("usdc").is_some());
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successful_sections() {
        let gateway = Arc::new(FlakyWalletGateway {
            inner: MockGateway::new(),
        });
        let resolver = resolver(gateway);
        let mut session = SessionContext::new();

        let address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        let query = format!("What ETH does {address} hold?");
        let reply = resolver.respond(&mut session, &query).await;

        // token fetch succeeded, wallet fetch did not
        assert!(session.cache.get("eth").is_some());
        assert!(session.cache.get(&address.to_lowercase()).is_none());
        // the failure is invisible to the user
        assert!(!reply.content.contains("error"));

        let context = ContextAssembler::new().assemble(&session.cache);
        assert!(context.contains("Ethereum"));
        assert!(!context.contains("WALLET DATA"));
    }

    #[tokio::test]
    async fn test_nft_topic_with_address_merges_wallet() {
        let resolver = resolver(Arc::new(MockGateway::new()));
        let mut session = SessionContext::new();

        let address = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        resolver
            .respond(&mut session, &format!("Show NFTs for {address}"))
            .await;

        let entry = session.cache.get(&address.to_lowercase());
        assert!(entry.is_some(), "wallet entry expected");
        let wallet = session.cache.wallets().next().unwrap();
        assert!(wallet.balances.is_some());
        assert!(wallet.nfts.is_some());
    }

    #[tokio::test]
    async fn test_assess_pool_with_live_metrics() {
        let resolver = resolver(Arc::new(MockGateway::new()));

        let assessment = resolver.assess_pool("ETH/USDC").await.unwrap();
        assert_eq!(assessment.overall_score, 4.6);
        assert_eq!(assessment.overall_level, RiskLevel::Medium);
        assert_eq!(assessment.categories.len(), 3);
    }

    #[tokio::test]
    async fn test_assess_pool_invalid_identifier() {
        let resolver = resolver(Arc::new(MockGateway::new()));

        let err = resolver.assess_pool("ETHUSDC").await.unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidPool(_)));
    }

    #[tokio::test]
    async fn test_assess_pool_degrades_to_baseline() {
        struct DownGateway;

        #[async_trait]
        impl MarketDataGateway for DownGateway {
            async fn token_metrics(&self, _symbols: &[&str]) -> Result<Vec<TokenMetric>> {
                Err(AdvisorError::RemoteData("price service down".into()))
            }

            async fn protocol_metrics(&self, _slugs: &[&str]) -> Result<Vec<ProtocolMetric>> {
                Err(AdvisorError::RemoteData("tvl service down".into()))
            }

            async fn wallet_holdings(&self, _chain: &str, _address: &str) -> Result<WalletHoldings> {
                Err(AdvisorError::RemoteData("balance service down".into()))
            }

            async fn nft_holdings(&self, _chain: &str, _address: &str) -> Result<NftHoldings> {
                Err(AdvisorError::RemoteData("nft service down".into()))
            }

            fn name(&self) -> &str {
                "down"
            }
        }

        let resolver = resolver(Arc::new(DownGateway));
        let assessment = resolver.assess_pool("ETH/USDC").await.unwrap();
        assert_eq!(assessment.overall_score, 6.5);
        assert_eq!(assessment.pool, "ETH/USDC");
    }

    #[tokio::test]
    async fn test_warm_up_seeds_cache() {
        let resolver = resolver(Arc::new(MockGateway::new()));
        let mut session = SessionContext::new();

        resolver.warm_up(&mut session).await;

        for key in ["eth", "btc", "usdc", "dai", "uniswap", "aave", "compound"] {
            assert!(session.cache.get(key).is_some(), "missing warm-up entry {key}");
        }
    }
}
