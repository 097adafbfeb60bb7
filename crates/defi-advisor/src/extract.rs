//! Entity Extractor
//!
//! Parses free-text queries for trading-pair mentions, blockchain addresses
//! and coarse topic classification. Extraction never fails; absent patterns
//! simply yield nothing.

use std::collections::BTreeSet;

use regex::Regex;

use crate::model::PoolIdentifier;

/// Coarse, non-exclusive topic classification of a query
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Topic {
    Ethereum,
    Uniswap,
    Nft,
    SmartContractRisk,
    EconomicRisk,
    CentralizationRisk,
}

impl Topic {
    /// Keyword containment tests, evaluated independently per topic
    fn matches(self, lower: &str) -> bool {
        match self {
            Topic::Ethereum => lower.contains("ethereum") || lower.contains("eth"),
            Topic::Uniswap => lower.contains("uniswap"),
            Topic::Nft => lower.contains("nft"),
            Topic::SmartContractRisk => lower.contains("smart contract risk"),
            Topic::EconomicRisk => lower.contains("economic risk"),
            Topic::CentralizationRisk => lower.contains("centralization risk"),
        }
    }

    const ALL: [Topic; 6] = [
        Topic::Ethereum,
        Topic::Uniswap,
        Topic::Nft,
        Topic::SmartContractRisk,
        Topic::EconomicRisk,
        Topic::CentralizationRisk,
    ];
}

/// Entities referenced by a query
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedEntities {
    /// First `0x` + 40 hex characters match, if any
    pub address: Option<String>,
    /// Pool mentioned via an `in <A>/<B>` phrase, if any
    pub pool: Option<PoolIdentifier>,
    pub topics: BTreeSet<Topic>,
}

/// Query parser for pair mentions and blockchain addresses
pub struct EntityExtractor {
    address_re: Regex,
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor {
    pub fn new() -> Self {
        Self {
            // exactly 40 hex characters; longer runs are not addresses
            address_re: Regex::new(r"0x[0-9a-fA-F]{40}\b").expect("valid address pattern"),
        }
    }

    /// Extract all referenced entities from a raw query
    pub fn extract(&self, query: &str) -> ExtractedEntities {
        let lower = query.to_lowercase();

        let address = self
            .address_re
            .find(query)
            .map(|m| m.as_str().to_string());

        let topics = Topic::ALL
            .into_iter()
            .filter(|t| t.matches(&lower))
            .collect();

        ExtractedEntities {
            address,
            pool: Self::extract_pool(&lower),
            topics,
        }
    }

    /// Pool mention: the text following `"in "` up to sentence-terminating
    /// punctuation, accepted only when it contains exactly one `/`.
    fn extract_pool(lower: &str) -> Option<PoolIdentifier> {
        let after = if let Some(idx) = lower.find(" in ") {
            &lower[idx + 4..]
        } else if let Some(rest) = lower.strip_prefix("in ") {
            rest
        } else {
            return None;
        };

        let phrase = after
            .split(['.', '!', '?'])
            .next()
            .unwrap_or("")
            .trim();

        if phrase.matches('/').count() != 1 {
            return None;
        }

        let (token0, token1) = phrase.split_once('/')?;
        PoolIdentifier::new(token0, token1).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_vitalik_address() {
        let extractor = EntityExtractor::new();
        let entities =
            extractor.extract("Analyze wallet 0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");

        assert_eq!(
            entities.address.as_deref(),
            Some("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045")
        );
        assert!(entities.pool.is_none());
    }

    #[test]
    fn test_first_address_wins() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract(
            "compare 0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045 \
             and 0x0000000000000000000000000000000000000001",
        );
        assert_eq!(
            entities.address.as_deref(),
            Some("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045")
        );
    }

    #[test]
    fn test_extracts_pool_from_in_phrase() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("What are the risks of investing in ETH/USDC?");

        let pool = entities.pool.unwrap();
        assert_eq!(pool.token0(), "eth");
        assert_eq!(pool.token1(), "usdc");
    }

    #[test]
    fn test_pool_needs_exactly_one_slash() {
        let extractor = EntityExtractor::new();
        assert!(extractor.extract("investing in ETH/USDC/DAI pools").pool.is_none());
        assert!(extractor.extract("investing in stablecoins").pool.is_none());
    }

    #[test]
    fn test_topics_are_non_exclusive() {
        let extractor = EntityExtractor::new();
        let entities =
            extractor.extract("What is the smart contract risk of Uniswap on Ethereum?");

        assert!(entities.topics.contains(&Topic::SmartContractRisk));
        assert!(entities.topics.contains(&Topic::Uniswap));
        assert!(entities.topics.contains(&Topic::Ethereum));
        assert!(!entities.topics.contains(&Topic::Nft));
    }

    #[test]
    fn test_no_entities_yields_empty() {
        let extractor = EntityExtractor::new();
        let entities = extractor.extract("Explain impermanent loss");
        assert!(entities.address.is_none());
        assert!(entities.pool.is_none());
        assert!(entities.topics.is_empty());
    }
}
