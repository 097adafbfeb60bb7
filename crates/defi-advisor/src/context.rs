//! Context Assembler
//!
//! Renders cached entity data into the deterministic text block carried as
//! grounding context in the generation request. Section order and line
//! format are fixed; line order follows cache insertion order.

use crate::cache::DataCache;

/// Group the integer part of a non-negative amount with thousands separators
fn format_thousands(amount: f64) -> String {
    let whole = amount.round().abs() as u128;
    let digits = whole.to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Deterministic renderer over the session cache
#[derive(Clone, Debug, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Build the full context block. An empty cache yields the fixed headers
    /// with empty sections; fetch failures never inject placeholder text.
    pub fn assemble(&self, cache: &DataCache) -> String {
        let mut context = String::from("CURRENT DEFI DATA:\n\n");

        context.push_str("TOKEN PRICES:\n");
        for token in cache.tokens() {
            context.push_str(&format!(
                "{} ({}): ${} | 24h Change: {}% | Market Cap: ${}\n",
                token.name, token.symbol, token.price, token.change_24h, token.market_cap_usd
            ));
        }

        context.push_str("\nPROTOCOL TVL:\n");
        for protocol in cache.protocols() {
            context.push_str(&format!(
                "{}: ${} | Change (7d): {}%\n",
                protocol.name,
                format_thousands(protocol.tvl),
                protocol.change_7d
            ));
        }

        let wallets: Vec<_> = cache.wallets().collect();
        if !wallets.is_empty() {
            context.push_str("\nWALLET DATA:\n");
            for wallet in wallets {
                context.push_str(&format!("Address: {}\n", wallet.address));

                if let Some(holdings) = &wallet.balances {
                    context.push_str("Token Balances:\n");

                    // five largest positions by USD value
                    let mut balances: Vec<_> = holdings.balances.iter().collect();
                    balances.sort_by(|a, b| {
                        b.usd_value
                            .partial_cmp(&a.usd_value)
                            .unwrap_or(std::cmp::Ordering::Equal)
                    });
                    for balance in balances.into_iter().take(5) {
                        context.push_str(&format!(
                            "- {} ({}): {:.2} (${:.2})\n",
                            balance.name,
                            balance.symbol,
                            balance.units(),
                            balance.usd_value
                        ));
                    }
                }

                if let Some(nfts) = &wallet.nfts {
                    context.push_str(&format!("NFTs: {} collections\n", nfts.collections.len()));
                }
            }
        }

        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CachePayload, WalletUpdate};
    use crate::model::{NftHoldings, ProtocolMetric, TokenBalance, TokenMetric, WalletHoldings};

    fn eth() -> TokenMetric {
        TokenMetric {
            symbol: "ETH".into(),
            name: "Ethereum".into(),
            price: 3245.67,
            market_cap_usd: 389500000000.0,
            volume_24h_usd: 15700000000.0,
            change_24h: 2.5,
        }
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(format_thousands(4_100_000_000.0), "4,100,000,000");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1_000.0), "1,000");
        assert_eq!(format_thousands(0.0), "0");
    }

    #[test]
    fn test_empty_cache_yields_fixed_headers() {
        let assembler = ContextAssembler::new();
        let context = assembler.assemble(&DataCache::new());

        assert_eq!(context, "CURRENT DEFI DATA:\n\nTOKEN PRICES:\n\nPROTOCOL TVL:\n");
    }

    #[test]
    fn test_token_and_protocol_lines() {
        let mut cache = DataCache::new();
        cache.put("eth", CachePayload::Token(eth()));
        cache.put(
            "uniswap",
            CachePayload::Protocol(ProtocolMetric {
                slug: "uniswap".into(),
                name: "Uniswap".into(),
                tvl: 4_100_000_000.0,
                change_7d: 1.2,
            }),
        );

        let context = ContextAssembler::new().assemble(&cache);
        assert!(context.contains(
            "Ethereum (ETH): $3245.67 | 24h Change: 2.5% | Market Cap: $389500000000"
        ));
        assert!(context.contains("Uniswap: $4,100,000,000 | Change (7d): 1.2%"));
        assert!(!context.contains("WALLET DATA"));
    }

    #[test]
    fn test_identical_cache_renders_identically() {
        let mut cache = DataCache::new();
        cache.put("eth", CachePayload::Token(eth()));

        let assembler = ContextAssembler::new();
        assert_eq!(assembler.assemble(&cache), assembler.assemble(&cache));
    }

    #[test]
    fn test_wallet_section_top_five_by_usd_value() {
        let addr = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        let balances: Vec<TokenBalance> = (0..7)
            .map(|i| TokenBalance {
                name: format!("Token{i}"),
                symbol: format!("T{i}"),
                raw_balance: "1000000000000000000".into(),
                decimals: 18,
                usd_value: f64::from(i) * 100.0,
            })
            .collect();

        let mut cache = DataCache::new();
        cache.merge_wallet(
            addr,
            WalletUpdate {
                balances: Some(WalletHoldings {
                    address: addr.into(),
                    balances,
                }),
                nfts: Some(NftHoldings {
                    address: addr.into(),
                    collections: vec!["A".into(), "B".into()],
                }),
            },
        );

        let context = ContextAssembler::new().assemble(&cache);
        assert!(context.contains(&format!("Address: {addr}")));
        assert!(context.contains("Token6"));
        assert!(context.contains("Token2"));
        assert!(!context.contains("Token1 "));
        assert!(!context.contains("(T0)"));
        assert!(context.contains("NFTs: 2 collections"));
    }
}
