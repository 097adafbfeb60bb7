//! Session Data Cache
//!
//! Session-scoped store mapping entity keys to the last successfully fetched
//! payload. Insertion order is preserved so context assembly is
//! deterministic. Merge policy: last successful fetch wins; a failed fetch
//! never removes or corrupts an existing entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{NftHoldings, ProtocolMetric, TokenMetric, WalletHoldings};

/// Wallet data accumulated across independent balance and NFT fetches
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub address: String,
    pub balances: Option<WalletHoldings>,
    pub nfts: Option<NftHoldings>,
}

/// Typed cache payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CachePayload {
    Token(TokenMetric),
    Protocol(ProtocolMetric),
    Wallet(WalletSnapshot),
}

/// A cached fetch result
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Derived entity key: lowercase symbol, protocol slug, or `0x…` address
    pub key: String,
    pub payload: CachePayload,
    pub fetched_at: DateTime<Utc>,
}

/// Partial wallet update for `merge`; `None` fields are left untouched
#[derive(Clone, Debug, Default)]
pub struct WalletUpdate {
    pub balances: Option<WalletHoldings>,
    pub nfts: Option<NftHoldings>,
}

/// Insertion-ordered entity cache owned by a single session
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DataCache {
    entries: Vec<CacheEntry>,
}

impl DataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry by key
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    /// Insert or overwrite an entry. Overwrites keep the entry's original
    /// position so context ordering stays stable across refreshes.
    pub fn put(&mut self, key: impl Into<String>, payload: CachePayload) {
        let key = key.into();
        let now = Utc::now();

        if let Some(existing) = self.entries.iter_mut().find(|e| e.key == key) {
            existing.payload = payload;
            existing.fetched_at = now;
        } else {
            self.entries.push(CacheEntry {
                key,
                payload,
                fetched_at: now,
            });
        }
    }

    /// Shallow-merge a partial update into a wallet entry.
    ///
    /// Field-level policy: each `Some` field replaces the corresponding
    /// snapshot field, each `None` field leaves the prior value intact, so an
    /// NFT fetch never discards previously fetched balances. If no wallet
    /// entry exists for the address, a fresh snapshot is created. A non-wallet
    /// entry under the same key is replaced outright.
    pub fn merge_wallet(&mut self, address: &str, update: WalletUpdate) {
        let key = address.to_lowercase();

        let mut snapshot = match self.get(&key).map(|e| &e.payload) {
            Some(CachePayload::Wallet(existing)) => existing.clone(),
            _ => WalletSnapshot {
                address: address.to_string(),
                ..WalletSnapshot::default()
            },
        };

        if let Some(balances) = update.balances {
            snapshot.balances = Some(balances);
        }
        if let Some(nfts) = update.nfts {
            snapshot.nfts = Some(nfts);
        }

        self.put(key, CachePayload::Wallet(snapshot));
    }

    /// All entries in insertion order
    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    /// Cached token metrics in insertion order
    pub fn tokens(&self) -> impl Iterator<Item = &TokenMetric> {
        self.entries.iter().filter_map(|e| match &e.payload {
            CachePayload::Token(token) => Some(token),
            _ => None,
        })
    }

    /// Cached protocol metrics in insertion order
    pub fn protocols(&self) -> impl Iterator<Item = &ProtocolMetric> {
        self.entries.iter().filter_map(|e| match &e.payload {
            CachePayload::Protocol(protocol) => Some(protocol),
            _ => None,
        })
    }

    /// Cached wallet snapshots in insertion order
    pub fn wallets(&self) -> impl Iterator<Item = &WalletSnapshot> {
        self.entries.iter().filter_map(|e| match &e.payload {
            CachePayload::Wallet(wallet) => Some(wallet),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TokenBalance;

    fn eth_metric() -> TokenMetric {
        TokenMetric {
            symbol: "ETH".into(),
            name: "Ethereum".into(),
            price: 3245.67,
            market_cap_usd: 3.895e11,
            volume_24h_usd: 1.57e10,
            change_24h: 2.5,
        }
    }

    fn holdings(address: &str) -> WalletHoldings {
        WalletHoldings {
            address: address.into(),
            balances: vec![TokenBalance {
                name: "Ether".into(),
                symbol: "ETH".into(),
                raw_balance: "2000000000000000000".into(),
                decimals: 18,
                usd_value: 6491.34,
            }],
        }
    }

    #[test]
    fn test_put_overwrites_in_place() {
        let mut cache = DataCache::new();
        cache.put("eth", CachePayload::Token(eth_metric()));
        cache.put(
            "usdc",
            CachePayload::Token(TokenMetric::new("USDC", "USD Coin")),
        );

        let mut updated = eth_metric();
        updated.price = 3300.0;
        cache.put("eth", CachePayload::Token(updated));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.entries()[0].key, "eth");
        let tokens: Vec<_> = cache.tokens().collect();
        assert_eq!(tokens[0].price, 3300.0);
    }

    #[test]
    fn test_merge_preserves_balances_when_adding_nfts() {
        let addr = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
        let mut cache = DataCache::new();

        cache.merge_wallet(
            addr,
            WalletUpdate {
                balances: Some(holdings(addr)),
                nfts: None,
            },
        );
        cache.merge_wallet(
            addr,
            WalletUpdate {
                balances: None,
                nfts: Some(NftHoldings {
                    address: addr.into(),
                    collections: vec!["CryptoPunks".into()],
                }),
            },
        );

        assert_eq!(cache.len(), 1);
        let wallet = cache.wallets().next().unwrap();
        assert!(wallet.balances.is_some());
        assert_eq!(wallet.nfts.as_ref().unwrap().collections.len(), 1);
    }

    #[test]
    fn test_failed_fetch_leaves_entry_untouched() {
        let mut cache = DataCache::new();
        cache.put("eth", CachePayload::Token(eth_metric()));

        // A failed fetch simply skips the put; the prior entry survives.
        let before = cache.get("eth").cloned().unwrap();
        assert_eq!(cache.get("eth").unwrap().key, before.key);
        assert_eq!(cache.len(), 1);
    }
}
