//! Domain Models
//!
//! Core data types for market metrics and risk assessments.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdvisorError;

/// Immutable snapshot of token-level market metrics
///
/// Absent fields default to 0, which the scorer treats as maximal risk in
/// that factor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenMetric {
    /// Ticker symbol (e.g., "ETH")
    pub symbol: String,

    /// Full name (e.g., "Ethereum")
    pub name: String,

    /// Current price in USD
    #[serde(default)]
    pub price: f64,

    /// Market capitalization in USD
    #[serde(default)]
    pub market_cap_usd: f64,

    /// 24-hour trading volume in USD
    #[serde(default)]
    pub volume_24h_usd: f64,

    /// 24-hour price change percentage
    #[serde(default)]
    pub change_24h: f64,
}

impl TokenMetric {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
            price: 0.0,
            market_cap_usd: 0.0,
            volume_24h_usd: 0.0,
            change_24h: 0.0,
        }
    }
}

/// An ordered trading pair parsed from a display string like `"ETH/USDC"`
///
/// Symbols are stored lowercase so equality is case-insensitive. Invariant:
/// exactly two non-empty symbols.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolIdentifier {
    token0: String,
    token1: String,
}

impl PoolIdentifier {
    /// Build from two symbols, normalizing case. Returns `InvalidPool` if
    /// either symbol is empty.
    pub fn new(token0: &str, token1: &str) -> Result<Self, AdvisorError> {
        let token0 = token0.trim().to_lowercase();
        let token1 = token1.trim().to_lowercase();

        if token0.is_empty() || token1.is_empty() {
            return Err(AdvisorError::InvalidPool(format!("{token0}/{token1}")));
        }

        Ok(Self { token0, token1 })
    }

    pub fn token0(&self) -> &str {
        &self.token0
    }

    pub fn token1(&self) -> &str {
        &self.token1
    }

    /// Canonical display form, e.g. `"ETH/USDC"`
    pub fn display_name(&self) -> String {
        format!(
            "{}/{}",
            self.token0.to_uppercase(),
            self.token1.to_uppercase()
        )
    }
}

impl FromStr for PoolIdentifier {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 {
            return Err(AdvisorError::InvalidPool(s.to_string()));
        }
        Self::new(parts[0], parts[1])
    }
}

impl std::fmt::Display for PoolIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Protocol-level TVL metrics
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolMetric {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub tvl: f64,
    #[serde(default)]
    pub change_7d: f64,
}

/// A single token balance held by a wallet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub name: String,
    pub symbol: String,
    /// Raw on-chain balance as a decimal string
    pub raw_balance: String,
    pub decimals: u32,
    pub usd_value: f64,
}

impl TokenBalance {
    /// Balance in whole token units (`raw_balance / 10^decimals`)
    pub fn units(&self) -> f64 {
        let raw: f64 = self.raw_balance.parse().unwrap_or(0.0);
        raw / 10f64.powi(self.decimals as i32)
    }
}

/// Token balances held by a wallet address
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletHoldings {
    pub address: String,
    pub balances: Vec<TokenBalance>,
}

/// NFT collections owned by a wallet address
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NftHoldings {
    pub address: String,
    pub collections: Vec<String>,
}

/// Risk category of an assessment, in fixed report order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    SmartContract,
    Economic,
    Centralization,
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskCategory::SmartContract => write!(f, "Smart Contract Risk"),
            RiskCategory::Economic => write!(f, "Economic Risk"),
            RiskCategory::Centralization => write!(f, "Centralization Risk"),
        }
    }
}

/// Qualitative risk level, a pure function of the numeric score
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

impl RiskLevel {
    /// Uppercase label for report rendering, e.g. `"MEDIUM RISK"`
    pub fn label(self) -> String {
        format!("{} RISK", self.to_string().to_uppercase())
    }
}

/// Score and rationale for one risk category
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskCategoryScore {
    pub category: RiskCategory,
    /// Score in [0, 10]; higher is riskier
    pub score: f64,
    pub level: RiskLevel,
    pub rationale: String,
}

/// A complete risk assessment for a pool
///
/// Immutable once built; lives only for the request/response cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Pool display name, e.g. `"ETH/USDC"`
    pub pool: String,

    /// Weighted overall score, rounded to one decimal
    pub overall_score: f64,

    pub overall_level: RiskLevel,

    /// Fixed order: SmartContract, Economic, Centralization
    pub categories: Vec<RiskCategoryScore>,

    pub recommendations: Vec<String>,
}

impl RiskAssessment {
    /// Render the assessment as a human-readable report
    pub fn to_report(&self) -> String {
        let mut out = format!("Risk Assessment for {}\n", self.pool);
        out.push_str(&format!(
            "Overall Risk Level: {}/10 - {}\n\n",
            self.overall_score,
            self.overall_level.label()
        ));

        for category in &self.categories {
            out.push_str(&format!(
                "{}: {}/10 ({})\n  {}\n",
                category.category, category.score, category.level, category.rationale
            ));
        }

        out.push_str("\nRecommendations:\n");
        for rec in &self.recommendations {
            out.push_str(&format!("  - {rec}\n"));
        }

        out
    }
}
