//! Rule-Based Fallback Answers
//!
//! Deterministic canned answers used whenever the generation service is
//! unreachable, unauthenticated, or returns a malformed payload. Rules form
//! an ordered table of (predicate, handler) pairs evaluated in precedence
//! order; the first match wins and exactly one paragraph is returned.
//!
//! Precedence:
//! 1. known pool x risk category special cases
//! 2. generic risk-category templates parameterized by pool name
//! 3. canonical DeFi topic explanations
//! 4. default acknowledgment

use crate::model::{PoolIdentifier, RiskCategory};

/// Normalized query handed to the rule table
pub struct FallbackQuery<'a> {
    lower: String,
    pool: Option<&'a PoolIdentifier>,
}

impl<'a> FallbackQuery<'a> {
    pub fn new(query: &str, pool: Option<&'a PoolIdentifier>) -> Self {
        Self {
            lower: query.to_lowercase(),
            pool,
        }
    }

    /// Display name of the referenced pool, for templated answers
    fn pool_name(&self) -> String {
        self.pool
            .map_or_else(|| "this pool".to_string(), PoolIdentifier::display_name)
    }
}

/// One rule of the fallback table; returns `Some` when it claims the query
type Rule = fn(&FallbackQuery<'_>) -> Option<String>;

/// Pools with dedicated canned answers
const KNOWN_POOLS: [&str; 4] = ["ETH/USDC", "BTC/ETH", "ORA/USDC", "ETH/ORA"];

fn known_pool(q: &FallbackQuery<'_>) -> Option<&'static str> {
    KNOWN_POOLS.into_iter().find(|name| {
        q.lower.contains(&name.to_lowercase())
            || q.pool.is_some_and(|p| p.display_name() == *name)
    })
}

fn category_keyword(q: &FallbackQuery<'_>) -> Option<RiskCategory> {
    if q.lower.contains("smart contract risk") {
        Some(RiskCategory::SmartContract)
    } else if q.lower.contains("economic risk") {
        Some(RiskCategory::Economic)
    } else if q.lower.contains("centralization risk") {
        Some(RiskCategory::Centralization)
    } else {
        None
    }
}

/// Hard-coded paragraphs for known pool/category pairs
fn pool_category_answer(pool: &str, category: RiskCategory) -> &'static str {
    match (pool, category) {
        ("ETH/USDC", RiskCategory::SmartContract) => {
            "The ETH/USDC pool runs on one of the most battle-tested contract stacks in DeFi. The contracts have been audited multiple times by reputable firms, and the pool is well-established with deep liquidity, so smart contract risk here is low. No audited contract is ever entirely free of residual risk, but this pool can reasonably serve as a core position."
        }
        ("ETH/USDC", RiskCategory::Economic) => {
            "Economically, ETH/USDC pairs a volatile asset with a fully collateralized stablecoin, so impermanent loss tracks ETH's price moves directly. Liquidity is deep and fee income is steady, which keeps economic risk moderate; just remember that a sharp ETH move still produces measurable divergence loss versus holding."
        }
        ("ETH/USDC", RiskCategory::Centralization) => {
            "Centralization risk for ETH/USDC is limited but not zero: USDC is issued by a centralized entity that can freeze balances, and protocol-level admin keys exist. Governance around this pool is comparatively mature, so this is usually considered a low-to-moderate concern."
        }
        ("BTC/ETH", RiskCategory::SmartContract) => {
            "BTC/ETH relies on wrapped-BTC custody plus the pool contracts themselves. The contracts are audited and widely used, keeping smart contract risk low, but the bridge and custodian layer behind wrapped BTC adds a dependency that the pool's own audit reports do not cover."
        }
        ("BTC/ETH", RiskCategory::Economic) => {
            "BTC/ETH pairs two volatile majors, so be cautious of impermanent loss due to price divergence between the two assets. Monitor market conditions regularly and consider hedging your position if the BTC/ETH ratio starts trending."
        }
        ("BTC/ETH", RiskCategory::Centralization) => {
            "Both sides of BTC/ETH are deeply decentralized assets, but the wrapped-BTC issuer is a centralized custodian. That custody point is the main centralization concern for this pool; the rest of the stack carries little privileged control."
        }
        ("ORA/USDC", RiskCategory::SmartContract) => {
            "ORA/USDC involves a newer token contract with a shorter audit history. Treat smart contract risk as elevated: review the audits that do exist, check whether the contracts are open-source, and size your position accordingly."
        }
        ("ORA/USDC", RiskCategory::Economic) => {
            "ORA/USDC carries high economic risk due to potential ORA price volatility against the stablecoin side. Only allocate a small portion of your portfolio to this pool and consider stop-loss discipline to protect your investment."
        }
        ("ORA/USDC", RiskCategory::Centralization) => {
            "A large share of ORA supply and its admin keys sit with the founding team, so centralization risk for ORA/USDC is high. Watch governance proposals and any timelock changes closely before and after entering."
        }
        ("ETH/ORA", RiskCategory::SmartContract) => {
            "ETH/ORA inherits ETH's mature contract stack on one side and a younger token contract on the other, leaving overall smart contract risk moderate. The pool contracts are audited, but the ORA token itself has had less independent review."
        }
        ("ETH/ORA", RiskCategory::Economic) => {
            "Monitor the price relationship between ETH and ORA: both legs are volatile, so be prepared for potential impermanent loss. A dollar-cost averaging strategy can smooth your entry into this pool."
        }
        ("ETH/ORA", RiskCategory::Centralization) => {
            "Centralization risk in ETH/ORA comes almost entirely from the ORA side, where team-controlled keys and concentrated holdings dominate. ETH itself contributes little centralization risk to the pair."
        }
        _ => unreachable!("pool/category pair outside the known table"),
    }
}

fn category_template(category: RiskCategory, pool: &str) -> String {
    match category {
        RiskCategory::SmartContract => format!(
            "Smart contract risk for {pool} comes from vulnerabilities in the pool's code and its dependencies. Check whether the contracts are audited, open-source, and time-tested, and prefer pools whose contracts have processed significant value without incident."
        ),
        RiskCategory::Economic => format!(
            "Economic risk for {pool} is about the protocol's incentive design and the price relationship between the two assets: diverging prices create impermanent loss, and unsustainable reward emissions can collapse yields. Review the token distribution and how the pool has behaved in volatile markets."
        ),
        RiskCategory::Centralization => format!(
            "Centralization risk for {pool} arises from privileged control: admin keys that can change critical parameters, upgradable contracts without timelocks, and concentrated token holdings. Check who controls the keys and whether governance can act unilaterally."
        ),
    }
}

fn topic_answer(lower: &str) -> Option<&'static str> {
    if lower.contains("what is defi") {
        Some("DeFi (Decentralized Finance) refers to financial applications built on blockchain technology that don't rely on central financial intermediaries. Instead, they use smart contracts on blockchains like Ethereum to create protocols that replicate existing financial services in a more open, interoperable way.")
    } else if lower.contains("yield farm") || lower.contains("farming") {
        Some("Yield farming is a practice where users provide liquidity to DeFi protocols and earn rewards in return. These rewards typically come from transaction fees and token incentives. While yield farming can offer high returns, it also comes with risks like impermanent loss, smart contract vulnerabilities, and market volatility.")
    } else if lower.contains("impermanent loss") {
        Some("Impermanent loss occurs when you provide liquidity to a pool and the price of your deposited assets changes compared to when you deposited them. The greater the change, the more significant the loss. It's called 'impermanent' because the loss is only realized when you withdraw your liquidity. If you keep your assets in the pool, there's a chance the prices could return to their original state, eliminating the loss.")
    } else if lower.contains("liquidity pool") || lower.contains("amm") {
        Some("Liquidity pools are collections of funds locked in smart contracts that facilitate decentralized trading, lending, and other financial activities. Automated Market Makers (AMMs) use these pools to allow digital assets to be traded automatically and permissionlessly using algorithms rather than an order book. Popular AMMs include Uniswap, Curve, and Balancer.")
    } else if lower.contains("risk") || lower.contains("safe") {
        Some("DeFi protocols carry several types of risks:\n\n1. Smart Contract Risk: Vulnerabilities in the code\n2. Economic Risk: Flaws in the protocol's economic design\n3. Oracle Risk: Manipulation of price feeds\n4. Governance Risk: Malicious proposals or centralized control\n5. Regulatory Risk: Potential legal challenges\n\nTo minimize these risks, consider diversifying across protocols, starting with small amounts, using established protocols with security audits, and staying informed about protocol changes.")
    } else if lower.contains("apy") || lower.contains("apr") {
        Some("APY (Annual Percentage Yield) and APR (Annual Percentage Rate) are metrics used to measure returns in DeFi:\n\n- APR is the simple interest rate over a year without compounding\n- APY includes the effect of compounding\n\nFor example, an investment with 10% APR compounded daily would have an APY of about 10.52%. In DeFi, high APYs can be attractive but often come with higher risks or may be temporary during initial launch periods.")
    } else if lower.contains("gas") || lower.contains("fees") {
        Some("Gas fees are payments made by users to compensate for the computing energy required to process and validate transactions on the blockchain. In periods of high network congestion, gas fees can increase significantly. Some ways to manage gas costs include:\n\n1. Using Layer 2 solutions like Optimism or Arbitrum\n2. Transacting during off-peak hours\n3. Batching multiple transactions together\n4. Setting appropriate gas limits for your transactions")
    } else if lower.contains("stablecoin") {
        Some("Stablecoins are cryptocurrencies designed to maintain a stable value, usually pegged to a fiat currency like USD. They come in several types:\n\n1. Fiat-collateralized (USDC, USDT): Backed by actual dollars in reserve\n2. Crypto-collateralized (DAI): Backed by excess crypto collateral\n3. Algorithmic (FRAX): Use algorithms to maintain their peg\n\nStablecoins are crucial in DeFi as they provide a way to preserve value without exiting to traditional finance.")
    } else if lower.contains("ora") || lower.contains("agent") {
        Some("ORA (Onchain Perpetual Agent Framework) enables AI agents to operate autonomously on blockchain networks. These agents can:\n\n1. Monitor DeFi protocols for opportunities or risks\n2. Execute transactions based on predefined conditions\n3. Provide personalized insights about complex protocols\n4. Optimize strategies across multiple platforms\n\nBy using ORA agents, DeFi users can automate complex strategies, receive timely notifications, and make more informed decisions without needing to constantly monitor the market.")
    } else {
        None
    }
}

const DEFAULT_ANSWER: &str = "That's an interesting question about DeFi. While I don't have a pre-written answer for this specific query, I can help explain various DeFi concepts, protocols, and strategies. Feel free to ask about specific topics like liquidity pools, yield farming, stablecoins, or risk management in DeFi.";

/// The ordered rule table; the first rule returning `Some` wins
const RULES: [Rule; 4] = [
    // 1. exact pool + category special cases
    |q| {
        let pool = known_pool(q)?;
        let category = category_keyword(q)?;
        Some(pool_category_answer(pool, category).to_string())
    },
    // 2. generic category templates
    |q| {
        if let Some(category) = category_keyword(q) {
            Some(category_template(category, &q.pool_name()))
        } else if q.lower.contains("detailed explanation") {
            let pool = q.pool_name();
            Some(format!(
                "Here is a detailed breakdown for {pool}: smart contract risk covers code vulnerabilities and audit coverage; economic risk covers incentive design and impermanent loss from price divergence; centralization risk covers admin keys and concentrated control. Weigh all three before committing capital, and size the position to survive the worst single category."
            ))
        } else {
            None
        }
    },
    // 3. canonical DeFi topic explanations
    |q| topic_answer(&q.lower).map(str::to_string),
    // 4. default acknowledgment
    |_| Some(DEFAULT_ANSWER.to_string()),
];

/// Resolve a query against the rule table. Total: the trailing default rule
/// guarantees exactly one paragraph.
pub fn fallback_answer(query: &str, pool: Option<&PoolIdentifier>) -> String {
    let q = FallbackQuery::new(query, pool);
    RULES
        .iter()
        .find_map(|rule| rule(&q))
        .unwrap_or_else(|| DEFAULT_ANSWER.to_string())
}
