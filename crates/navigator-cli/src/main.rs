//! defi-navigator Terminal Client
//!
//! Interactive REPL over the response resolver. Each line is one query;
//! `assess <TOKEN0>/<TOKEN1>` prints a risk report, `quit`/`exit` ends the
//! session. `--offline` runs entirely on fixture data with no network calls.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use defi_advisor::{
    AdvisorError, HttpGateway, MarketDataGateway, MockGateway, ResolverConfig, ResponseResolver,
    SessionContext, GREETING,
};
use navigator_core::GenerationProvider;
use navigator_runtime::AnthropicProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let offline = std::env::args().any(|arg| arg == "--offline");

    let gateway: Arc<dyn MarketDataGateway> = if offline {
        tracing::info!("Running offline with fixture data");
        Arc::new(MockGateway::new())
    } else {
        Arc::new(HttpGateway::from_env())
    };

    let provider: Option<Arc<dyn GenerationProvider>> = if offline {
        None
    } else {
        let anthropic = AnthropicProvider::from_env();
        match anthropic.health_check().await {
            Ok(true) => tracing::info!("✓ Anthropic API configured"),
            Ok(false) | Err(_) => {
                tracing::warn!("⚠ Anthropic API not available - answers fall back to the rule table");
                tracing::warn!("  Set ANTHROPIC_API_KEY in .env to enable generation");
            }
        }
        Some(Arc::new(anthropic) as Arc<dyn GenerationProvider>)
    };

    let resolver = ResponseResolver::new(gateway, provider, ResolverConfig::default());

    let mut session = SessionContext::with_greeting(GREETING);
    resolver.warm_up(&mut session).await;
    tracing::info!(session = %session.id, cached = session.cache.len(), "session ready");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(format!("{GREETING}\n\n> ").as_bytes())
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
            continue;
        }
        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            break;
        }

        let output = if let Some(pool) = input.strip_prefix("assess ") {
            match resolver.assess_pool(pool.trim()).await {
                Ok(assessment) => assessment.to_report(),
                Err(AdvisorError::InvalidPool(reason)) => {
                    format!("Cannot assess that pool: {reason}. Use the form TOKEN0/TOKEN1, e.g. `assess ETH/USDC`.")
                }
                Err(err) => return Err(err.into()),
            }
        } else {
            resolver.respond(&mut session, input).await.content
        };

        stdout.write_all(format!("{output}\n\n> ").as_bytes()).await?;
        stdout.flush().await?;
    }

    tracing::info!(messages = session.message_count(), "session closed");
    Ok(())
}
