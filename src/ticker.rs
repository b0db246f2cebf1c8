//! Ticker Resolver
//!
//! Maps a free-text company name to a market ticker symbol: a static alias
//! table is consulted first, then one symbol-lookup call to the financial
//! agent. Lookup failures never surface to callers (the shareholders
//! section must degrade to its "not publicly listed" message, not crash),
//! but the resolution type keeps "confirmed private" and "lookup failed"
//! distinct so outages stay visible in logs.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::finance::FinanceAgent;

lazy_static! {
    /// Lower-cased company-name aliases, checked before any network call.
    static ref NAME_TO_TICKER: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("google", "GOOG");
        m.insert("alphabet", "GOOG");
        m.insert("microsoft", "MSFT");
        m.insert("tesla", "TSLA");
        m.insert("apple", "AAPL");
        m.insert("facebook", "META");
        m
    };
}

/// Sentinel replies meaning "no public listing" (compared case-insensitively).
const NOT_LISTED_SENTINELS: &[&str] = &["PRIVATE", "N/A"];

/// Outcome of a resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickerResolution {
    /// Publicly listed under this primary symbol.
    Listed(String),
    /// The lookup agent confirmed the company is not publicly traded.
    Private,
    /// The lookup itself failed (network, quota, malformed reply).
    Unavailable,
}

/// Company-name → ticker resolver
pub struct TickerResolver {
    finance: Arc<dyn FinanceAgent>,
}

impl TickerResolver {
    pub fn new(finance: Arc<dyn FinanceAgent>) -> Self {
        Self { finance }
    }

    /// Resolve a company name to its primary ticker.
    ///
    /// Alias hits return immediately with no network call. On a miss, one
    /// symbol-lookup request is issued; empty or sentinel replies mean the
    /// company is private, and transport failures are swallowed into
    /// `Unavailable` (warn-logged) rather than raised.
    pub async fn resolve(&self, company: &str) -> TickerResolution {
        if let Some(symbol) = NAME_TO_TICKER.get(company.to_lowercase().as_str()) {
            info!("Ticker alias hit: {} -> {}", company, symbol);
            return TickerResolution::Listed((*symbol).to_string());
        }

        match self.finance.symbol_lookup(company).await {
            Ok(reply) => {
                let symbol = reply.trim().to_uppercase();
                if symbol.is_empty() || NOT_LISTED_SENTINELS.contains(&symbol.as_str()) {
                    info!("{} reported as not publicly traded", company);
                    TickerResolution::Private
                } else {
                    TickerResolution::Listed(symbol)
                }
            }
            Err(e) => {
                warn!("Symbol lookup failed for {}: {}", company, e);
                TickerResolution::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProfileError;
    use crate::models::HoldingsSnapshot;
    use crate::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeFinance {
        reply: Result<String>,
        lookups: AtomicUsize,
    }

    impl FakeFinance {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                lookups: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(ProfileError::SymbolLookupError("quota exceeded".into())),
                lookups: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FinanceAgent for FakeFinance {
        async fn symbol_lookup(&self, _company: &str) -> Result<String> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(_) => Err(ProfileError::SymbolLookupError("quota exceeded".into())),
            }
        }

        async fn holdings_summary(&self, _ticker: &str) -> Result<Vec<HoldingsSnapshot>> {
            unreachable!("resolver never fetches holdings")
        }
    }

    #[tokio::test]
    async fn test_alias_hit_is_case_insensitive_and_offline() {
        let finance = Arc::new(FakeFinance::replying("unused"));
        let resolver = TickerResolver::new(finance.clone());

        for name in ["Google", "google", "GOOGLE"] {
            let resolution = resolver.resolve(name).await;
            assert_eq!(resolution, TickerResolution::Listed("GOOG".to_string()));
        }
        assert_eq!(finance.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_reply_is_trimmed_and_uppercased() {
        let finance = Arc::new(FakeFinance::replying("  nvda \n"));
        let resolver = TickerResolver::new(finance);

        let resolution = resolver.resolve("Nvidia").await;
        assert_eq!(resolution, TickerResolution::Listed("NVDA".to_string()));
    }

    #[tokio::test]
    async fn test_sentinel_replies_mean_private() {
        for sentinel in ["PRIVATE", "private", "n/a", ""] {
            let finance = Arc::new(FakeFinance::replying(sentinel));
            let resolver = TickerResolver::new(finance);
            assert_eq!(resolver.resolve("Acme Corp").await, TickerResolution::Private);
        }
    }

    #[tokio::test]
    async fn test_lookup_failure_is_swallowed() {
        let finance = Arc::new(FakeFinance::failing());
        let resolver = TickerResolver::new(finance);
        assert_eq!(
            resolver.resolve("Acme Corp").await,
            TickerResolution::Unavailable
        );
    }
}
