use super::{format, resolve, table, DEFAULT_CURRENCY};
use crate::domain::ports::GeoLocator;
use crate::utils::error::{Result, StorefrontError};
use crate::utils::retry::{with_retry, RetryPolicy};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shown in place of prices while detection is pending.
pub const PLACEHOLDER: &str = "…";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencyStatus {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencySnapshot {
    pub code: &'static str,
    pub status: CurrencyStatus,
}

#[derive(Debug)]
struct CurrencyState {
    code: &'static str,
    status: CurrencyStatus,
    generation: u64,
}

/// Shared currency state: created at start-up, reset on logout.
///
/// Every write bumps a generation counter. A detection result is applied only
/// when no other write happened while it was in flight, so a manual choice is
/// never overwritten by a slow lookup.
#[derive(Debug, Clone)]
pub struct CurrencyContext {
    state: Arc<RwLock<CurrencyState>>,
    default_code: &'static str,
}

impl CurrencyContext {
    pub fn new(default_code: &str) -> Self {
        let default_code = table::descriptor(default_code)
            .map(|d| d.code)
            .unwrap_or(DEFAULT_CURRENCY);
        Self {
            state: Arc::new(RwLock::new(CurrencyState {
                code: default_code,
                status: CurrencyStatus::Ready,
                generation: 0,
            })),
            default_code,
        }
    }

    pub async fn snapshot(&self) -> CurrencySnapshot {
        let state = self.state.read().await;
        CurrencySnapshot {
            code: state.code,
            status: state.status.clone(),
        }
    }

    pub async fn current(&self) -> &'static str {
        self.state.read().await.code
    }

    /// Explicit user choice. Unsupported codes are rejected and leave the
    /// current currency untouched.
    pub async fn set_currency(&self, code: &str) -> Result<&'static str> {
        let descriptor = table::descriptor(code).ok_or_else(|| StorefrontError::UnsupportedCurrency {
            code: code.to_string(),
        })?;

        let mut state = self.state.write().await;
        state.code = descriptor.code;
        state.status = CurrencyStatus::Ready;
        state.generation += 1;
        tracing::info!("Currency set to {}", descriptor.code);
        Ok(descriptor.code)
    }

    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.code = self.default_code;
        state.status = CurrencyStatus::Ready;
        state.generation += 1;
        tracing::debug!("Currency context reset to {}", self.default_code);
    }

    async fn begin_detection(&self) -> u64 {
        let mut state = self.state.write().await;
        state.status = CurrencyStatus::Loading;
        state.generation += 1;
        state.generation
    }

    /// Returns whether the result was applied.
    async fn finish_detection(&self, ticket: u64, outcome: &Result<&'static str>) -> bool {
        let mut state = self.state.write().await;
        if state.generation != ticket {
            tracing::debug!("Ignoring stale currency detection result");
            return false;
        }

        match outcome {
            Ok(code) => {
                state.code = *code;
                state.status = CurrencyStatus::Ready;
            }
            Err(e) => {
                state.code = self.default_code;
                state.status = CurrencyStatus::Failed(e.to_string());
            }
        }
        true
    }

    /// Looks up the caller's country and switches to its currency. On failure
    /// the context falls back to the default currency and records the reason;
    /// the typed error is still returned to the caller.
    pub async fn detect(
        &self,
        locator: &dyn GeoLocator,
        policy: &RetryPolicy,
    ) -> Result<&'static str> {
        let ticket = self.begin_detection().await;

        let outcome = with_retry(policy, "currency detection", || locator.country_code())
            .await
            .map(|country| resolve::currency_for_country(&country));

        if self.finish_detection(ticket, &outcome).await {
            match &outcome {
                Ok(code) => tracing::info!("Detected currency {}", code),
                Err(e) => tracing::warn!("Currency detection failed, using {}: {}", self.default_code, e),
            }
        }
        outcome
    }

    /// Formats in the current currency, or the placeholder while loading.
    pub async fn display(&self, amount: f64) -> String {
        let state = self.state.read().await;
        if state.status == CurrencyStatus::Loading {
            return PLACEHOLDER.to_string();
        }
        format::format_amount(amount, state.code)
    }
}

impl Default for CurrencyContext {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}
