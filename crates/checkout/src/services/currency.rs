//! Currency conversion trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::RequestContext;
use domain::{Money, NANOS_PER_UNIT};

use crate::error::ServiceError;

/// Trait for currency conversion.
#[async_trait]
pub trait CurrencyService: Send + Sync {
    /// Converts `from` into `to_code`.
    async fn convert(&self, ctx: &RequestContext, from: &Money, to_code: &str) -> Result<Money, ServiceError>;
}

#[derive(Debug)]
struct InMemoryCurrencyState {
    /// Amount of each currency per one USD, in nanos.
    rates: HashMap<String, i64>,
    conversions: usize,
    fail_on_convert: bool,
}

impl Default for InMemoryCurrencyState {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert("USD".to_string(), i64::from(NANOS_PER_UNIT));
        Self {
            rates,
            conversions: 0,
            fail_on_convert: false,
        }
    }
}

/// In-memory converter with exact integer rates.
///
/// Rates are expressed against USD. Results are truncated toward zero at
/// nano precision.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCurrencyService {
    state: Arc<RwLock<InMemoryCurrencyState>>,
}

impl InMemoryCurrencyService {
    /// Creates a converter that only knows USD.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many nanos of `code` one USD buys.
    pub fn set_rate(&self, code: &str, nanos_per_usd: i64) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .rates
            .insert(code.to_string(), nanos_per_usd);
    }

    /// Configures the service to fail on every conversion.
    pub fn set_fail_on_convert(&self, fail: bool) {
        self.state.write().unwrap_or_else(PoisonError::into_inner).fail_on_convert = fail;
    }

    /// Returns the number of conversions attempted.
    pub fn conversions(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).conversions
    }
}

#[async_trait]
impl CurrencyService for InMemoryCurrencyService {
    async fn convert(&self, _ctx: &RequestContext, from: &Money, to_code: &str) -> Result<Money, ServiceError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.conversions += 1;

        if state.fail_on_convert {
            return Err(ServiceError::call("currency", "conversion unavailable"));
        }

        let rate = |code: &str| {
            state
                .rates
                .get(code)
                .copied()
                .filter(|r| *r > 0)
                .ok_or_else(|| ServiceError::call("currency", format!("unsupported currency {code}")))
        };
        let from_rate = i128::from(rate(from.currency_code())?);
        let to_rate = i128::from(rate(to_code)?);

        let converted = from
            .total_nanos()
            .checked_mul(to_rate)
            .map(|scaled| scaled / from_rate)
            .ok_or_else(|| ServiceError::call("currency", format!("conversion of {from} overflows")))?;
        Money::from_nanos(to_code, converted)
            .map_err(|e| ServiceError::call("currency", e.to_string()))
    }
}
