//! Payment provider port.
//!
//! Execution posts one payment per worker through this trait. The simulated
//! provider stands in for a real payment rail during development and in
//! tests, with configurable latency and failure rate.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::Worker;

/// Errors a payment provider can return for a single worker.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider refused the payment.
    #[error("Payment rejected: {0}")]
    Rejected(String),

    /// The provider did not respond in time.
    #[error("Payment timed out")]
    Timeout,
}

/// Posts a single net-pay payment for a worker.
///
/// Implementations must be safe to call concurrently; the execution engine
/// runs several workers at once against one shared provider.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Posts `amount` for `worker`, returning once the provider has
    /// accepted or rejected it.
    async fn post_payment(&self, worker: &Worker, amount: Decimal) -> Result<(), ProviderError>;
}

/// A provider that sleeps for a fixed latency and fails a configurable
/// fraction of payments at random.
#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    latency: Duration,
    failure_rate: f64,
}

impl SimulatedProvider {
    /// Creates a simulated provider.
    ///
    /// `failure_rate` is clamped to `0.0..=1.0`. A rate of `0.0` gives a
    /// deterministic always-succeeds provider, useful in tests.
    pub fn new(latency: Duration, failure_rate: f64) -> Self {
        Self {
            latency,
            failure_rate: failure_rate.clamp(0.0, 1.0),
        }
    }

    /// An instant, always-successful provider.
    pub fn reliable() -> Self {
        Self::new(Duration::ZERO, 0.0)
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new(Duration::from_millis(400), 0.12)
    }
}

#[async_trait]
impl PaymentProvider for SimulatedProvider {
    async fn post_payment(&self, worker: &Worker, _amount: Decimal) -> Result<(), ProviderError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let roll: f64 = rand::random();
        if roll < self.failure_rate {
            return Err(ProviderError::Rejected(format!(
                "Provider declined payment for {}",
                worker.id
            )));
        }
        Ok(())
    }
}
