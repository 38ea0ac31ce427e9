use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use rust_decimal::Decimal;

use crate::models::PaymentMethod;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Approved,
    Declined { reason: String },
}

impl PaymentOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, PaymentOutcome::Approved)
    }
}

/// Charges a customer. Implementations talk to a payment provider; the flow
/// only sees the outcome.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, amount: Decimal, method: PaymentMethod) -> PaymentOutcome;
}

/// Stand-in gateway: waits a fixed latency, then approves with a fixed
/// probability. No money moves.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    latency: Duration,
    success_rate: f64,
}

impl SimulatedGateway {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(2000);
    pub const DEFAULT_SUCCESS_RATE: f64 = 0.8;

    pub fn new(latency: Duration, success_rate: f64) -> Self {
        let success_rate = if success_rate.is_nan() {
            Self::DEFAULT_SUCCESS_RATE
        } else {
            success_rate.clamp(0.0, 1.0)
        };
        Self {
            latency,
            success_rate,
        }
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY, Self::DEFAULT_SUCCESS_RATE)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, amount: Decimal, method: PaymentMethod) -> PaymentOutcome {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let approved = rand::thread_rng().gen_bool(self.success_rate);
        tracing::debug!(%amount, %method, approved, "simulated charge");

        if approved {
            PaymentOutcome::Approved
        } else {
            PaymentOutcome::Declined {
                reason: "Payment failed. Please try again with a different payment method."
                    .to_string(),
            }
        }
    }
}
