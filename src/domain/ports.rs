use super::affiliate::{AffiliateBalance, PaymentConfirmation, PaymentReceipt, PayoutMethod};
use super::payout::{BatchPayout, BatchReceipt};
use crate::error::Result;
use async_trait::async_trait;

/// The affiliate-tracking side of a settlement run.
#[async_trait]
pub trait AffiliateApi: Send + Sync {
    async fn balances(&self) -> Result<Vec<AffiliateBalance>>;
    /// An affiliate without registered methods yields an empty list.
    async fn payout_methods(&self, affiliate_id: &str) -> Result<Vec<PayoutMethod>>;
    async fn record_payment(&self, payment: &PaymentConfirmation) -> Result<PaymentReceipt>;
}

/// The payments side of a settlement run.
#[async_trait]
pub trait PayoutApi: Send + Sync {
    async fn submit_batch(&self, batch: &BatchPayout) -> Result<BatchReceipt>;
}

pub type AffiliateApiBox = Box<dyn AffiliateApi>;
pub type PayoutApiBox = Box<dyn PayoutApi>;
