use crate::domain::affiliate::{
    AffiliateBalance, PaymentConfirmation, PaymentReceipt, PayoutMethod, ReceiptAffiliate,
};
use crate::domain::payout::{BatchHeaderReceipt, BatchPayout, BatchReceipt};
use crate::domain::ports::{AffiliateApi, PayoutApi};
use crate::error::{Result, SettleError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-memory affiliate directory.
///
/// Serves fixed balances and payout methods, and keeps every payment it is asked
/// to record. Affiliates marked as failing reject their payment write-back.
/// Useful for exercising the pipeline without network access.
#[derive(Default, Clone)]
pub struct InMemoryAffiliateApi {
    balances: Vec<AffiliateBalance>,
    methods: HashMap<String, Vec<PayoutMethod>>,
    failing_payments: HashSet<String>,
    created_at: String,
    recorded: Arc<RwLock<Vec<PaymentConfirmation>>>,
    lookups: Arc<RwLock<Vec<String>>>,
}

impl InMemoryAffiliateApi {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            created_at: "2000-12-31".to_string(),
            ..Self::default()
        }
    }

    pub fn with_balance(mut self, balance: AffiliateBalance) -> Self {
        self.balances.push(balance);
        self
    }

    pub fn with_methods(mut self, affiliate_id: &str, methods: Vec<PayoutMethod>) -> Self {
        self.methods.insert(affiliate_id.to_string(), methods);
        self
    }

    /// Makes the payment write-back for `affiliate_id` fail.
    pub fn failing_payment(mut self, affiliate_id: &str) -> Self {
        self.failing_payments.insert(affiliate_id.to_string());
        self
    }

    /// Payments recorded so far, in arrival order.
    pub async fn recorded_payments(&self) -> Vec<PaymentConfirmation> {
        self.recorded.read().await.clone()
    }

    /// Affiliates whose payout methods were looked up.
    pub async fn method_lookups(&self) -> Vec<String> {
        self.lookups.read().await.clone()
    }
}

#[async_trait]
impl AffiliateApi for InMemoryAffiliateApi {
    async fn balances(&self) -> Result<Vec<AffiliateBalance>> {
        Ok(self.balances.clone())
    }

    async fn payout_methods(&self, affiliate_id: &str) -> Result<Vec<PayoutMethod>> {
        self.lookups.write().await.push(affiliate_id.to_string());
        Ok(self.methods.get(affiliate_id).cloned().unwrap_or_default())
    }

    async fn record_payment(&self, payment: &PaymentConfirmation) -> Result<PaymentReceipt> {
        if self.failing_payments.contains(&payment.affiliate_id) {
            return Err(SettleError::PaymentRecord {
                affiliate_id: payment.affiliate_id.clone(),
                code: "500".to_string(),
            });
        }
        self.recorded.write().await.push(payment.clone());
        Ok(PaymentReceipt {
            created_at: self.created_at.clone(),
            affiliate: ReceiptAffiliate {
                id: payment.affiliate_id.clone(),
            },
            amount: payment.amount,
        })
    }
}

/// An in-memory payments API that accepts every batch under a fixed id.
#[derive(Clone)]
pub struct InMemoryPayoutApi {
    batch_id: String,
    submitted: Arc<RwLock<Vec<BatchPayout>>>,
}

impl InMemoryPayoutApi {
    pub fn new(batch_id: &str) -> Self {
        Self {
            batch_id: batch_id.to_string(),
            submitted: Arc::default(),
        }
    }

    /// Batches submitted so far.
    pub async fn submitted(&self) -> Vec<BatchPayout> {
        self.submitted.read().await.clone()
    }
}

#[async_trait]
impl PayoutApi for InMemoryPayoutApi {
    async fn submit_batch(&self, batch: &BatchPayout) -> Result<BatchReceipt> {
        self.submitted.write().await.push(batch.clone());
        Ok(BatchReceipt {
            batch_header: BatchHeaderReceipt {
                payout_batch_id: Some(self.batch_id.clone()),
                batch_status: Some("PENDING".to_string()),
            },
        })
    }
}
