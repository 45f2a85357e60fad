use crate::domain::affiliate::{
    AffiliateBalance, AffiliatePayoutRecord, PaymentConfirmation, PaymentResult, PostedAffiliate,
    primary_email,
};
use crate::domain::payout::BatchPayout;
use crate::domain::policy::{
    SettlementPolicy, apply_pay_floor, prioritize, substitute_sandbox,
};
use crate::domain::ports::{AffiliateApiBox, PayoutApiBox};
use crate::error::Result;
use futures::future::join_all;
use tracing::{info, warn};

pub const NOTHING_TO_PAY: &str =
    "No affiliates found with both active balance and active payout method";

/// Result of the batch submission stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchSubmission {
    /// The payout list was empty; the payments API was not contacted.
    NothingToPay,
    /// Every submitted record, stamped with the batch the payments API created.
    Submitted(Vec<PostedAffiliate>),
}

/// What a settlement run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementReport {
    NothingToPay,
    Paid(Vec<PaymentResult>),
}

impl SettlementReport {
    /// One human-readable line per paid affiliate, or the nothing-to-pay notice.
    pub fn lines(&self) -> Vec<String> {
        match self {
            SettlementReport::NothingToPay => vec![NOTHING_TO_PAY.to_string()],
            SettlementReport::Paid(results) => results.iter().map(ToString::to_string).collect(),
        }
    }
}

/// The settlement pipeline.
///
/// Each stage completes before the next one starts. Inside a stage, requests
/// for different affiliates run concurrently and every one of them is awaited,
/// whatever happens to its siblings.
pub struct Settlement {
    affiliates: AffiliateApiBox,
    payouts: PayoutApiBox,
    policy: SettlementPolicy,
}

impl Settlement {
    pub fn new(affiliates: AffiliateApiBox, payouts: PayoutApiBox, policy: SettlementPolicy) -> Self {
        Self {
            affiliates,
            payouts,
            policy,
        }
    }

    /// Runs every stage in order. Stage failures end the run; failures for a
    /// single affiliate only shape the report.
    pub async fn run(&self) -> Result<SettlementReport> {
        info!(mode = self.policy.mode.name(), "Starting settlement run");

        let balances = self.fetch_balances().await?;
        let balances = apply_pay_floor(balances, self.policy.pay_floor);
        info!(count = balances.len(), "Affiliates at or above the pay floor");

        let records = self.join_payout_methods(balances).await;
        let records = substitute_sandbox(&self.policy.mode, records);
        let records = prioritize(records, self.policy.batch_limit);

        match self.submit_batch(records).await? {
            BatchSubmission::NothingToPay => {
                info!("{}", NOTHING_TO_PAY);
                Ok(SettlementReport::NothingToPay)
            }
            BatchSubmission::Submitted(posted) => {
                Ok(SettlementReport::Paid(self.record_payments(&posted).await))
            }
        }
    }

    pub async fn fetch_balances(&self) -> Result<Vec<AffiliateBalance>> {
        let balances = self.affiliates.balances().await?;
        info!(count = balances.len(), "Fetched affiliate balances");
        Ok(balances)
    }

    /// Attaches the primary payout email to each balance. Affiliates without a
    /// primary method, or whose lookup failed, are left out.
    pub async fn join_payout_methods(
        &self,
        balances: Vec<AffiliateBalance>,
    ) -> Vec<AffiliatePayoutRecord> {
        let lookups = balances
            .iter()
            .map(|balance| self.affiliates.payout_methods(&balance.affiliate_id));
        let outcomes = join_all(lookups).await;

        let records: Vec<_> = balances
            .into_iter()
            .zip(outcomes)
            .filter_map(|(balance, outcome)| match outcome {
                Ok(methods) => match primary_email(&methods) {
                    Some(email) => {
                        let email = email.to_string();
                        Some(AffiliatePayoutRecord::from_balance(balance, email))
                    }
                    None => {
                        info!(affiliate_id = %balance.affiliate_id, "No primary payout method");
                        None
                    }
                },
                Err(e) => {
                    warn!(affiliate_id = %balance.affiliate_id, error = %e, "Payout method lookup failed");
                    None
                }
            })
            .collect();

        info!(count = records.len(), "Affiliates with a primary payout method");
        records
    }

    /// Sends one batch for all records. An empty list never reaches the
    /// payments API.
    pub async fn submit_batch(&self, records: Vec<AffiliatePayoutRecord>) -> Result<BatchSubmission> {
        if records.is_empty() {
            return Ok(BatchSubmission::NothingToPay);
        }

        let batch = BatchPayout::new(&records, chrono::Utc::now().timestamp_millis());
        info!(
            sender_batch_id = %batch.sender_batch_header.sender_batch_id,
            items = batch.items.len(),
            "Submitting batch payout"
        );
        let receipt = self.payouts.submit_batch(&batch).await?;
        let header = receipt.batch_header;
        info!(
            "Batch Status: {}, ID: {}",
            header.batch_status.as_deref().unwrap_or_default(),
            header.payout_batch_id.as_deref().unwrap_or_default()
        );

        let posted = records
            .into_iter()
            .map(|record| PostedAffiliate {
                record,
                batch_id: header.payout_batch_id.clone(),
                batch_status: header.batch_status.clone(),
            })
            .collect();
        Ok(BatchSubmission::Submitted(posted))
    }

    /// Writes one payment back per posted affiliate. The result list lines up
    /// with `posted`, with a failure marker wherever the write-back failed.
    pub async fn record_payments(&self, posted: &[PostedAffiliate]) -> Vec<PaymentResult> {
        let confirmations: Vec<_> = posted.iter().map(PaymentConfirmation::for_posted).collect();
        let writes = confirmations
            .iter()
            .map(|confirmation| self.affiliates.record_payment(confirmation));
        let outcomes = join_all(writes).await;

        posted
            .iter()
            .zip(outcomes)
            .map(|(affiliate, outcome)| match outcome {
                Ok(receipt) => PaymentResult::paid(receipt, affiliate.batch_id.clone()),
                Err(e) => {
                    warn!(affiliate_id = %affiliate.record.affiliate_id, error = %e, "Payment write-back failed");
                    PaymentResult::Failed
                }
            })
            .collect()
    }
}
