//! Pure selection rules applied between fetching balances and submitting a batch.

use super::affiliate::{AffiliateBalance, AffiliatePayoutRecord, Balance};
use rust_decimal_macros::dec;

/// Items accepted by the payments API in a single batch.
pub const DEFAULT_BATCH_LIMIT: usize = 15_000;

/// A non-production identity that replaces real affiliates before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxAccount {
    pub affiliate_id: String,
    pub email: String,
    pub balance: Balance,
}

impl SandboxAccount {
    fn to_record(&self) -> AffiliatePayoutRecord {
        AffiliatePayoutRecord::new(self.affiliate_id.clone(), self.balance, self.email.clone())
    }
}

/// Operating mode of a run.
///
/// Non-production modes own the accounts that replace the real payout list, so a
/// production run cannot carry sandbox accounts and a non-production run cannot
/// reach the payments API with real affiliates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Production,
    /// Pays a single real test account through the live payments API.
    Staging { account: SandboxAccount },
    /// Pays fixed sandbox accounts through the sandbox payments API.
    Development { accounts: Vec<SandboxAccount> },
}

impl RunMode {
    pub fn staging(affiliate_id: String, email: String) -> Self {
        Self::Staging {
            account: SandboxAccount {
                affiliate_id,
                email,
                balance: Balance::new(dec!(1.02)),
            },
        }
    }

    pub fn development(
        primary_email: String,
        secondary_email: Option<String>,
        primary_id: Option<String>,
        secondary_id: Option<String>,
    ) -> Self {
        Self::Development {
            accounts: vec![
                SandboxAccount {
                    affiliate_id: secondary_id.unwrap_or_else(|| "iantest".to_string()),
                    email: secondary_email.unwrap_or_else(|| "fake@email.com".to_string()),
                    balance: Balance::new(dec!(100)),
                },
                SandboxAccount {
                    affiliate_id: primary_id.unwrap_or_else(|| "kylewells2".to_string()),
                    email: primary_email,
                    balance: Balance::new(dec!(1.02)),
                },
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RunMode::Production => "production",
            RunMode::Staging { .. } => "staging",
            RunMode::Development { .. } => "development",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, RunMode::Production)
    }
}

/// Knobs that shape which affiliates get paid in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPolicy {
    pub mode: RunMode,
    pub pay_floor: Option<Balance>,
    pub batch_limit: usize,
}

impl SettlementPolicy {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            pay_floor: None,
            batch_limit: DEFAULT_BATCH_LIMIT,
        }
    }

    pub fn with_pay_floor(mut self, floor: Balance) -> Self {
        self.pay_floor = Some(floor);
        self
    }

    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit;
        self
    }
}

/// Drops affiliates whose balance is below the floor. Without a floor the list
/// passes through untouched.
pub fn apply_pay_floor(
    affiliates: Vec<AffiliateBalance>,
    floor: Option<Balance>,
) -> Vec<AffiliateBalance> {
    match floor {
        None => affiliates,
        Some(floor) => affiliates
            .into_iter()
            .filter(|affiliate| affiliate.balance >= floor)
            .collect(),
    }
}

/// Replaces the payout list with the mode's sandbox accounts. Production is a
/// passthrough.
pub fn substitute_sandbox(
    mode: &RunMode,
    affiliates: Vec<AffiliatePayoutRecord>,
) -> Vec<AffiliatePayoutRecord> {
    match mode {
        RunMode::Production => affiliates,
        RunMode::Staging { account } => vec![account.to_record()],
        RunMode::Development { accounts } => {
            accounts.iter().map(SandboxAccount::to_record).collect()
        }
    }
}

/// Keeps the list within the batch limit, paying the largest balances first.
///
/// Lists at or under the limit are returned as-is. Otherwise the records are
/// stably sorted by descending balance, so equal balances keep their relative
/// order, and the smallest excess is dropped.
pub fn prioritize(
    mut affiliates: Vec<AffiliatePayoutRecord>,
    limit: usize,
) -> Vec<AffiliatePayoutRecord> {
    if affiliates.len() <= limit {
        return affiliates;
    }
    affiliates.sort_by(|a, b| b.balance.cmp(&a.balance));
    affiliates.truncate(limit);
    affiliates
}
