use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker emitted in place of a confirmation line when the write-back fails.
pub const PAYMENT_FAILED: &str = "Failed to post payment";

/// A USD amount owed to (or paid to) an affiliate.
///
/// Wraps `rust_decimal::Decimal` so balances are never handled as floats. On the
/// wire it is a plain JSON number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Balance(#[serde(with = "rust_decimal::serde::float")] pub Decimal);

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Formats the amount with exactly two decimal places, rounding half away from zero.
    pub fn to_fixed_2(&self) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{:.2}", rounded)
    }
}

impl From<Decimal> for Balance {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Current USD balance of one affiliate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliateBalance {
    pub affiliate_id: String,
    pub balance: Balance,
}

impl AffiliateBalance {
    pub fn new(affiliate_id: impl Into<String>, balance: impl Into<Balance>) -> Self {
        Self {
            affiliate_id: affiliate_id.into(),
            balance: balance.into(),
        }
    }
}

/// An affiliate balance joined with the email of its primary payout method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffiliatePayoutRecord {
    pub affiliate_id: String,
    pub balance: Balance,
    pub email: String,
}

impl AffiliatePayoutRecord {
    pub fn new(
        affiliate_id: impl Into<String>,
        balance: impl Into<Balance>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            affiliate_id: affiliate_id.into(),
            balance: balance.into(),
            email: email.into(),
        }
    }

    pub fn from_balance(balance: AffiliateBalance, email: String) -> Self {
        Self {
            affiliate_id: balance.affiliate_id,
            balance: balance.balance,
            email,
        }
    }
}

/// A payout record after the batch was accepted by the payments API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedAffiliate {
    pub record: AffiliatePayoutRecord,
    pub batch_id: Option<String>,
    pub batch_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PayoutDetails {
    #[serde(default)]
    pub paypal_address: Option<String>,
}

/// One registered payout destination of an affiliate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PayoutMethod {
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub details: PayoutDetails,
}

impl PayoutMethod {
    pub fn paypal(address: impl Into<String>, primary: bool) -> Self {
        Self {
            primary,
            details: PayoutDetails {
                paypal_address: Some(address.into()),
            },
        }
    }
}

/// Returns the email of the first primary method that carries an address.
pub fn primary_email(methods: &[PayoutMethod]) -> Option<&str> {
    methods
        .iter()
        .filter(|method| method.primary)
        .filter_map(|method| method.details.paypal_address.as_deref())
        .map(str::trim)
        .find(|address| !address.is_empty())
}

/// Payment write-back sent to the affiliate-tracking API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentConfirmation {
    pub affiliate_id: String,
    pub amount: Balance,
    pub currency: &'static str,
}

impl PaymentConfirmation {
    pub fn for_posted(posted: &PostedAffiliate) -> Self {
        Self {
            affiliate_id: posted.record.affiliate_id.clone(),
            amount: posted.record.balance,
            currency: "USD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReceiptAffiliate {
    pub id: String,
}

/// Payment as recorded by the affiliate-tracking API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PaymentReceipt {
    pub created_at: String,
    pub affiliate: ReceiptAffiliate,
    pub amount: Balance,
}

/// Outcome of one payment write-back, rendered as a single report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentResult {
    Paid {
        created_at: String,
        affiliate_id: String,
        amount: Balance,
        batch_id: Option<String>,
    },
    Failed,
}

impl PaymentResult {
    pub fn paid(receipt: PaymentReceipt, batch_id: Option<String>) -> Self {
        Self::Paid {
            created_at: receipt.created_at,
            affiliate_id: receipt.affiliate.id,
            amount: receipt.amount,
            batch_id,
        }
    }
}

impl fmt::Display for PaymentResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentResult::Paid {
                created_at,
                affiliate_id,
                amount,
                batch_id,
            } => write!(
                f,
                "{} : {} paid {} ({})",
                created_at,
                affiliate_id,
                amount,
                batch_id.as_deref().unwrap_or_default()
            ),
            PaymentResult::Failed => f.write_str(PAYMENT_FAILED),
        }
    }
}
