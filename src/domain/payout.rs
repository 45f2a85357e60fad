use super::affiliate::AffiliatePayoutRecord;
use serde::{Deserialize, Serialize};

pub const EMAIL_SUBJECT: &str = "You have a new affiliate payout!";
pub const EMAIL_MESSAGE: &str =
    "You have a new affiliate payout.\nThank you for being one of our affiliates!";
pub const ITEM_NOTE: &str = "Thank you for your support";

/// Header of a batch payout. One per submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPayoutHeader {
    pub sender_batch_id: String,
    pub email_subject: String,
    pub email_message: String,
    pub recipient_type: String,
}

impl BatchPayoutHeader {
    pub fn new(key: i64) -> Self {
        Self {
            sender_batch_id: format!("Payouts_{key}"),
            email_subject: EMAIL_SUBJECT.to_string(),
            email_message: EMAIL_MESSAGE.to_string(),
            recipient_type: "EMAIL".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutAmount {
    pub currency: String,
    pub value: String,
}

/// A single payout within a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutItem {
    pub sender_item_id: String,
    pub receiver: String,
    pub amount: PayoutAmount,
    pub note: String,
}

impl PayoutItem {
    /// The item id is the batch key followed by the zero-padded position, so ids
    /// never collide within a batch.
    pub fn new(record: &AffiliatePayoutRecord, key: i64, index: usize) -> Self {
        Self {
            sender_item_id: format!("{key}{index:05}"),
            receiver: record.email.clone(),
            amount: PayoutAmount {
                currency: "USD".to_string(),
                value: record.balance.to_fixed_2(),
            },
            note: ITEM_NOTE.to_string(),
        }
    }
}

/// Request body for the payments API batch endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPayout {
    pub sender_batch_header: BatchPayoutHeader,
    pub items: Vec<PayoutItem>,
}

impl BatchPayout {
    pub fn new(records: &[AffiliatePayoutRecord], key: i64) -> Self {
        Self {
            sender_batch_header: BatchPayoutHeader::new(key),
            items: records
                .iter()
                .enumerate()
                .map(|(index, record)| PayoutItem::new(record, key, index))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchHeaderReceipt {
    #[serde(default)]
    pub payout_batch_id: Option<String>,
    #[serde(default)]
    pub batch_status: Option<String>,
}

/// What the payments API returns for an accepted batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BatchReceipt {
    #[serde(default)]
    pub batch_header: BatchHeaderReceipt,
}
