use thiserror::Error;

pub type Result<T> = std::result::Result<T, SettleError>;

#[derive(Error, Debug)]
pub enum SettleError {
    #[error("{message} ({setting})")]
    MissingSetting {
        setting: &'static str,
        message: &'static str,
    },
    #[error("Invalid value for {setting}: {reason}")]
    InvalidSetting {
        setting: &'static str,
        reason: String,
    },
    #[error("Failed to fetch tapfiliate balances: status {0}")]
    BalanceStatus(u16),
    #[error("Failed to fetch tapfiliate balances: no response")]
    BalanceUnreachable,
    #[error("Failed to fetch tapfiliate balances: bad request")]
    BalanceRequest,
    #[error("Failed to fetch payout methods for {affiliate_id}: {code}")]
    PayoutMethods { affiliate_id: String, code: String },
    #[error("Error posting batch payouts: {code} at {url}")]
    BatchPayout { code: String, url: String },
    #[error("Failed to post payment for {affiliate_id}: {code}")]
    PaymentRecord { affiliate_id: String, code: String },
    #[error("Unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("HTTP client error: {0}")]
    Client(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
