use super::{failure_code, http_client};
use crate::config::TapfiliateConfig;
use crate::domain::affiliate::{
    AffiliateBalance, Balance, PaymentConfirmation, PaymentReceipt, PayoutMethod,
};
use crate::domain::ports::AffiliateApi;
use crate::error::{Result, SettleError};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Default, Deserialize)]
struct WireBalances {
    #[serde(rename = "USD", default)]
    usd: Option<Balance>,
}

/// One entry of `GET /balances/`.
#[derive(Debug, Deserialize)]
struct WireBalance {
    #[serde(default)]
    affiliate_id: Option<String>,
    #[serde(default)]
    balances: Option<WireBalances>,
}

/// `POST /payments/` answers with either a single payment or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireReceipt {
    One(PaymentReceipt),
    Many(Vec<PaymentReceipt>),
}

/// Reshapes the balances listing into one record per payable affiliate.
///
/// Entries that do not decode, lack an affiliate id, or lack a positive USD
/// balance have nothing to settle and are left out. The rest of the listing
/// still goes through.
fn balances_from_wire(entries: Vec<Value>) -> Vec<AffiliateBalance> {
    entries
        .into_iter()
        .filter_map(|value| {
            let entry: WireBalance = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed balance entry");
                    return None;
                }
            };
            let affiliate_id = entry
                .affiliate_id
                .map(|id| id.trim().to_string())
                .unwrap_or_default();
            if affiliate_id.is_empty() {
                warn!("Skipping balance entry without an affiliate id");
                return None;
            }
            match entry.balances.and_then(|balances| balances.usd) {
                Some(balance) if balance > Balance::ZERO => {
                    Some(AffiliateBalance::new(affiliate_id, balance))
                }
                _ => {
                    debug!(affiliate_id = %affiliate_id, "No USD balance to settle");
                    None
                }
            }
        })
        .collect()
}

/// Client for the Tapfiliate REST API.
pub struct TapfiliateClient {
    http: reqwest::Client,
    base_url: Url,
}

impl TapfiliateClient {
    pub fn new(config: &TapfiliateConfig, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let api_key =
            HeaderValue::from_str(&config.api_key).map_err(|e| SettleError::InvalidSetting {
                setting: "TAP_API_KEY",
                reason: e.to_string(),
            })?;
        headers.insert("api-key", api_key);

        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| SettleError::InvalidSetting {
                setting: "TAP_BASE_URL",
                reason: format!("not a base URL: {}", config.base_url),
            })?;

        Ok(Self {
            http: http_client(timeout, headers)?,
            base_url,
        })
    }

    /// Joins percent-encoded path segments onto the base URL. Every endpoint
    /// ends with a slash.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }
}

#[async_trait]
impl AffiliateApi for TapfiliateClient {
    async fn balances(&self) -> Result<Vec<AffiliateBalance>> {
        let url = self.endpoint(&["balances"]);
        let response = self.http.get(url.clone()).send().await.map_err(|e| {
            warn!(error = %e, url = %url, "Balance request failed");
            if e.is_timeout() || e.is_connect() {
                SettleError::BalanceUnreachable
            } else {
                SettleError::BalanceRequest
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SettleError::BalanceStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| SettleError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let entries: Vec<Value> = serde_json::from_str(&body).map_err(|e| SettleError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(balances_from_wire(entries))
    }

    async fn payout_methods(&self, affiliate_id: &str) -> Result<Vec<PayoutMethod>> {
        let url = self.endpoint(&["affiliates", affiliate_id, "payout-methods"]);
        let failed = |code: String| SettleError::PayoutMethods {
            affiliate_id: affiliate_id.to_string(),
            code,
        };

        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|e| failed(failure_code(&e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(status.as_u16().to_string()));
        }

        let body = response.text().await.map_err(|e| failed(failure_code(&e)))?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        let methods: Option<Vec<PayoutMethod>> =
            serde_json::from_str(&body).map_err(|e| SettleError::Decode {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(methods.unwrap_or_default())
    }

    async fn record_payment(&self, payment: &PaymentConfirmation) -> Result<PaymentReceipt> {
        let url = self.endpoint(&["payments"]);
        let failed = |code: String| SettleError::PaymentRecord {
            affiliate_id: payment.affiliate_id.clone(),
            code,
        };

        let response = self
            .http
            .post(url.clone())
            .json(payment)
            .send()
            .await
            .map_err(|e| failed(failure_code(&e)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(status.as_u16().to_string()));
        }

        let receipt: WireReceipt = response.json().await.map_err(|e| SettleError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        match receipt {
            WireReceipt::One(receipt) => Ok(receipt),
            WireReceipt::Many(receipts) => {
                receipts.into_iter().next().ok_or(SettleError::Decode {
                    url: url.to_string(),
                    reason: "empty payment list".to_string(),
                })
            }
        }
    }
}
