use super::{failure_code, http_client, trim_base};
use crate::config::PaypalConfig;
use crate::domain::payout::{BatchPayout, BatchReceipt};
use crate::domain::ports::PayoutApi;
use crate::error::{Result, SettleError};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::header::{ACCEPT_LANGUAGE, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// `Authorization` value for the client-credentials exchange.
pub fn basic_authorization(user: &str, pass: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{user}:{pass}")))
}

/// Client for the PayPal Payouts API.
///
/// A fresh access token is requested for every batch; nothing is cached between
/// runs.
pub struct PaypalClient {
    http: reqwest::Client,
    host: String,
    client_id: String,
    secret: String,
}

impl PaypalClient {
    pub fn new(config: &PaypalConfig, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en_US"));

        Ok(Self {
            http: http_client(timeout, headers)?,
            host: trim_base(&config.host),
            client_id: config.client_id.clone(),
            secret: config.secret.clone(),
        })
    }

    fn batch_error(url: &str, code: String) -> SettleError {
        SettleError::BatchPayout {
            code,
            url: url.to_string(),
        }
    }

    async fn fetch_token(&self) -> Result<String> {
        let url = format!("{}/v1/oauth2/token", self.host);
        let response = self
            .http
            .post(&url)
            .header(
                AUTHORIZATION,
                basic_authorization(&self.client_id, &self.secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Token request failed");
                Self::batch_error(&url, failure_code(&e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::batch_error(&url, status.as_u16().to_string()));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "Unreadable token response");
            Self::batch_error(&url, "decode".to_string())
        })?;
        debug!("Obtained payouts access token");
        Ok(token.access_token)
    }
}

#[async_trait]
impl PayoutApi for PaypalClient {
    async fn submit_batch(&self, batch: &BatchPayout) -> Result<BatchReceipt> {
        let token = self.fetch_token().await?;

        let url = format!("{}/v1/payments/payouts", self.host);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(batch)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Batch payout request failed");
                Self::batch_error(&url, failure_code(&e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Batch payout rejected");
            return Err(Self::batch_error(&url, status.as_u16().to_string()));
        }

        response.json::<BatchReceipt>().await.map_err(|e| {
            warn!(error = %e, "Unreadable batch payout response");
            Self::batch_error(&url, "decode".to_string())
        })
    }
}
