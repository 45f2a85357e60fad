//! Adapters behind the domain ports.

pub mod in_memory;
pub mod paypal;
pub mod tapfiliate;

use crate::error::{Result, SettleError};
use std::time::Duration;

/// Short classification of a failed request: the HTTP status when there is one,
/// otherwise the kind of transport failure.
pub(crate) fn failure_code(error: &reqwest::Error) -> String {
    if let Some(status) = error.status() {
        status.as_u16().to_string()
    } else if error.is_timeout() {
        "timeout".to_string()
    } else if error.is_connect() {
        "connect".to_string()
    } else if error.is_decode() {
        "decode".to_string()
    } else {
        "request".to_string()
    }
}

pub(crate) fn http_client(
    timeout: Duration,
    headers: reqwest::header::HeaderMap,
) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("slapfiliate/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| SettleError::Client(e.to_string()))
}

pub(crate) fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
