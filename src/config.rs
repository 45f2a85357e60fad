//! Run configuration, read once from the environment and passed down explicitly.

use crate::domain::affiliate::Balance;
use crate::domain::policy::{DEFAULT_BATCH_LIMIT, RunMode, SettlementPolicy};
use crate::error::{Result, SettleError};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_TAPFILIATE_URL: &str = "https://api.tapfiliate.com/1.6";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapfiliateConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaypalConfig {
    pub host: String,
    pub client_id: String,
    pub secret: String,
}

/// Everything a settlement run needs, validated before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tapfiliate: TapfiliateConfig,
    pub paypal: PaypalConfig,
    pub policy: SettlementPolicy,
    pub request_timeout: Duration,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };

        let mode_name = match env.optional("SLAPFILIATE_ENV") {
            Some(name) => name,
            None => {
                info!("No environment set, defaulting to SLAPFILIATE_ENV=development");
                "development".to_string()
            }
        };

        let tapfiliate = TapfiliateConfig {
            base_url: env
                .optional("TAP_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TAPFILIATE_URL.to_string()),
            api_key: env.required("TAP_API_KEY", "Please set tapfiliate API key")?,
        };

        let pay_floor = env
            .parsed::<Decimal>("PAYOUT_FLOOR")?
            .map(|floor| {
                if floor.is_sign_negative() {
                    Err(SettleError::InvalidSetting {
                        setting: "PAYOUT_FLOOR",
                        reason: "must not be negative".to_string(),
                    })
                } else {
                    Ok(Balance::new(floor))
                }
            })
            .transpose()?;
        let batch_limit = env
            .positive::<usize>("PAYPAL_LIMIT")?
            .unwrap_or(DEFAULT_BATCH_LIMIT);
        let timeout_secs = env
            .positive::<u64>("REQUEST_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let (mode, paypal) = match mode_name.as_str() {
            "production" => (RunMode::Production, env.live_paypal()?),
            "staging" => {
                let paypal = env.live_paypal()?;
                let email = env.required(
                    "STAGING_EMAIL",
                    "Please provide a real PayPal email to verify functionality",
                )?;
                let id = env.required(
                    "STAGING_ID",
                    "Please provide a real Tapfiliate ID to verify functionality",
                )?;
                (RunMode::staging(id, email), paypal)
            }
            "development" => {
                let paypal = PaypalConfig {
                    host: env.required(
                        "PAYPAL_SANDBOX_HOST",
                        "Please provide the URL for PayPal sandbox API",
                    )?,
                    client_id: env
                        .required("PAYPAL_SANDBOX_ID", "Please provide PayPal sandbox ID")?,
                    secret: env.required(
                        "PAYPAL_SANDBOX_SECRET",
                        "Please provide PayPal sandbox Secret",
                    )?,
                };
                let email = env.required(
                    "SANDBOX_EMAIL1",
                    "At least one PayPal sandbox email required",
                )?;
                let mode = RunMode::development(
                    email,
                    env.optional("SANDBOX_EMAIL2"),
                    env.optional("SANDBOX_ID1"),
                    env.optional("SANDBOX_ID2"),
                );
                (mode, paypal)
            }
            other => {
                return Err(SettleError::InvalidSetting {
                    setting: "SLAPFILIATE_ENV",
                    reason: format!(
                        "expected production, staging or development, got '{other}'"
                    ),
                });
            }
        };

        let mut policy = SettlementPolicy::new(mode).with_batch_limit(batch_limit);
        if let Some(floor) = pay_floor {
            policy = policy.with_pay_floor(floor);
        }

        Ok(Self {
            tapfiliate,
            paypal,
            policy,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &'static str, message: &'static str) -> Result<String> {
        self.optional(key).ok_or(SettleError::MissingSetting {
            setting: key,
            message,
        })
    }

    fn parsed<T>(&self, key: &'static str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| SettleError::InvalidSetting {
                    setting: key,
                    reason: format!("'{raw}': {e}"),
                })
            })
            .transpose()
    }

    fn positive<T>(&self, key: &'static str) -> Result<Option<T>>
    where
        T: FromStr + PartialEq + Default,
        T::Err: std::fmt::Display,
    {
        match self.parsed::<T>(key)? {
            Some(value) if value == T::default() => Err(SettleError::InvalidSetting {
                setting: key,
                reason: "must be greater than zero".to_string(),
            }),
            other => Ok(other),
        }
    }

    fn live_paypal(&self) -> Result<PaypalConfig> {
        Ok(PaypalConfig {
            host: self.required("PAYPAL_HOST", "Please set PayPal URL")?,
            client_id: self.required("PAYPAL_ID", "Please set PayPal ID")?,
            secret: self.required("PAYPAL_SECRET", "Please set PayPal Secret")?,
        })
    }
}
