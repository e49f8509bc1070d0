//! crudemonitor.ca HTTP adapter.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::info;

use crate::data::ProfileSource;
use crate::data::page::parse_distillation_page;
use crate::domain::{DistillationProfile, ProfileDate};
use crate::error::AppError;

pub const DEFAULT_BASE_URL: &str = "https://crudemonitor.ca/crudes/dist.php";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_BASE_URL: &str = "CRUDEMONITOR_BASE_URL";
const ENV_TIMEOUT: &str = "CRUDEMONITOR_TIMEOUT_SECS";

pub struct CrudeMonitorClient {
    client: Client,
    base_url: String,
}

impl CrudeMonitorClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::failure(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Build a client from the environment (`.env` is honoured).
    ///
    /// - `CRUDEMONITOR_BASE_URL` overrides the distillation page URL.
    /// - `CRUDEMONITOR_TIMEOUT_SECS` overrides the request timeout.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout_secs = match std::env::var(ENV_TIMEOUT) {
            Ok(raw) => parse_timeout(&raw)?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Self::new(base_url, Duration::from_secs(timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch_page(&self, acronym: &str, date: &ProfileDate) -> Result<String, AppError> {
        let time = date.as_query();
        info!(acronym, date = %time, url = %self.base_url, "fetching distillation profile");

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("acr", acronym), ("time", time.as_str())])
            .send()
            .map_err(|e| AppError::failure(format!("crudemonitor request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::failure(format!(
                "crudemonitor request failed with status {}.",
                resp.status()
            )));
        }

        resp.text()
            .map_err(|e| AppError::failure(format!("Failed to read crudemonitor response: {e}")))
    }
}

impl ProfileSource for CrudeMonitorClient {
    fn fetch(&self, acronym: &str, date: &ProfileDate) -> Result<Option<DistillationProfile>, AppError> {
        let body = self.fetch_page(acronym, date)?;
        parse_distillation_page(&body, acronym, date)
    }
}

fn parse_timeout(raw: &str) -> Result<u64, AppError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(AppError::usage(format!(
            "{ENV_TIMEOUT} must be a positive number of seconds (got '{raw}')."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fetch_profile;

    #[test]
    fn timeout_must_be_positive() {
        assert_eq!(parse_timeout("15").unwrap(), 15);
        assert!(parse_timeout("0").unwrap_err().is_usage());
        assert!(parse_timeout("soon").unwrap_err().is_usage());
    }

    #[test]
    fn malformed_date_never_reaches_network() {
        // Port 9 (discard) on localhost: any request would fail with a network error,
        // which is not a usage error.
        let client = CrudeMonitorClient::new("http://127.0.0.1:9/dist.php", Duration::from_secs(1)).unwrap();
        let err = fetch_profile(&client, "RA", "01-01-01").unwrap_err();
        assert!(err.is_usage(), "unexpected error: {err}");
    }
}
