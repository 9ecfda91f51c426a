use crate::config::Config;
use crate::error::{CountryError, UpstreamSource};
use crate::types::upstream::{ExchangeRatesPayload, UpstreamCountry};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Provider of the raw country list.
#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch_countries(&self) -> Result<Vec<UpstreamCountry>, CountryError>;
}

/// Provider of currency code -> rate against the base currency.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rates(&self) -> Result<HashMap<String, f64>, CountryError>;
}

/// Shared outbound client: bounded total timeout, optional proxy, no retries.
pub fn build_http_client(
    timeout: Duration,
    proxy: Option<&Url>,
) -> Result<reqwest::Client, CountryError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!("country-exchange/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .timeout(timeout);
    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url.as_str())
            .map_err(|e| CountryError::Internal(format!("invalid proxy url: {e}")))?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| CountryError::Internal(format!("HTTP client init failed: {e}")))
}

async fn get_json<T>(
    client: &reqwest::Client,
    url: &Url,
    dependency: UpstreamSource,
) -> Result<T, CountryError>
where
    T: serde::de::DeserializeOwned,
{
    let resp = client
        .get(url.clone())
        .header("Accept", "application/json")
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| CountryError::upstream(dependency, e))?;
    resp.json::<T>()
        .await
        .map_err(|e| CountryError::upstream(dependency, e))
}

#[derive(Clone)]
pub struct RestCountriesClient {
    client: reqwest::Client,
    url: Url,
}

impl RestCountriesClient {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn from_config(client: reqwest::Client, cfg: &Config) -> Self {
        Self::new(client, cfg.country_api_url.clone())
    }
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    async fn fetch_countries(&self) -> Result<Vec<UpstreamCountry>, CountryError> {
        debug!(url = %self.url, "fetching countries");
        let countries: Vec<UpstreamCountry> =
            get_json(&self.client, &self.url, UpstreamSource::Countries).await?;
        info!(count = countries.len(), "countries fetched");
        Ok(countries)
    }
}

#[derive(Clone)]
pub struct ExchangeRateClient {
    client: reqwest::Client,
    url: Url,
}

impl ExchangeRateClient {
    pub fn new(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn from_config(client: reqwest::Client, cfg: &Config) -> Self {
        Self::new(client, cfg.exchange_api_url.clone())
    }
}

#[async_trait]
impl RateSource for ExchangeRateClient {
    async fn fetch_rates(&self) -> Result<HashMap<String, f64>, CountryError> {
        debug!(url = %self.url, "fetching exchange rates");
        let payload: ExchangeRatesPayload =
            get_json(&self.client, &self.url, UpstreamSource::ExchangeRates).await?;
        info!(
            base = payload.base_code.as_deref().unwrap_or("-"),
            count = payload.rates.len(),
            "exchange rates fetched"
        );
        Ok(payload.rates)
    }
}
