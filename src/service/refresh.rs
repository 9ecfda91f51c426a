use crate::api::sources::{CountrySource, RateSource};
use crate::db::models::{CountryRecord, DbCountry};
use crate::db::sqlite::CountryStorage;
use crate::error::CountryError;
use crate::service::gdp::{CurrencyResolution, GdpEstimator};
use crate::service::summary::{SummaryRenderer, SummarySnapshot};
use crate::types::country::{RefreshSummary, ValidCountryInput};
use crate::types::upstream::UpstreamCountry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetch -> merge -> upsert -> metadata -> render.
///
/// Not transactional: rows upserted before a late failure stay written. Concurrent
/// refreshes are not serialized; the store resolves races last-write-wins.
#[derive(Clone)]
pub struct RefreshService {
    storage: CountryStorage,
    countries: Arc<dyn CountrySource>,
    rates: Arc<dyn RateSource>,
    estimator: GdpEstimator,
    renderer: SummaryRenderer,
}

impl RefreshService {
    pub fn new(
        storage: CountryStorage,
        countries: Arc<dyn CountrySource>,
        rates: Arc<dyn RateSource>,
        estimator: GdpEstimator,
        renderer: SummaryRenderer,
    ) -> Self {
        Self {
            storage,
            countries,
            rates,
            estimator,
            renderer,
        }
    }

    pub async fn refresh(&self) -> Result<RefreshSummary, CountryError> {
        // both fetches must succeed before anything is written
        let (countries, rates) = tokio::try_join!(
            self.countries.fetch_countries(),
            self.rates.fetch_rates()
        )
        .inspect_err(|e| warn!(error = %e, "refresh aborted: upstream unavailable"))?;

        let fetched = countries.len();
        let mut processed: i64 = 0;
        for upstream in countries {
            let Some(record) = self.merge(upstream, &rates) else {
                continue;
            };
            self.storage.upsert(&record).await?;
            processed += 1;
        }

        let metadata = self.storage.save_metadata(processed).await?;
        info!(fetched, processed, rates = rates.len(), "countries refreshed");

        self.render_summary().await;

        Ok(RefreshSummary {
            message: "Countries data refreshed successfully".to_string(),
            total_countries: metadata.total_countries,
            last_refreshed_at: metadata.last_refreshed_at.unwrap_or_else(chrono::Utc::now),
        })
    }

    /// Build the stored row for one upstream record; `None` if it has no name.
    pub fn merge(
        &self,
        upstream: UpstreamCountry,
        rates: &HashMap<String, f64>,
    ) -> Option<CountryRecord> {
        let Some(name) = upstream
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
        else {
            warn!(?upstream, "skipping upstream country without a name");
            return None;
        };

        let population = upstream.population.unwrap_or(0).max(0);
        let has_currencies = !upstream.currencies().is_empty();
        let currency_code = upstream.primary_currency_code().map(str::to_string);
        let exchange_rate = currency_code
            .as_deref()
            .and_then(|code| rates.get(code).copied());
        let resolution =
            CurrencyResolution::resolve(has_currencies, currency_code.as_deref(), exchange_rate);
        let estimated_gdp = self.estimator.estimate(population, &resolution);

        Some(CountryRecord {
            name,
            capital: upstream.capital,
            region: upstream.region,
            population,
            currency_code,
            exchange_rate,
            estimated_gdp,
            flag_url: upstream.flag,
        })
    }

    /// Direct write through the validated input path. GDP is still derived, never taken
    /// from the client.
    pub async fn save_country(&self, input: ValidCountryInput) -> Result<DbCountry, CountryError> {
        let resolution = CurrencyResolution::resolve(
            true,
            Some(input.currency_code.as_str()),
            input.exchange_rate,
        );
        let estimated_gdp = self.estimator.estimate(input.population, &resolution);
        let record = CountryRecord {
            name: input.name,
            capital: input.capital,
            region: input.region,
            population: input.population,
            currency_code: Some(input.currency_code),
            exchange_rate: input.exchange_rate,
            estimated_gdp,
            flag_url: input.flag_url,
        };
        let stored = self.storage.upsert(&record).await?;
        info!(name = %stored.name, "country saved");
        Ok(stored)
    }

    /// Redraw the summary image. Failures are logged and never reach the caller.
    pub async fn render_summary(&self) {
        let snapshot = match SummarySnapshot::load(&self.storage).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "summary snapshot failed; image not updated");
                return;
            }
        };
        let renderer = self.renderer.clone();
        match tokio::task::spawn_blocking(move || renderer.render(&snapshot)).await {
            Ok(Ok(())) => debug!("summary image rendered"),
            Ok(Err(e)) => warn!(error = %e, "summary image generation failed"),
            Err(e) => warn!(error = %e, "summary render task panicked"),
        }
    }
}
