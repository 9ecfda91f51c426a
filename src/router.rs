use crate::api::sources::{ExchangeRateClient, RestCountriesClient, build_http_client};
use crate::config::Config;
use crate::db::sqlite::CountryStorage;
use crate::error::CountryError;
use crate::handlers::{countries, status};
use crate::service::{GdpEstimator, QueryService, RefreshService, SummaryRenderer};
use axum::{
    Router,
    routing::{get, post},
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub refresh: RefreshService,
    pub query: QueryService,
    pub image_path: PathBuf,
}

impl AppState {
    pub fn new(refresh: RefreshService, query: QueryService, image_path: PathBuf) -> Self {
        Self {
            refresh,
            query,
            image_path,
        }
    }

    /// Production wiring: HTTP sources, thread RNG multiplier, on-disk summary image.
    pub fn from_config(cfg: &Config, storage: CountryStorage) -> Result<Self, CountryError> {
        let client = build_http_client(cfg.fetch_timeout(), cfg.proxy.as_ref())?;
        let image_path = cfg.summary_image_path();
        let refresh = RefreshService::new(
            storage.clone(),
            Arc::new(RestCountriesClient::from_config(client.clone(), cfg)),
            Arc::new(ExchangeRateClient::from_config(client, cfg)),
            GdpEstimator::default(),
            SummaryRenderer::new(image_path.clone()),
        );
        Ok(Self::new(refresh, QueryService::new(storage), image_path))
    }
}

pub fn country_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/countries",
            get(countries::list_countries).post(countries::create_country),
        )
        .route("/countries/refresh", post(countries::refresh_countries))
        .route("/countries/image", get(countries::summary_image))
        .route(
            "/countries/{name}",
            get(countries::get_country).delete(countries::delete_country),
        )
        .route("/status", get(status::get_status))
        .with_state(state)
}
