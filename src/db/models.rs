use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One cached country row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbCountry {
    pub id: i64,
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
}

/// Full replacement payload for an upsert; `id` and the timestamp are owned by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRecord {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
}

/// The singleton `refresh_metadata` row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbRefreshMetadata {
    pub total_countries: i64,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}
