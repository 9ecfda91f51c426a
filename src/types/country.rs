use crate::db::sqlite::CountryFilter;
use crate::error::CountryError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accepted `sort` query values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    GdpDesc,
    GdpAsc,
    PopulationDesc,
    PopulationAsc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    /// Unknown values yield `None` and fall back to the default order.
    pub fn from_param(raw: &str) -> Option<Self> {
        match raw {
            "gdp_desc" => Some(Self::GdpDesc),
            "gdp_asc" => Some(Self::GdpAsc),
            "population_desc" => Some(Self::PopulationDesc),
            "population_asc" => Some(Self::PopulationAsc),
            "name_asc" => Some(Self::NameAsc),
            "name_desc" => Some(Self::NameDesc),
            _ => None,
        }
    }
}

/// `GET /countries` query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryListParams {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<String>,
}

impl CountryListParams {
    pub fn filter(&self) -> CountryFilter {
        CountryFilter {
            region: non_blank(self.region.as_deref()),
            currency_code: non_blank(self.currency.as_deref()),
        }
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort.as_deref().and_then(SortKey::from_param)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Body of `POST /countries`. Server-owned fields (`id`, `estimated_gdp`,
/// `last_refreshed_at`) are not part of the struct and are dropped on deserialize.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryInput {
    pub name: Option<String>,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: Option<i64>,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub flag_url: Option<String>,
}

/// A `CountryInput` whose required fields are present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidCountryInput {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: String,
    pub exchange_rate: Option<f64>,
    pub flag_url: Option<String>,
}

impl CountryInput {
    pub fn validate(self) -> Result<ValidCountryInput, CountryError> {
        let mut errors = BTreeMap::new();

        let name = non_blank(self.name.as_deref());
        if name.is_none() {
            errors.insert("name".to_string(), "is required".to_string());
        }
        match self.population {
            None => {
                errors.insert("population".to_string(), "is required".to_string());
            }
            Some(p) if p < 0 => {
                errors.insert(
                    "population".to_string(),
                    "must be a non-negative integer".to_string(),
                );
            }
            Some(_) => {}
        }
        let currency_code = non_blank(self.currency_code.as_deref());
        if currency_code.is_none() {
            errors.insert("currency_code".to_string(), "is required".to_string());
        }

        match (name, self.population, currency_code) {
            (Some(name), Some(population), Some(currency_code)) if errors.is_empty() => {
                Ok(ValidCountryInput {
                    name,
                    capital: self.capital,
                    region: self.region,
                    population,
                    currency_code,
                    exchange_rate: self.exchange_rate,
                    flag_url: self.flag_url,
                })
            }
            _ => Err(CountryError::Validation(errors)),
        }
    }
}

/// Response of a successful refresh cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshSummary {
    pub message: String,
    pub total_countries: i64,
    pub last_refreshed_at: DateTime<Utc>,
}

/// `GET /status` body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusView {
    pub total_countries: i64,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageBody {
    pub message: String,
}
