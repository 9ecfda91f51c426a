pub mod sources;

pub use sources::{CountrySource, ExchangeRateClient, RateSource, RestCountriesClient};
