use serde::Deserialize;
use std::collections::HashMap;

/// One element of the country source's array payload (restcountries v2 field names).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UpstreamCountry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub population: Option<i64>,
    #[serde(default)]
    pub flag: Option<String>,
    #[serde(default)]
    pub currencies: Option<Vec<UpstreamCurrency>>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct UpstreamCurrency {
    #[serde(default)]
    pub code: Option<String>,
}

/// Exchange-rate payload; only `rates` matters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExchangeRatesPayload {
    #[serde(default)]
    pub base_code: Option<String>,
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

impl UpstreamCountry {
    pub fn currencies(&self) -> &[UpstreamCurrency] {
        self.currencies.as_deref().unwrap_or_default()
    }

    /// Code of the first listed currency, if the entry carries one.
    pub fn primary_currency_code(&self) -> Option<&str> {
        self.currencies()
            .first()
            .and_then(|c| c.code.as_deref())
            .filter(|code| !code.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_restcountries_shape() {
        let raw = r#"[
            {"name":"Nigeria","capital":"Abuja","region":"Africa","population":206139587,
             "flag":"https://flagcdn.com/ng.svg",
             "currencies":[{"code":"NGN","name":"Nigerian naira","symbol":"₦"}],
             "independent":true},
            {"name":"Antarctica","region":"Polar","population":1000}
        ]"#;
        let countries: Vec<UpstreamCountry> = serde_json::from_str(raw).unwrap();
        assert_eq!(countries[0].primary_currency_code(), Some("NGN"));
        assert_eq!(countries[0].population, Some(206139587));
        assert!(countries[1].currencies().is_empty());
        assert_eq!(countries[1].primary_currency_code(), None);
    }

    #[test]
    fn currency_without_code_is_still_a_currency() {
        let raw = r#"{"name":"X","population":1,"currencies":[{"name":"Mystery"}]}"#;
        let country: UpstreamCountry = serde_json::from_str(raw).unwrap();
        assert_eq!(country.currencies().len(), 1);
        assert_eq!(country.primary_currency_code(), None);
    }

    #[test]
    fn rates_default_to_empty() {
        let payload: ExchangeRatesPayload =
            serde_json::from_str(r#"{"result":"error"}"#).unwrap();
        assert!(payload.rates.is_empty());

        let payload: ExchangeRatesPayload = serde_json::from_str(
            r#"{"result":"success","base_code":"USD","rates":{"USD":1,"NGN":1600.5}}"#,
        )
        .unwrap();
        assert_eq!(payload.base_code.as_deref(), Some("USD"));
        assert_eq!(payload.rates.get("NGN"), Some(&1600.5));
    }
}
