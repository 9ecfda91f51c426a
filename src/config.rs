use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

pub const COUNTRY_API_URL: &str =
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies";
pub const EXCHANGE_API_URL: &str = "https://open.er-api.com/v6/latest/USD";
pub const SUMMARY_IMAGE_NAME: &str = "summary.png";

/// Environment keys read by [`Config::from_env`]; matched case-insensitively.
const ENV_KEYS: [&str; 8] = [
    "database_url",
    "country_api_url",
    "exchange_api_url",
    "listen_addr",
    "cache_dir",
    "fetch_timeout_secs",
    "proxy",
    "loglevel",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub database_url: String,
    pub country_api_url: Url,
    pub exchange_api_url: Url,
    pub listen_addr: String,
    pub cache_dir: PathBuf,
    pub fetch_timeout_secs: u64,
    pub proxy: Option<Url>,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:countries.db".to_string(),
            country_api_url: Url::parse(COUNTRY_API_URL).expect("valid default country api url"),
            exchange_api_url: Url::parse(EXCHANGE_API_URL)
                .expect("valid default exchange api url"),
            listen_addr: "0.0.0.0:8000".to_string(),
            cache_dir: PathBuf::from("cache"),
            fetch_timeout_secs: 30,
            proxy: None,
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults overlaid with process environment variables.
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&ENV_KEYS))
            .extract()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    pub fn summary_image_path(&self) -> PathBuf {
        self.cache_dir.join(SUMMARY_IMAGE_NAME)
    }
}

pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().unwrap_or_else(|e| panic!("invalid configuration: {e}"))
});
