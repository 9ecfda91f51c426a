//! SQL DDL for initializing the country cache.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `countries.name` UNIQUE with NOCASE collation, so upserts and lookups ignore ASCII case
/// - REAL columns for exchange rate and estimated GDP
/// - `refresh_metadata` restricted to the single row `id = 1`
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS countries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    capital TEXT NULL,
    region TEXT NULL,
    population INTEGER NOT NULL,
    currency_code TEXT NULL,
    exchange_rate REAL NULL,
    estimated_gdp REAL NULL,
    flag_url TEXT NULL,
    last_refreshed_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_countries_region ON countries(region COLLATE NOCASE);

CREATE INDEX IF NOT EXISTS idx_countries_currency_code ON countries(currency_code COLLATE NOCASE);

CREATE TABLE IF NOT EXISTS refresh_metadata (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    total_countries INTEGER NOT NULL DEFAULT 0,
    last_refreshed_at TEXT NULL -- RFC3339, NULL until first touch
);
"#;
