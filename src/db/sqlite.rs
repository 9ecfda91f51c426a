use crate::db::models::{CountryRecord, DbCountry, DbRefreshMetadata};
use crate::db::schema::SQLITE_INIT;
use crate::error::CountryError;
use crate::types::country::SortKey;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

const COUNTRY_COLUMNS: &str = "id, name, capital, region, population, currency_code, \
     exchange_rate, estimated_gdp, flag_url, last_refreshed_at";

/// Optional case-insensitive exact-match filters, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryFilter {
    pub region: Option<String>,
    pub currency_code: Option<String>,
}

#[derive(Clone)]
pub struct CountryStorage {
    pool: SqlitePool,
}

impl CountryStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `database_url` and bootstrap the schema.
    pub async fn connect(database_url: &str) -> Result<Self, CountryError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), CountryError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Replace the whole row whose name matches case-insensitively, or insert a new one.
    /// The stored name takes the spelling of the latest write.
    pub async fn upsert(&self, record: &CountryRecord) -> Result<DbCountry, CountryError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO countries (
                name, capital, region, population, currency_code,
                exchange_rate, estimated_gdp, flag_url, last_refreshed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                name=excluded.name,
                capital=excluded.capital,
                region=excluded.region,
                population=excluded.population,
                currency_code=excluded.currency_code,
                exchange_rate=excluded.exchange_rate,
                estimated_gdp=excluded.estimated_gdp,
                flag_url=excluded.flag_url,
                last_refreshed_at=excluded.last_refreshed_at
            "#,
        )
        .bind(&record.name)
        .bind(&record.capital)
        .bind(&record.region)
        .bind(record.population)
        .bind(&record.currency_code)
        .bind(record.exchange_rate)
        .bind(record.estimated_gdp)
        .bind(&record.flag_url)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_name(&record.name)
            .await?
            .ok_or_else(|| CountryError::Internal(format!("row for {} vanished", record.name)))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<DbCountry>, CountryError> {
        let sql = format!("SELECT {COUNTRY_COLUMNS} FROM countries WHERE name = ? COLLATE NOCASE");
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_country).transpose()
    }

    pub async fn list(
        &self,
        filter: &CountryFilter,
        sort: Option<SortKey>,
    ) -> Result<Vec<DbCountry>, CountryError> {
        let mut clauses = Vec::new();
        let mut binds: Vec<&str> = Vec::new();
        if let Some(region) = filter.region.as_deref() {
            clauses.push("region = ? COLLATE NOCASE");
            binds.push(region);
        }
        if let Some(code) = filter.currency_code.as_deref() {
            clauses.push("currency_code = ? COLLATE NOCASE");
            binds.push(code);
        }

        let mut sql = format!("SELECT {COUNTRY_COLUMNS} FROM countries");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push(' ');
        sql.push_str(Self::order_clause(sort));

        let mut query = sqlx::query(&sql);
        for value in binds {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_country).collect()
    }

    /// Rows with a known GDP, highest first.
    pub async fn top_by_gdp(&self, limit: i64) -> Result<Vec<DbCountry>, CountryError> {
        let sql = format!(
            "SELECT {COUNTRY_COLUMNS} FROM countries WHERE estimated_gdp IS NOT NULL \
             ORDER BY estimated_gdp DESC, name ASC LIMIT ?"
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_country).collect()
    }

    /// Remove the row matching `name` case-insensitively; returns it if one existed.
    pub async fn delete_by_name(&self, name: &str) -> Result<Option<DbCountry>, CountryError> {
        let Some(country) = self.get_by_name(name).await? else {
            return Ok(None);
        };
        sqlx::query("DELETE FROM countries WHERE id = ?")
            .bind(country.id)
            .execute(&self.pool)
            .await?;
        Ok(Some(country))
    }

    pub async fn count(&self) -> Result<i64, CountryError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM countries")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Read the metadata row, creating it on first access.
    pub async fn metadata(&self) -> Result<DbRefreshMetadata, CountryError> {
        sqlx::query(
            "INSERT OR IGNORE INTO refresh_metadata (id, total_countries, last_refreshed_at) \
             VALUES (1, 0, NULL)",
        )
        .execute(&self.pool)
        .await?;
        let row = sqlx::query(
            "SELECT total_countries, last_refreshed_at FROM refresh_metadata WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Self::row_to_metadata(row)
    }

    /// Overwrite the metadata row; every write stamps the current time.
    pub async fn save_metadata(
        &self,
        total_countries: i64,
    ) -> Result<DbRefreshMetadata, CountryError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO refresh_metadata (id, total_countries, last_refreshed_at)
            VALUES (1, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                total_countries=excluded.total_countries,
                last_refreshed_at=excluded.last_refreshed_at
            "#,
        )
        .bind(total_countries)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(DbRefreshMetadata {
            total_countries,
            last_refreshed_at: Some(now),
        })
    }

    fn order_clause(sort: Option<SortKey>) -> &'static str {
        // NULL GDP sorts as the lowest value in both directions
        match sort {
            Some(SortKey::GdpDesc) => "ORDER BY estimated_gdp DESC, name ASC",
            Some(SortKey::GdpAsc) => "ORDER BY estimated_gdp ASC, name ASC",
            Some(SortKey::PopulationDesc) => "ORDER BY population DESC, name ASC",
            Some(SortKey::PopulationAsc) => "ORDER BY population ASC, name ASC",
            Some(SortKey::NameDesc) => "ORDER BY name DESC",
            Some(SortKey::NameAsc) | None => "ORDER BY name ASC",
        }
    }

    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CountryError> {
        let ts = DateTime::parse_from_rfc3339(raw)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);
        Ok(ts)
    }

    fn row_to_country(row: SqliteRow) -> Result<DbCountry, CountryError> {
        let last_refreshed_at: String = row.try_get("last_refreshed_at")?;
        Ok(DbCountry {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            capital: row.try_get("capital")?,
            region: row.try_get("region")?,
            population: row.try_get("population")?,
            currency_code: row.try_get("currency_code")?,
            exchange_rate: row.try_get("exchange_rate")?,
            estimated_gdp: row.try_get("estimated_gdp")?,
            flag_url: row.try_get("flag_url")?,
            last_refreshed_at: Self::parse_timestamp(&last_refreshed_at)?,
        })
    }

    fn row_to_metadata(row: SqliteRow) -> Result<DbRefreshMetadata, CountryError> {
        let total_countries: i64 = row.try_get("total_countries")?;
        let raw_ts: Option<String> = row.try_get("last_refreshed_at")?;
        let last_refreshed_at = raw_ts.as_deref().map(Self::parse_timestamp).transpose()?;
        Ok(DbRefreshMetadata {
            total_countries,
            last_refreshed_at,
        })
    }
}
