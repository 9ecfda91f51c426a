use crate::db::models::DbCountry;
use crate::db::sqlite::{CountryFilter, CountryStorage};
use crate::error::CountryError;
use crate::types::country::{SortKey, StatusView};
use tracing::info;

/// Read side of the cache plus single-country deletion.
#[derive(Clone)]
pub struct QueryService {
    storage: CountryStorage,
}

impl QueryService {
    pub fn new(storage: CountryStorage) -> Self {
        Self { storage }
    }

    pub async fn list(
        &self,
        filter: &CountryFilter,
        sort: Option<SortKey>,
    ) -> Result<Vec<DbCountry>, CountryError> {
        self.storage.list(filter, sort).await
    }

    pub async fn get_by_name(&self, name: &str) -> Result<DbCountry, CountryError> {
        self.storage
            .get_by_name(name)
            .await?
            .ok_or(CountryError::NotFound)
    }

    /// Delete one country and recount metadata from the actual row count.
    /// Returns the stored spelling of the deleted name.
    pub async fn delete_by_name(&self, name: &str) -> Result<String, CountryError> {
        let removed = self
            .storage
            .delete_by_name(name)
            .await?
            .ok_or(CountryError::NotFound)?;
        let remaining = self.storage.count().await?;
        self.storage.save_metadata(remaining).await?;
        info!(name = %removed.name, remaining, "country deleted");
        Ok(removed.name)
    }

    /// Metadata, with `total_countries` overwritten by the real row count when they disagree.
    pub async fn status(&self) -> Result<StatusView, CountryError> {
        let mut metadata = self.storage.metadata().await?;
        let actual = self.storage.count().await?;
        if metadata.total_countries != actual {
            info!(
                stored = metadata.total_countries,
                actual, "status count out of sync; correcting"
            );
            metadata = self.storage.save_metadata(actual).await?;
        }
        Ok(StatusView {
            total_countries: metadata.total_countries,
            last_refreshed_at: metadata.last_refreshed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::CountryRecord;
    use tempfile::TempDir;

    async fn seeded() -> (TempDir, CountryStorage, QueryService) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite:{}", dir.path().join("db.sqlite").display());
        let storage = CountryStorage::connect(&url).await.unwrap();
        for (name, region, code, gdp) in [
            ("Nigeria", "Africa", "NGN", Some(50.0)),
            ("Ghana", "Africa", "GHS", None),
            ("Kenya", "Africa", "KES", Some(20.0)),
            ("France", "Europe", "EUR", Some(90.0)),
        ] {
            storage
                .upsert(&CountryRecord {
                    name: name.into(),
                    capital: None,
                    region: Some(region.into()),
                    population: 1,
                    currency_code: Some(code.into()),
                    exchange_rate: Some(1.0),
                    estimated_gdp: gdp,
                    flag_url: None,
                })
                .await
                .unwrap();
        }
        let svc = QueryService::new(storage.clone());
        (dir, storage, svc)
    }

    #[tokio::test]
    async fn get_by_name_ignores_case() {
        let (_dir, _storage, svc) = seeded().await;
        let a = svc.get_by_name("nigeria").await.unwrap();
        let b = svc.get_by_name("Nigeria").await.unwrap();
        assert_eq!(a, b);
        assert!(matches!(
            svc.get_by_name("Wakanda").await,
            Err(CountryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn gdp_desc_is_non_increasing_with_nulls_last() {
        let (_dir, _storage, svc) = seeded().await;
        let rows = svc
            .list(&CountryFilter::default(), Some(SortKey::GdpDesc))
            .await
            .unwrap();
        let gdps: Vec<_> = rows.iter().map(|c| c.estimated_gdp).collect();
        assert_eq!(gdps, vec![Some(90.0), Some(50.0), Some(20.0), None]);
    }

    #[tokio::test]
    async fn region_filter_with_default_order() {
        let (_dir, _storage, svc) = seeded().await;
        let filter = CountryFilter {
            region: Some("AFRICA".into()),
            currency_code: None,
        };
        let names: Vec<_> = svc
            .list(&filter, None)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Ghana", "Kenya", "Nigeria"]);
    }

    #[tokio::test]
    async fn delete_recounts_from_store() {
        let (_dir, storage, svc) = seeded().await;
        storage.save_metadata(250).await.unwrap();

        let removed = svc.delete_by_name("kenya").await.unwrap();
        assert_eq!(removed, "Kenya");
        assert_eq!(svc.status().await.unwrap().total_countries, 3);
        assert_eq!(storage.metadata().await.unwrap().total_countries, 3);
        assert!(matches!(
            svc.get_by_name("Kenya").await,
            Err(CountryError::NotFound)
        ));
        assert!(matches!(
            svc.delete_by_name("Kenya").await,
            Err(CountryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn status_self_heals_count() {
        let (_dir, storage, svc) = seeded().await;
        assert_eq!(storage.metadata().await.unwrap().total_countries, 0);

        let status = svc.status().await.unwrap();
        assert_eq!(status.total_countries, 4);
        assert!(status.last_refreshed_at.is_some());
        assert_eq!(storage.metadata().await.unwrap().total_countries, 4);
    }
}
