use serde_json::{Map, Value};
use std::sync::Arc;

use super::{decode, ensure_valid, ServiceError, ServiceResult};
use crate::backend::{DirectoryBackend, Page, PageRequest};
use crate::models::{Location, LocationChanges, NewLocation};
use crate::validation::{Rule, Validator};

const FIELDS: [&str; 3] = ["location", "zone", "state"];

pub struct LocationService {
    backend: Arc<dyn DirectoryBackend>,
}

impl LocationService {
    pub fn new(backend: Arc<dyn DirectoryBackend>) -> Self {
        Self { backend }
    }

    fn rules(partial: bool) -> Validator {
        FIELDS.into_iter().fold(Validator::new(), |validator, field| {
            let mut rules = vec![Rule::Required, Rule::String, Rule::Max(255)];
            if partial {
                rules.insert(0, Rule::Sometimes);
            }
            validator.field(field, rules)
        })
    }

    pub async fn create(&self, input: Map<String, Value>) -> ServiceResult<Location> {
        let errors = Self::rules(false)
            .validate(&input, self.backend.as_ref())
            .await?;
        ensure_valid(errors)?;

        let location: NewLocation = decode(input)?;
        Ok(self.backend.create_location(&location).await?)
    }

    pub async fn update_location(
        &self,
        id: i64,
        input: Map<String, Value>,
    ) -> ServiceResult<Location> {
        let errors = Self::rules(true)
            .validate(&input, self.backend.as_ref())
            .await?;
        ensure_valid(errors)?;

        let changes: LocationChanges = decode(input)?;
        self.backend
            .update_location(id, &changes)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn get_location(&self, id: i64) -> ServiceResult<Location> {
        self.backend
            .find_location_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Location>> {
        Ok(self.backend.find_all_locations().await?)
    }

    pub async fn get_page(&self, page: PageRequest) -> ServiceResult<Page<Location>> {
        let (items, total) = self.backend.find_locations_page(page).await?;
        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if self.backend.delete_location(id).await? {
            tracing::info!(location_id = id, "Deleted location");
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{input, memory_backend};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_reports_every_missing_field() {
        let service = LocationService::new(memory_backend().await);

        let result = service.create(input(json!({"zone": "North"}))).await;
        match result {
            Err(ServiceError::Validation(errors)) => {
                assert!(errors.contains("location"));
                assert!(errors.contains("state"));
                assert!(!errors.contains("zone"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_partial_update() {
        let service = LocationService::new(memory_backend().await);
        let location = service
            .create(input(json!({"location": "HQ", "zone": "North", "state": "Lagos"})))
            .await
            .unwrap();

        let updated = service
            .update_location(location.id, input(json!({"zone": "South"})))
            .await
            .unwrap();
        assert_eq!(updated.zone, "South");
        assert_eq!(updated.location, "HQ");
        assert_eq!(updated.state, "Lagos");

        let invalid = service
            .update_location(location.id, input(json!({"state": 7})))
            .await;
        assert!(matches!(invalid, Err(ServiceError::Validation(e)) if e.contains("state")));
    }

    #[tokio::test]
    async fn test_missing_location() {
        let service = LocationService::new(memory_backend().await);

        assert!(matches!(
            service.get_location(999).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(service.delete(999).await, Err(ServiceError::NotFound)));
        assert!(matches!(
            service
                .update_location(999, input(json!({"zone": "East"})))
                .await,
            Err(ServiceError::NotFound)
        ));
    }
}
