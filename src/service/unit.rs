use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::{decode, ensure_valid, ServiceError, ServiceResult};
use crate::backend::{DirectoryBackend, Page, PageRequest, Table};
use crate::models::{NewUnit, Unit, UnitChanges};
use crate::validation::{Rule, Validator};

pub struct UnitService {
    backend: Arc<dyn DirectoryBackend>,
}

impl UnitService {
    pub fn new(backend: Arc<dyn DirectoryBackend>) -> Self {
        Self { backend }
    }

    pub async fn create(&self, input: Map<String, Value>) -> ServiceResult<Unit> {
        let errors = Validator::new()
            .field("name", [Rule::Required, Rule::String, Rule::Max(255)])
            .field(
                "department_id",
                [
                    Rule::Required,
                    Rule::Integer,
                    Rule::exists(Table::Departments, "id"),
                ],
            )
            .validate(&input, self.backend.as_ref())
            .await?;
        ensure_valid(errors)?;

        let unit: NewUnit = decode(input)?;
        Ok(self.backend.create_unit(&unit).await?)
    }

    pub async fn update(&self, id: i64, input: Map<String, Value>) -> ServiceResult<Unit> {
        let errors = Validator::new()
            .field(
                "name",
                [Rule::Sometimes, Rule::Required, Rule::String, Rule::Max(255)],
            )
            .field(
                "department_id",
                [
                    Rule::Sometimes,
                    Rule::Required,
                    Rule::Integer,
                    Rule::exists(Table::Departments, "id"),
                ],
            )
            .validate(&input, self.backend.as_ref())
            .await?;
        ensure_valid(errors)?;

        let changes: UnitChanges = decode(input)?;
        self.backend
            .update_unit(id, &changes)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn get_unit(&self, id: i64) -> ServiceResult<Unit> {
        self.backend
            .find_unit_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Unit>> {
        Ok(self.backend.find_all_units().await?)
    }

    pub async fn get_page(&self, page: PageRequest) -> ServiceResult<Page<Unit>> {
        let (items, total) = self.backend.find_units_page(page).await?;
        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Units of one department. An unknown department is a validation
    /// failure on `department_id`; a department without units yields `[]`.
    pub async fn get_units_in_department(&self, department_id: Value) -> ServiceResult<Vec<Unit>> {
        let input = json!({ "department_id": department_id });
        let input = input.as_object().cloned().unwrap_or_default();

        let errors = Validator::new()
            .field(
                "department_id",
                [
                    Rule::Required,
                    Rule::Integer,
                    Rule::exists(Table::Departments, "id"),
                ],
            )
            .validate(&input, self.backend.as_ref())
            .await?;
        ensure_valid(errors)?;

        let Some(department_id) = input.get("department_id").and_then(Value::as_i64) else {
            return Err(ServiceError::NotFound);
        };

        Ok(self.backend.find_units_by_department_id(department_id).await?)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if self.backend.delete_unit(id).await? {
            tracing::info!(unit_id = id, "Deleted unit");
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }
}
