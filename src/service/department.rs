use serde_json::{Map, Value};
use std::sync::Arc;

use super::{decode, ensure_valid, ServiceError, ServiceResult};
use crate::backend::{DirectoryBackend, Page, PageRequest, Table};
use crate::error::AppError;
use crate::models::{Department, DepartmentChanges, NewDepartment};
use crate::validation::{rule, Rule, ValidationErrors, Validator};

pub struct DepartmentService {
    backend: Arc<dyn DirectoryBackend>,
}

impl DepartmentService {
    pub fn new(backend: Arc<dyn DirectoryBackend>) -> Self {
        Self { backend }
    }

    pub async fn create(&self, input: Map<String, Value>) -> ServiceResult<Department> {
        let errors = Validator::new()
            .field(
                "name",
                [
                    Rule::Required,
                    Rule::String,
                    Rule::Max(255),
                    Rule::unique(Table::Departments, "name"),
                ],
            )
            .field(
                "description",
                [Rule::Sometimes, Rule::Nullable, Rule::String, Rule::Max(1000)],
            )
            .validate(&input, self.backend.as_ref())
            .await?;
        ensure_valid(errors)?;

        let department: NewDepartment = decode(input)?;
        self.backend
            .create_department(&department)
            .await
            .map_err(name_taken)
    }

    /// Apply the supplied fields; an explicit `null` description clears it
    pub async fn update(&self, id: i64, input: Map<String, Value>) -> ServiceResult<Department> {
        let errors = Validator::new()
            .field(
                "name",
                [
                    Rule::Sometimes,
                    Rule::Required,
                    Rule::String,
                    Rule::Max(255),
                    Rule::unique_except(Table::Departments, "name", id),
                ],
            )
            .field(
                "description",
                [Rule::Sometimes, Rule::Nullable, Rule::String, Rule::Max(1000)],
            )
            .validate(&input, self.backend.as_ref())
            .await?;
        ensure_valid(errors)?;

        let changes: DepartmentChanges = decode(input)?;
        self.backend
            .update_department(id, &changes)
            .await
            .map_err(name_taken)?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn get_department(&self, id: i64) -> ServiceResult<Department> {
        self.backend
            .find_department_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<Department>> {
        Ok(self.backend.find_all_departments().await?)
    }

    pub async fn get_page(&self, page: PageRequest) -> ServiceResult<Page<Department>> {
        let (items, total) = self.backend.find_departments_page(page).await?;
        Ok(Page {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Members are detached and units removed along with the department
    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if self.backend.delete_department(id).await? {
            tracing::info!(department_id = id, "Deleted department");
            Ok(())
        } else {
            Err(ServiceError::NotFound)
        }
    }
}

fn name_taken(err: AppError) -> ServiceError {
    match err {
        AppError::UniqueViolation(_) => ServiceError::Validation(ValidationErrors::single(
            "name",
            rule::unique_message("name"),
        )),
        other => ServiceError::Backend(other),
    }
}
