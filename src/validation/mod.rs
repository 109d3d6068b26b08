//! Field validation for request payloads
//!
//! A [`Validator`] maps field names to [`Rule`] lists. Every field is
//! checked and every failing rule contributes a message, so callers get a
//! complete report instead of the first error. Rules that need storage
//! (`Unique`, `Exists`) go through [`LookupBackend`] and only run for fields
//! that are otherwise valid.

pub mod rule;

pub use rule::Rule;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::backend::{LookupBackend, LookupValue};
use crate::error::AppResult;

/// Field name to human-readable messages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors holding one message for one field
    pub fn single(field: &str, message: String) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: String) {
        self.0.entry(field.to_string()).or_default().push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// `Ok` when no field failed
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Display name used in messages: `department_id` reads "department id"
pub fn attribute_name(field: &str) -> String {
    field.replace('_', " ")
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    fields: Vec<(&'static str, Vec<Rule>)>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push((name, rules.into_iter().collect()));
        self
    }

    /// Check `input` against every field's rules.
    ///
    /// Storage errors are returned as `Err`; rule failures are collected in
    /// the returned [`ValidationErrors`], empty when the input is valid.
    pub async fn validate<L>(
        &self,
        input: &Map<String, Value>,
        lookup: &L,
    ) -> AppResult<ValidationErrors>
    where
        L: LookupBackend + ?Sized,
    {
        let mut errors = ValidationErrors::new();

        for (field, rules) in &self.fields {
            let attribute = attribute_name(field);
            let required = rules.contains(&Rule::Required);

            let value = match input.get(*field) {
                Some(value) => value,
                None => {
                    if required && !rules.contains(&Rule::Sometimes) {
                        errors.add(field, rule::required_message(&attribute));
                    }
                    continue;
                }
            };

            if value.is_null() && rules.contains(&Rule::Nullable) {
                continue;
            }

            if required && is_blank(value) {
                errors.add(field, rule::required_message(&attribute));
                continue;
            }

            let mut field_failed = false;
            for rule in rules.iter().filter(|rule| !rule.is_lookup()) {
                if let Some(message) = rule.check(&attribute, value) {
                    errors.add(field, message);
                    field_failed = true;
                }
            }

            if field_failed {
                continue;
            }

            for rule in rules.iter().filter(|rule| rule.is_lookup()) {
                if let Some(message) = check_lookup(rule, &attribute, value, lookup).await? {
                    errors.add(field, message);
                }
            }
        }

        Ok(errors)
    }
}

async fn check_lookup<L>(
    rule: &Rule,
    attribute: &str,
    value: &Value,
    lookup: &L,
) -> AppResult<Option<String>>
where
    L: LookupBackend + ?Sized,
{
    let scalar = match value {
        Value::String(text) => Some(LookupValue::Text(text.as_str())),
        Value::Number(number) => number.as_i64().map(LookupValue::Integer),
        _ => None,
    };

    match rule {
        Rule::Unique {
            table,
            column,
            ignore_id,
        } => {
            let Some(scalar) = scalar else {
                return Ok(None);
            };
            if lookup.value_exists(*table, *column, scalar, *ignore_id).await? {
                return Ok(Some(rule::unique_message(attribute)));
            }
            Ok(None)
        }
        Rule::Exists { table, column } => {
            let found = match scalar {
                Some(scalar) => lookup.value_exists(*table, *column, scalar, None).await?,
                None => false,
            };
            if found {
                Ok(None)
            } else {
                Ok(Some(rule::exists_message(attribute)))
            }
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Table;
    use async_trait::async_trait;
    use serde_json::json;

    /// Lookup stub that knows a fixed set of (table, value) pairs
    struct FixedLookup {
        emails: Vec<&'static str>,
        department_ids: Vec<i64>,
    }

    #[async_trait]
    impl LookupBackend for FixedLookup {
        async fn value_exists(
            &self,
            table: Table,
            _column: &'static str,
            value: LookupValue<'_>,
            _ignore_id: Option<i64>,
        ) -> AppResult<bool> {
            Ok(match (table, value) {
                (Table::Users, LookupValue::Text(text)) => self
                    .emails
                    .iter()
                    .any(|email| email.eq_ignore_ascii_case(text)),
                (Table::Departments, LookupValue::Integer(id)) => self.department_ids.contains(&id),
                _ => false,
            })
        }
    }

    fn lookup() -> FixedLookup {
        FixedLookup {
            emails: vec!["taken@example.com"],
            department_ids: vec![1, 2],
        }
    }

    fn as_map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn user_validator() -> Validator {
        Validator::new()
            .field(
                "email",
                [Rule::Required, Rule::Email, Rule::unique(Table::Users, "email")],
            )
            .field("name", [Rule::Required, Rule::String, Rule::Max(255)])
            .field("password", [Rule::Required, Rule::String, Rule::Min(8)])
    }

    #[tokio::test]
    async fn test_valid_input() {
        let input = as_map(json!({
            "email": "new@example.com",
            "name": "New User",
            "password": "password123"
        }));

        let errors = user_validator().validate(&input, &lookup()).await.unwrap();
        assert!(errors.is_empty());
        assert!(errors.into_result().is_ok());
    }

    #[tokio::test]
    async fn test_all_fields_are_reported() {
        let errors = user_validator()
            .validate(&Map::new(), &lookup())
            .await
            .unwrap();

        assert_eq!(errors.get("email").unwrap(), ["The email field is required."]);
        assert_eq!(errors.get("name").unwrap(), ["The name field is required."]);
        assert_eq!(
            errors.get("password").unwrap(),
            ["The password field is required."]
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_names_field() {
        let input = as_map(json!({
            "email": "TAKEN@example.com",
            "name": "Someone",
            "password": "password123"
        }));

        let errors = user_validator().validate(&input, &lookup()).await.unwrap();
        assert_eq!(
            errors.get("email").unwrap(),
            ["The email has already been taken."]
        );
        assert!(!errors.contains("name"));
    }

    #[tokio::test]
    async fn test_blank_string_is_missing() {
        let input = as_map(json!({"email": "  ", "name": "x", "password": "password123"}));

        let errors = user_validator().validate(&input, &lookup()).await.unwrap();
        assert_eq!(errors.get("email").unwrap(), ["The email field is required."]);
    }

    #[tokio::test]
    async fn test_multiple_messages_per_field() {
        let validator = Validator::new().field("name", [Rule::String, Rule::Min(3)]);
        let input = as_map(json!({"name": 1}));

        let errors = validator.validate(&input, &lookup()).await.unwrap();
        // Integer 1 is also below the numeric minimum
        assert_eq!(
            errors.get("name").unwrap(),
            ["The name must be a string.", "The name must be at least 3."]
        );
    }

    #[tokio::test]
    async fn test_sometimes_skips_absent_fields() {
        let validator = Validator::new()
            .field("email", [Rule::Sometimes, Rule::Email])
            .field("name", [Rule::Sometimes, Rule::String, Rule::Max(255)]);

        let errors = validator
            .validate(&as_map(json!({"name": "Only name"})), &lookup())
            .await
            .unwrap();
        assert!(errors.is_empty());

        let errors = validator
            .validate(&as_map(json!({"email": "bad"})), &lookup())
            .await
            .unwrap();
        assert_eq!(
            errors.get("email").unwrap(),
            ["The email must be a valid email address."]
        );
    }

    #[tokio::test]
    async fn test_nullable_accepts_null() {
        let validator =
            Validator::new().field("description", [Rule::Sometimes, Rule::Nullable, Rule::String]);

        let errors = validator
            .validate(&as_map(json!({"description": null})), &lookup())
            .await
            .unwrap();
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_exists_rule() {
        let validator = Validator::new().field(
            "department_id",
            [
                Rule::Required,
                Rule::Integer,
                Rule::exists(Table::Departments, "id"),
            ],
        );

        let ok = validator
            .validate(&as_map(json!({"department_id": 2})), &lookup())
            .await
            .unwrap();
        assert!(ok.is_empty());

        let missing = validator
            .validate(&as_map(json!({"department_id": 99})), &lookup())
            .await
            .unwrap();
        assert_eq!(
            missing.get("department_id").unwrap(),
            ["The selected department id is invalid."]
        );

        // Type errors suppress the lookup
        let wrong_type = validator
            .validate(&as_map(json!({"department_id": "two"})), &lookup())
            .await
            .unwrap();
        assert_eq!(
            wrong_type.get("department_id").unwrap(),
            ["The department id must be an integer."]
        );
    }

    #[test]
    fn test_errors_serialize_as_map() {
        let errors = ValidationErrors::single("zone", "The zone field is required.".to_string());
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({"zone": ["The zone field is required."]})
        );
    }
}
