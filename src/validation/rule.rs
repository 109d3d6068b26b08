use email_address::EmailAddress;
use serde_json::Value;

use crate::backend::Table;

/// A single constraint applied to one input field
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// The field must be present and not blank
    Required,
    /// Rules only apply when the field is present
    Sometimes,
    /// `null` is accepted and skips the remaining rules
    Nullable,
    String,
    Email,
    Integer,
    /// Minimum characters for strings, minimum value for integers
    Min(usize),
    /// Maximum characters for strings, maximum value for integers
    Max(usize),
    /// No other row of `table` holds the value in `column`
    Unique {
        table: Table,
        column: &'static str,
        ignore_id: Option<i64>,
    },
    /// Some row of `table` holds the value in `column`
    Exists { table: Table, column: &'static str },
}

impl Rule {
    pub fn unique(table: Table, column: &'static str) -> Self {
        Rule::Unique {
            table,
            column,
            ignore_id: None,
        }
    }

    /// Uniqueness check that skips the row being updated
    pub fn unique_except(table: Table, column: &'static str, id: i64) -> Self {
        Rule::Unique {
            table,
            column,
            ignore_id: Some(id),
        }
    }

    pub fn exists(table: Table, column: &'static str) -> Self {
        Rule::Exists { table, column }
    }

    /// Whether the rule needs a storage lookup
    pub fn is_lookup(&self) -> bool {
        matches!(self, Rule::Unique { .. } | Rule::Exists { .. })
    }

    /// Check a rule that can be decided from the value alone.
    /// Returns the failure message, if any. Lookup and presence rules always pass here.
    pub fn check(&self, attribute: &str, value: &Value) -> Option<String> {
        match self {
            Rule::String if !value.is_string() => {
                Some(format!("The {} must be a string.", attribute))
            }
            Rule::Email => match value.as_str() {
                Some(text) if EmailAddress::is_valid(text) => None,
                _ => Some(format!("The {} must be a valid email address.", attribute)),
            },
            Rule::Integer if value.as_i64().is_none() => {
                Some(format!("The {} must be an integer.", attribute))
            }
            Rule::Min(min) => match value {
                Value::String(text) if text.chars().count() < *min => Some(format!(
                    "The {} must be at least {} characters.",
                    attribute, min
                )),
                Value::Number(number) if number.as_i64().is_some_and(|n| n < *min as i64) => {
                    Some(format!("The {} must be at least {}.", attribute, min))
                }
                _ => None,
            },
            Rule::Max(max) => match value {
                Value::String(text) if text.chars().count() > *max => Some(format!(
                    "The {} must not be greater than {} characters.",
                    attribute, max
                )),
                Value::Number(number) if number.as_i64().is_some_and(|n| n > *max as i64) => {
                    Some(format!("The {} must not be greater than {}.", attribute, max))
                }
                _ => None,
            },
            _ => None,
        }
    }
}

/// Message for a failed `Required` rule
pub fn required_message(attribute: &str) -> String {
    format!("The {} field is required.", attribute)
}

pub fn unique_message(attribute: &str) -> String {
    format!("The {} has already been taken.", attribute)
}

pub fn exists_message(attribute: &str) -> String {
    format!("The selected {} is invalid.", attribute)
}
