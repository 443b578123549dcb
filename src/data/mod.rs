//! Core data models for the employee facade
//!
//! This module contains the employee record as the upstream API ships it,
//! the create-request input, and the integrity error raised when a record's
//! numeric fields cannot be used for ranking.

pub mod client;
pub mod normalize;

pub use client::{Upstream, UpstreamClient, UpstreamError};
pub use normalize::{Envelope, Failure, FailureKind, Outcome};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A single employee record
///
/// Numeric fields stay in their wire string form. Parsing happens at the
/// point of numeric use (see [`Employee::salary_value`]) so a malformed
/// value is reported instead of silently becoming zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Employee {
    /// Identifier assigned by the upstream API
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Display name
    #[serde(rename = "employee_name")]
    pub name: String,
    /// Salary, a base-10 non-negative integer in string form
    #[serde(rename = "employee_salary", deserialize_with = "string_or_number")]
    pub salary: String,
    /// Age, a base-10 integer in string form
    #[serde(rename = "employee_age", deserialize_with = "string_or_number")]
    pub age: String,
    /// Profile image URL, empty when the upstream omits it
    #[serde(
        rename = "profile_image",
        default,
        deserialize_with = "optional_string"
    )]
    pub profile_image: String,
}

/// Raised when a record's numeric field fails to parse during a derived view
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Employee {id} has a non-numeric {field}: '{value}'")]
pub struct IntegrityError {
    pub id: String,
    pub field: &'static str,
    pub value: String,
}

impl Employee {
    /// Parses the salary as a base-10 non-negative integer
    pub fn salary_value(&self) -> Result<u64, IntegrityError> {
        self.salary.trim().parse().map_err(|_| IntegrityError {
            id: self.id.clone(),
            field: "salary",
            value: self.salary.clone(),
        })
    }
}

/// Errors raised while validating create input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Employee name must not be empty")]
    EmptyName,

    #[error("Employee {0} must be a whole number, got '{1}'")]
    NotANumber(&'static str, String),
}

/// Fields accepted when creating an employee
///
/// Serializes to the form-urlencoded body the upstream create endpoint expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub name: String,
    pub salary: String,
    pub age: String,
}

impl NewEmployee {
    pub fn new(
        name: impl Into<String>,
        salary: impl Into<String>,
        age: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            salary: salary.into(),
            age: age.into(),
        }
    }

    /// Checks the input before it is sent upstream
    pub fn validate(&self) -> Result<(), InputError> {
        if self.name.trim().is_empty() {
            return Err(InputError::EmptyName);
        }
        if self.salary.trim().parse::<u64>().is_err() {
            return Err(InputError::NotANumber("salary", self.salary.clone()));
        }
        if self.age.trim().parse::<u32>().is_err() {
            return Err(InputError::NotANumber("age", self.age.clone()));
        }
        Ok(())
    }
}

/// Accepts a JSON string or number and keeps its decimal string form
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    scalar_to_string(&value).ok_or_else(|| {
        serde::de::Error::custom(format!("expected a string or number, got {}", value))
    })
}

fn optional_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(String::new()),
        Some(v) => scalar_to_string(&v).ok_or_else(|| {
            serde::de::Error::custom(format!("expected a string, got {}", v))
        }),
    }
}

/// String form of a JSON scalar; `None` for arrays, objects, booleans and null
pub(crate) fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_from_string_fields() {
        let json = r#"{
            "id": "7",
            "employee_name": "John Doe",
            "employee_salary": "50000",
            "employee_age": "30",
            "profile_image": "https://img/7.png"
        }"#;

        let employee: Employee = serde_json::from_str(json).expect("Should parse");

        assert_eq!(employee.id, "7");
        assert_eq!(employee.name, "John Doe");
        assert_eq!(employee.salary, "50000");
        assert_eq!(employee.age, "30");
        assert_eq!(employee.profile_image, "https://img/7.png");
    }

    #[test]
    fn test_employee_from_numeric_fields() {
        let json = r#"{
            "id": 1,
            "employee_name": "Tiger Nixon",
            "employee_salary": 320800,
            "employee_age": 61,
            "profile_image": ""
        }"#;

        let employee: Employee = serde_json::from_str(json).expect("Should parse");

        assert_eq!(employee.id, "1");
        assert_eq!(employee.salary, "320800");
        assert_eq!(employee.age, "61");
    }

    #[test]
    fn test_missing_or_null_profile_image_defaults_to_empty() {
        let missing = r#"{"id":"1","employee_name":"A","employee_salary":"1","employee_age":"2"}"#;
        let null = r#"{"id":"1","employee_name":"A","employee_salary":"1","employee_age":"2","profile_image":null}"#;

        let a: Employee = serde_json::from_str(missing).expect("Should parse");
        let b: Employee = serde_json::from_str(null).expect("Should parse");

        assert_eq!(a.profile_image, "");
        assert_eq!(b.profile_image, "");
    }

    #[test]
    fn test_salary_as_object_is_rejected() {
        let json = r#"{"id":"1","employee_name":"A","employee_salary":{"x":1},"employee_age":"2"}"#;
        assert!(serde_json::from_str::<Employee>(json).is_err());
    }

    #[test]
    fn test_serializes_with_upstream_field_names() {
        let employee = Employee {
            id: "9".to_string(),
            name: "Ann".to_string(),
            salary: "70000".to_string(),
            age: "28".to_string(),
            profile_image: String::new(),
        };

        let value = serde_json::to_value(&employee).unwrap();

        assert_eq!(value["employee_name"], "Ann");
        assert_eq!(value["employee_salary"], "70000");
        assert_eq!(value["employee_age"], "28");
        assert_eq!(value["profile_image"], "");
    }

    #[test]
    fn test_salary_value_parses_integer() {
        let employee = Employee {
            salary: "60000".to_string(),
            ..Default::default()
        };
        assert_eq!(employee.salary_value(), Ok(60000));
    }

    #[test]
    fn test_salary_value_rejects_garbage() {
        let employee = Employee {
            id: "3".to_string(),
            salary: "sixty".to_string(),
            ..Default::default()
        };

        let err = employee.salary_value().unwrap_err();

        assert_eq!(err.id, "3");
        assert_eq!(err.field, "salary");
        assert!(err.to_string().contains("sixty"));
    }

    #[test]
    fn test_salary_value_rejects_negative() {
        let employee = Employee {
            salary: "-5".to_string(),
            ..Default::default()
        };
        assert!(employee.salary_value().is_err());
    }

    #[test]
    fn test_new_employee_validation() {
        assert!(NewEmployee::new("Ann", "70000", "28").validate().is_ok());
        assert_eq!(
            NewEmployee::new("  ", "70000", "28").validate(),
            Err(InputError::EmptyName)
        );
        assert_eq!(
            NewEmployee::new("Ann", "lots", "28").validate(),
            Err(InputError::NotANumber("salary", "lots".to_string()))
        );
        assert!(NewEmployee::new("Ann", "70000", "old").validate().is_err());
    }

    #[test]
    fn test_new_employee_form_encoding_fields() {
        let value = serde_json::to_value(NewEmployee::new("Ann", "70000", "28")).unwrap();
        assert_eq!(value["name"], "Ann");
        assert_eq!(value["salary"], "70000");
        assert_eq!(value["age"], "28");
    }
}
