//! Response normalization
//!
//! Turns every upstream outcome, successful or not, into one [`Envelope`].
//! All knowledge about the upstream's inconsistent body shapes lives here:
//! the logical `status` marker, optional `data`, the loose object returned
//! by create, and the multi-record answer to a by-id lookup.
//!
//! The service then lifts an envelope into an [`Outcome`], the typed
//! per-operation result handed to consumers.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::client::{EmployeesBody, Upstream, UpstreamError};
use super::{scalar_to_string, Employee};

/// Logical status the upstream puts in successful bodies
pub const SUCCESS: &str = "success";

/// Message for any failure whose detail must stay internal
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub const INVALID_STATUS_MESSAGE: &str = "Invalid response status";
pub const MULTIPLE_RECORDS_MESSAGE: &str = "More than one employee found with ID";
pub const CREATED_MESSAGE: &str = "Employee created successfully";
pub const CREATE_FAILED_MESSAGE: &str = "Failed to create a new employee or process the response";

/// How an operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Nothing to return; the data set or the match set is empty
    NotFound,
    /// Caller input rejected before any upstream call
    InvalidInput,
    /// Upstream answered with a non-success HTTP status, mirrored to the caller
    Upstream,
    /// Upstream answered 2xx but the body broke its own contract
    Shape,
    /// Network, timeout or decode failure
    Transport,
    /// A record's numeric field failed to parse during a derived view
    DataIntegrity,
}

/// A classified failure with the status and message shown to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub status: u16,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, 404, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidInput, 400, message)
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::new(FailureKind::Upstream, status, message)
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Shape, 500, message)
    }

    pub fn transport() -> Self {
        Self::new(FailureKind::Transport, 500, INTERNAL_ERROR_MESSAGE)
    }

    pub fn data_integrity() -> Self {
        Self::new(
            FailureKind::DataIntegrity,
            500,
            "Employee data failed numeric validation",
        )
    }
}

/// Canonical result of an upstream call: status code, records and message
///
/// An empty `employees` list is never a stand-in for "absent"; the status
/// code and failure kind carry the meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    pub employees: Vec<Employee>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

impl Envelope {
    pub fn success(status_code: u16, employees: Vec<Employee>, message: Option<String>) -> Self {
        Self {
            status_code,
            employees,
            message,
            failure: None,
        }
    }

    pub fn failed(failure: Failure) -> Self {
        Self {
            status_code: failure.status,
            employees: Vec::new(),
            message: Some(failure.message),
            failure: Some(failure.kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Splits the envelope into its records and message, or its failure
    pub fn into_result(self) -> Result<(Vec<Employee>, Option<String>), Failure> {
        match self.failure {
            None => Ok((self.employees, self.message)),
            Some(kind) => Err(Failure::new(
                kind,
                self.status_code,
                self.message.unwrap_or_default(),
            )),
        }
    }
}

/// Typed result of one facade operation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A list of records (list, search)
    Employees(Vec<Employee>),
    /// A single record (get by id)
    Employee(Employee),
    /// A newly created record
    Created(Employee),
    /// A single number (highest salary)
    Scalar(u64),
    /// An ordered list of names (top earners)
    Names(Vec<String>),
    /// Confirmation text for a deletion
    Deleted(String),
    Failure(Failure),
}

impl Outcome {
    /// HTTP-style status code for this outcome
    pub fn status_code(&self) -> u16 {
        match self {
            Outcome::Created(_) => 201,
            Outcome::Failure(failure) => failure.status,
            _ => 200,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Failure(_))
    }

    /// JSON body an HTTP layer would send for this outcome
    pub fn body(&self) -> Value {
        match self {
            Outcome::Employees(employees) => json!(employees),
            Outcome::Employee(employee) | Outcome::Created(employee) => json!(employee),
            Outcome::Scalar(value) => json!(value),
            Outcome::Names(names) => json!(names),
            Outcome::Deleted(message) => json!(message),
            Outcome::Failure(failure) => json!({ "error": failure.message }),
        }
    }
}

impl From<Failure> for Outcome {
    fn from(failure: Failure) -> Self {
        Outcome::Failure(failure)
    }
}

/// What a client call hands to the normalizer
pub type Fetched<T> = Result<Upstream<T>, UpstreamError>;

/// Normalizes the full-list response
pub fn normalize_list(fetched: Fetched<EmployeesBody>) -> Envelope {
    match fetched {
        Ok(response) if response.status == 200 => {
            if is_success_marker(response.body.status.as_deref()) {
                Envelope::success(200, response.body.data.unwrap_or_default(), None)
            } else {
                tracing::warn!(
                    status = ?response.body.status,
                    "List response reported a non-success status"
                );
                Envelope::failed(Failure::shape(INVALID_STATUS_MESSAGE))
            }
        }
        Ok(response) => Envelope::failed(Failure::upstream(response.status, response.reason)),
        Err(err) => classify_error(err, "listing employees"),
    }
}

/// Normalizes a by-id response
///
/// Exactly one record is a success. Any other 200 answer is an integrity
/// violation reported as 500, never as 404; a 404 only comes from the
/// upstream's own status.
pub fn normalize_by_id(id: &str, fetched: Fetched<EmployeesBody>) -> Envelope {
    match fetched {
        Ok(response) if response.status == 200 => {
            let body = response.body;
            if !is_success_marker(body.status.as_deref()) {
                tracing::warn!(
                    id,
                    status = ?body.status,
                    "By-id response reported a non-success status"
                );
                return Envelope::failed(Failure::shape(INVALID_STATUS_MESSAGE));
            }
            match body.data {
                Some(records) if records.len() == 1 => Envelope::success(200, records, None),
                records => {
                    let count = records.map(|r| r.len()).unwrap_or(0);
                    tracing::warn!(id, count, "By-id lookup did not return exactly one record");
                    Envelope::failed(Failure::shape(MULTIPLE_RECORDS_MESSAGE))
                }
            }
        }
        Ok(response) => Envelope::failed(Failure::upstream(
            response.status,
            format!("Employee not found with ID: {}", id),
        )),
        Err(err) => classify_error(err, "fetching employee by id"),
    }
}

/// Normalizes a create response
///
/// The upstream returns `data` as a loose object. Each known field is
/// extracted individually; absent fields stay empty instead of failing.
pub fn normalize_create(fetched: Fetched<Value>) -> Envelope {
    match fetched {
        Ok(response) if response.status == 200 => {
            let created = response
                .body
                .as_object()
                .filter(|body| is_success_marker(body.get("status").and_then(Value::as_str)))
                .and_then(|body| body.get("data"))
                .and_then(Value::as_object)
                .map(employee_from_fields);

            match created {
                Some(employee) => {
                    tracing::info!(id = %employee.id, "Created employee");
                    Envelope::success(201, vec![employee], Some(CREATED_MESSAGE.to_string()))
                }
                None => {
                    tracing::warn!(
                        body = %response.body,
                        "Create response missing success status or data"
                    );
                    Envelope::failed(Failure::shape(CREATE_FAILED_MESSAGE))
                }
            }
        }
        Ok(response) => {
            tracing::warn!(status = response.status, "Create returned an unexpected status");
            Envelope::failed(Failure::shape(CREATE_FAILED_MESSAGE))
        }
        Err(UpstreamError::ParseError(err)) => {
            tracing::error!(error = %err, "Failed to decode create response");
            Envelope::failed(Failure::shape(CREATE_FAILED_MESSAGE))
        }
        Err(err) => classify_error(err, "creating employee"),
    }
}

/// Normalizes a delete response
///
/// The body passes through as-is; a missing `data` becomes an empty list.
pub fn normalize_delete(id: &str, fetched: Fetched<EmployeesBody>) -> Envelope {
    match fetched {
        Ok(response) if response.status == 200 => Envelope::success(
            200,
            response.body.data.unwrap_or_default(),
            response.body.message,
        ),
        Ok(response) => Envelope::failed(Failure::upstream(
            response.status,
            format!("Failed to delete the employee with ID: {}", id),
        )),
        Err(err) => classify_error(err, "deleting employee"),
    }
}

fn is_success_marker(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case(SUCCESS))
}

fn employee_from_fields(data: &Map<String, Value>) -> Employee {
    let field = |key: &str| data.get(key).and_then(scalar_to_string).unwrap_or_default();
    Employee {
        id: field("id"),
        name: field("name"),
        salary: field("salary"),
        age: field("age"),
        profile_image: String::new(),
    }
}

/// Maps a client error to an envelope
///
/// Upstream HTTP errors keep their status and reason phrase. Everything
/// else is logged and reduced to a generic 500.
fn classify_error(err: UpstreamError, operation: &str) -> Envelope {
    match err {
        UpstreamError::Status { status, reason } => {
            tracing::warn!(status, %reason, operation, "Upstream returned an error status");
            Envelope::failed(Failure::upstream(status, reason))
        }
        other => {
            tracing::error!(error = %other, operation, "Upstream call failed");
            Envelope::failed(Failure::transport())
        }
    }
}
