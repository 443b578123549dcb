//! Aggregation service
//!
//! The single entry point consumers call. List-derived operations read the
//! cached snapshot (filling it from upstream on a miss); single-record
//! operations always go to the upstream so they reflect live state.
//!
//! ```text
//! consumer ─▶ EmployeeService ─┬─▶ EmployeeCache ◀─┐
//!                              │                   │ fill on miss
//!                              ├─▶ UpstreamClient ─┴─▶ normalize ─▶ Envelope
//!                              └─▶ query (filter / top-n / max)
//!                                          │
//!                                          ▼
//!                                       Outcome
//! ```
//!
//! Create and delete leave the cache alone; the snapshot reflects the last
//! full list fetch until the process restarts or the cache is cleared.

use std::sync::Arc;

use crate::cache::EmployeeCache;
use crate::config::FacadeConfig;
use crate::data::normalize::{normalize_by_id, normalize_create, normalize_delete, normalize_list};
use crate::data::{Employee, Failure, NewEmployee, Outcome, UpstreamClient, UpstreamError};
use crate::query;

const NO_EMPLOYEES_MESSAGE: &str = "No employees found";

/// Orchestrates cache, upstream client, normalizer and query engine
#[derive(Debug, Clone)]
pub struct EmployeeService {
    client: UpstreamClient,
    cache: Arc<EmployeeCache>,
}

impl EmployeeService {
    /// Creates a service from explicitly passed collaborators
    pub fn new(client: UpstreamClient, cache: Arc<EmployeeCache>) -> Self {
        Self { client, cache }
    }

    /// Creates a service with a fresh client and an empty cache
    pub fn from_config(config: &FacadeConfig) -> Result<Self, UpstreamError> {
        Ok(Self::new(
            UpstreamClient::new(config)?,
            Arc::new(EmployeeCache::new()),
        ))
    }

    pub fn cache(&self) -> &Arc<EmployeeCache> {
        &self.cache
    }

    /// Returns the full employee list, from cache when possible
    ///
    /// An upstream failure is logged and reported as an empty list, so this
    /// call alone cannot tell "no employees" from "upstream down". Use
    /// [`EmployeeService::list_employees`] when the difference matters.
    pub async fn get_all_employees(&self) -> Arc<Vec<Employee>> {
        match self.snapshot().await {
            Ok(employees) => employees,
            Err(failure) => {
                tracing::warn!(
                    status = failure.status,
                    message = %failure.message,
                    "Employee list unavailable, returning empty list"
                );
                Arc::new(Vec::new())
            }
        }
    }

    /// Lists all employees
    ///
    /// # Returns
    /// * `Outcome::Employees` with the cached or freshly fetched list
    /// * `Outcome::Failure` with 404 if the list is empty, or the upstream failure
    pub async fn list_employees(&self) -> Outcome {
        match self.populated_snapshot().await {
            Ok(employees) => Outcome::Employees(employees.to_vec()),
            Err(failure) => failure.into(),
        }
    }

    /// Finds employees whose name contains `term`, ignoring case
    pub async fn search(&self, term: &str) -> Outcome {
        let employees = match self.populated_snapshot().await {
            Ok(employees) => employees,
            Err(failure) => return failure.into(),
        };

        let matches = query::filter_by_name(&employees, term);
        if matches.is_empty() {
            tracing::info!(term, "Search matched no employees");
            return Failure::not_found(format!("No employees found matching '{}'", term)).into();
        }
        Outcome::Employees(matches)
    }

    /// Returns the highest salary across all employees
    pub async fn highest_salary(&self) -> Outcome {
        let employees = match self.populated_snapshot().await {
            Ok(employees) => employees,
            Err(failure) => return failure.into(),
        };

        match query::max_salary(&employees) {
            Ok(Some(salary)) => Outcome::Scalar(salary),
            Ok(None) => Failure::not_found(NO_EMPLOYEES_MESSAGE).into(),
            Err(err) => {
                tracing::error!(error = %err, "Cannot compute highest salary");
                Failure::data_integrity().into()
            }
        }
    }

    /// Returns the names of the ten highest earners, highest first
    pub async fn top_ten_names(&self) -> Outcome {
        let employees = match self.populated_snapshot().await {
            Ok(employees) => employees,
            Err(failure) => return failure.into(),
        };

        match query::top_n_by_salary(&employees, query::TOP_EARNERS) {
            Ok(names) if names.is_empty() => Failure::not_found(NO_EMPLOYEES_MESSAGE).into(),
            Ok(names) => Outcome::Names(names),
            Err(err) => {
                tracing::error!(error = %err, "Cannot rank employees by salary");
                Failure::data_integrity().into()
            }
        }
    }

    /// Fetches one employee straight from upstream
    pub async fn get_by_id(&self, id: &str) -> Outcome {
        let id = match validate_id(id) {
            Ok(id) => id,
            Err(failure) => return failure.into(),
        };

        let envelope = normalize_by_id(id, self.client.get_employee(id).await);
        match envelope.into_result() {
            Ok((employees, _)) => single(employees, Outcome::Employee),
            Err(failure) => failure.into(),
        }
    }

    /// Creates an employee upstream
    pub async fn create(&self, employee: &NewEmployee) -> Outcome {
        if let Err(err) = employee.validate() {
            return Failure::invalid_input(err.to_string()).into();
        }

        let envelope = normalize_create(self.client.create_employee(employee).await);
        match envelope.into_result() {
            Ok((employees, _)) => single(employees, Outcome::Created),
            Err(failure) => failure.into(),
        }
    }

    /// Deletes an employee upstream
    pub async fn delete(&self, id: &str) -> Outcome {
        let id = match validate_id(id) {
            Ok(id) => id,
            Err(failure) => return failure.into(),
        };

        let envelope = normalize_delete(id, self.client.delete_employee(id).await);
        match envelope.into_result() {
            Ok((_, message)) => {
                tracing::info!(id, "Deleted employee");
                Outcome::Deleted(
                    message.unwrap_or_else(|| format!("Deleted employee with ID: {}", id)),
                )
            }
            Err(failure) => failure.into(),
        }
    }

    /// Cached list, fetched through the normalizer on a miss
    async fn snapshot(&self) -> Result<Arc<Vec<Employee>>, Failure> {
        let cached = self
            .cache
            .get_or_fetch(|| async {
                let envelope = normalize_list(self.client.list_employees().await);
                let (employees, _) = envelope.into_result()?;
                tracing::info!(count = employees.len(), "Fetched employee list from upstream");
                Ok::<_, Failure>(employees)
            })
            .await?;
        Ok(cached.data)
    }

    /// Like `snapshot`, but an empty list is a 404
    async fn populated_snapshot(&self) -> Result<Arc<Vec<Employee>>, Failure> {
        let employees = self.snapshot().await?;
        if employees.is_empty() {
            tracing::warn!("Employee list is empty");
            return Err(Failure::not_found(NO_EMPLOYEES_MESSAGE));
        }
        Ok(employees)
    }
}

fn validate_id(id: &str) -> Result<&str, Failure> {
    let id = id.trim();
    if id.is_empty() {
        return Err(Failure::invalid_input("Employee ID must not be empty"));
    }
    Ok(id)
}

/// Wraps the only record of a normalized single-record envelope
fn single(employees: Vec<Employee>, wrap: fn(Employee) -> Outcome) -> Outcome {
    match employees.into_iter().next() {
        Some(employee) => wrap(employee),
        None => Failure::shape("Upstream response carried no employee record").into(),
    }
}
