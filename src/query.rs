//! Derived views over an employee list
//!
//! Pure functions with no I/O. Each takes a borrowed snapshot, usually the
//! cached list, and never mutates it.

use crate::data::{Employee, IntegrityError};

/// Number of names returned by the top-earners view
pub const TOP_EARNERS: usize = 10;

/// Returns employees whose name contains `term`, ignoring case
///
/// Input order is preserved. An empty result is a valid answer.
pub fn filter_by_name(employees: &[Employee], term: &str) -> Vec<Employee> {
    let needle = term.to_lowercase();
    employees
        .iter()
        .filter(|employee| employee.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Returns the names of the `n` highest-paid employees, highest first
///
/// Equal salaries keep their input order. Every salary is parsed before
/// ranking, so one malformed record fails the whole view.
pub fn top_n_by_salary(employees: &[Employee], n: usize) -> Result<Vec<String>, IntegrityError> {
    let mut ranked = employees
        .iter()
        .map(|employee| {
            employee
                .salary_value()
                .map(|salary| (salary, employee.name.as_str()))
        })
        .collect::<Result<Vec<_>, IntegrityError>>()?;

    // sort_by is stable
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    Ok(ranked
        .into_iter()
        .take(n)
        .map(|(_, name)| name.to_string())
        .collect())
}

/// Returns the highest salary, or `None` for an empty list
pub fn max_salary(employees: &[Employee]) -> Result<Option<u64>, IntegrityError> {
    employees.iter().try_fold(
        None,
        |max: Option<u64>, employee| -> Result<Option<u64>, IntegrityError> {
            let salary = employee.salary_value()?;
            Ok(Some(max.map_or(salary, |m| m.max(salary))))
        },
    )
}
