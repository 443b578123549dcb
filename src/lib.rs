//! Employee Facade Library
//!
//! Calls a third-party employee API, normalizes its responses, caches the
//! full employee list and derives search and salary views from it.

pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod query;
pub mod service;

pub use cache::EmployeeCache;
pub use config::FacadeConfig;
pub use data::{Employee, Envelope, Failure, FailureKind, NewEmployee, Outcome, UpstreamClient};
pub use service::EmployeeService;
