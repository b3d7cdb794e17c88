//! # Blogroll Core
//!
//! The domain layer of the Blogroll blogging service.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, repository ports, pagination and form validation.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod repositories;
pub mod validation;

pub use error::DomainError;
pub use pagination::{Page, PageWindow, Paginator};
pub use repositories::Repositories;
