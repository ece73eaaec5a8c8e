//! # Board Core
//!
//! The domain layer of the Board posts API.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the validation stage, the ports infrastructure must implement,
//! and the post service that composes them.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::DomainError;
pub use services::PostService;
