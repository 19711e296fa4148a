//! # TopSteel Core
//! 
//! Domain entities, services, and repository traits for menu resolution,
//! user menu preferences, tenant scoping and typed parameters.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
