//! # TopSteel Shared
//! 
//! Configuration, telemetry and common types for the TopSteel navigation services.

pub mod constants;
pub mod types;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
