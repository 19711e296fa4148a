//! Request middleware: principal resolution and tenant injection

pub mod auth;
pub mod tenant;

pub use auth::{resolve_principal, AdminUser, CurrentUser};
pub use tenant::inject_tenant;
