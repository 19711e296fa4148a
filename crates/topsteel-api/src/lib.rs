//! # TopSteel API
//! 
//! HTTP handlers, middleware, response envelope and router.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, Repositories, StateOptions};
