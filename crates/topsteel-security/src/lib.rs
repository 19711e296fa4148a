//! # TopSteel Security
//! 
//! Bearer token decoding into the authenticated principal.

pub mod jwt;

pub use jwt::{Claims, JwtError, JwtService};
