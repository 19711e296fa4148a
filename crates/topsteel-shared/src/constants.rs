//! Application-wide constants

pub const API_PREFIX: &str = "/api/v1";
pub const DEFAULT_LANGUAGE: &str = "fr";
pub const DEFAULT_CUSTOM_MENU_TTL_SECS: u64 = 300;
pub const DEFAULT_PARAMETER_CACHE_TTL_SECS: u64 = 300;
pub const CUSTOM_MENU_CACHE_PREFIX: &str = "user:custom-menu";
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_SUPER_ADMIN: &str = "SUPER_ADMIN";
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
