// src/middleware/mod.rs

pub mod auth;

pub use auth::{AuthenticatedEmployee, admin_middleware, auth_middleware};
