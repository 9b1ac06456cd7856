// src/handlers/mod.rs

pub mod attendance;
pub mod auth;
pub mod business_trips;
pub mod employees;
pub mod leaves;
pub mod notifications;
pub mod settings;
pub mod sick_leaves;
pub mod stripe_webhook;
pub mod subscribers;
