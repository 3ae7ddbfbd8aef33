//! Request inspection for Axum backends: the authenticated user, client IP,
//! merged parameters, URL path templates, browser and OS strings, and a
//! best-effort login location, each memoized per request.

pub mod clock;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod types;
pub mod validator;
