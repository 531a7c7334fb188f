//! HTTP route handlers
//!
//! Handlers validate input, call into the service layer and translate
//! results to HTTP responses. Errors surface as `AppError`, which maps
//! itself to a status code and a JSON error envelope.

pub mod catalog;
pub mod export;
pub mod health;
pub mod proxy;
