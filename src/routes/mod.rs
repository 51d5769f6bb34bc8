//! HTTP route handlers grouped by resource domain.
//!
//! Handlers are annotated with `#[openapi]` so `rocket_okapi` can derive an
//! OpenAPI document automatically.

pub mod admin;
pub mod content;
pub mod health;
