//! Entity store seam for the content hierarchy.
//!
//! The import pipeline only talks to [`EntityStore`]. [`PgEntityStore`] is the
//! production implementation; [`InMemoryStore`] keeps everything in process
//! and records every mutation, which makes it the store of choice in tests.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use rocket_db_pools::sqlx;
use thiserror::Error;

use crate::models::{Category, Course, Problem, ProblemDraft};

pub use memory::{InMemoryStore, Mutation};
pub use postgres::PgEntityStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store handle shared through Rocket state and across import runs.
pub type SharedStore = Arc<dyn EntityStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(sqlx::Error),
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::Conflict(db_err.message().to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Persistence contract consumed by the import pipeline.
///
/// Name lookups are case-insensitive. Each call stands on its own; there is no
/// transaction spanning several calls.
#[rocket::async_trait]
pub trait EntityStore: Send + Sync {
    async fn list_courses(&self) -> StoreResult<Vec<Course>>;

    async fn find_courses_by_name(&self, name: &str) -> StoreResult<Vec<Course>>;

    async fn create_course(&self, name: &str, description: &str) -> StoreResult<Course>;

    async fn find_categories_by_course(&self, course_id: i32) -> StoreResult<Vec<Category>>;

    async fn create_category(
        &self,
        course_id: i32,
        name: &str,
        description: &str,
    ) -> StoreResult<Category>;

    async fn find_problems_by_category(&self, category_id: i32) -> StoreResult<Vec<Problem>>;

    async fn create_problem(&self, category_id: i32, draft: &ProblemDraft)
    -> StoreResult<Problem>;

    async fn update_problem(&self, problem_id: i32, draft: &ProblemDraft) -> StoreResult<Problem>;
}

/// Case-insensitive comparison key for natural-key matching.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
