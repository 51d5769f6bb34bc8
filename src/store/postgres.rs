//! PostgreSQL-backed entity store.

use rocket_db_pools::sqlx::{self, PgPool};
use sqlx::types::Json;

use crate::models::{Category, Course, Problem, ProblemDraft};
use crate::store::{EntityStore, StoreError, StoreResult};

const COURSE_COLUMNS: &str = "id, name, description, created_at";
const CATEGORY_COLUMNS: &str = "id, course_id, name, description, created_at";
const PROBLEM_COLUMNS: &str = "id, category_id, name, description, code_snippet, correct_lines, reason, hint, created_at, updated_at";

#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[rocket::async_trait]
impl EntityStore for PgEntityStore {
    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    async fn find_courses_by_name(&self, name: &str) -> StoreResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE lower(name) = lower($1) ORDER BY id ASC"
        ))
        .bind(name.trim())
        .fetch_all(&self.pool)
        .await?;
        Ok(courses)
    }

    async fn create_course(&self, name: &str, description: &str) -> StoreResult<Course> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses (name, description) VALUES ($1, $2) RETURNING {COURSE_COLUMNS}"
        ))
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(course)
    }

    async fn find_categories_by_course(&self, course_id: i32) -> StoreResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE course_id = $1 ORDER BY id ASC"
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn create_category(
        &self,
        course_id: i32,
        name: &str,
        description: &str,
    ) -> StoreResult<Category> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (course_id, name, description) VALUES ($1, $2, $3) RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(course_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn find_problems_by_category(&self, category_id: i32) -> StoreResult<Vec<Problem>> {
        let problems = sqlx::query_as::<_, Problem>(&format!(
            "SELECT {PROBLEM_COLUMNS} FROM problems WHERE category_id = $1 ORDER BY id ASC"
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(problems)
    }

    async fn create_problem(
        &self,
        category_id: i32,
        draft: &ProblemDraft,
    ) -> StoreResult<Problem> {
        let problem = sqlx::query_as::<_, Problem>(&format!(
            r#"INSERT INTO problems
                   (category_id, name, description, code_snippet, correct_lines, reason, hint)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {PROBLEM_COLUMNS}"#
        ))
        .bind(category_id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.code_snippet)
        .bind(draft.correct_lines_joined())
        .bind(Json(&draft.reason))
        .bind(&draft.hint)
        .fetch_one(&self.pool)
        .await?;
        Ok(problem)
    }

    async fn update_problem(&self, problem_id: i32, draft: &ProblemDraft) -> StoreResult<Problem> {
        let problem = sqlx::query_as::<_, Problem>(&format!(
            r#"UPDATE problems
               SET name = $2,
                   description = $3,
                   code_snippet = $4,
                   correct_lines = $5,
                   reason = $6,
                   hint = $7,
                   updated_at = NOW()
               WHERE id = $1
               RETURNING {PROBLEM_COLUMNS}"#
        ))
        .bind(problem_id)
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(&draft.code_snippet)
        .bind(draft.correct_lines_joined())
        .bind(Json(&draft.reason))
        .bind(&draft.hint)
        .fetch_optional(&self.pool)
        .await?;

        problem.ok_or_else(|| StoreError::NotFound(format!("problem {problem_id}")))
    }
}
