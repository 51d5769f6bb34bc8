use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx::FromRow;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ===== Content Hierarchy =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct Course {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct Category {
    pub id: i32,
    pub course_id: i32,
    pub name: String,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, JsonSchema)]
pub struct Problem {
    pub id: i32,
    pub category_id: i32,
    pub name: String,
    pub description: String,
    pub code_snippet: String,
    /// Canonical comma-joined list of 1-based line numbers, e.g. `"1,3,7"`.
    pub correct_lines: String,
    /// Line number (as string) to explanation.
    pub reason: Value,
    pub hint: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Field values written for a problem on create or update.
///
/// The owning category is passed separately; an update never moves a problem
/// to another category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProblemDraft {
    pub name: String,
    pub description: String,
    pub code_snippet: String,
    pub correct_lines: Vec<u32>,
    pub reason: Map<String, Value>,
    pub hint: String,
}

impl ProblemDraft {
    /// Storage form of `correct_lines`. Order and duplicates are preserved.
    pub fn correct_lines_joined(&self) -> String {
        join_lines(&self.correct_lines)
    }
}

pub fn join_lines(lines: &[u32]) -> String {
    lines
        .iter()
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// ===== Response Envelopes =====

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataResponse<T> {
    pub data: T,
}
