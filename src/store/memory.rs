//! In-process entity store.
//!
//! Mirrors the uniqueness rules of the PostgreSQL schema (case-insensitive
//! course names, category names per course, problem names per category) and
//! keeps a log of every mutation so callers can assert on what an import wrote.

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::models::{Category, Course, Problem, ProblemDraft};
use crate::store::{EntityStore, StoreError, StoreResult, name_key};

/// A write observed by [`InMemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateCourse { id: i32, name: String },
    CreateCategory { id: i32, course_id: i32, name: String },
    CreateProblem { id: i32, category_id: i32, name: String },
    UpdateProblem { id: i32, name: String },
}

#[derive(Default)]
struct State {
    courses: Vec<Course>,
    categories: Vec<Category>,
    problems: Vec<Problem>,
    mutations: Vec<Mutation>,
    next_id: i32,
}

impl State {
    fn allocate_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the mutation log.
    pub async fn take_mutations(&self) -> Vec<Mutation> {
        std::mem::take(&mut self.state.lock().await.mutations)
    }

    pub async fn courses(&self) -> Vec<Course> {
        self.state.lock().await.courses.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.lock().await.categories.clone()
    }

    pub async fn problems(&self) -> Vec<Problem> {
        self.state.lock().await.problems.clone()
    }
}

#[rocket::async_trait]
impl EntityStore for InMemoryStore {
    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        Ok(self.state.lock().await.courses.clone())
    }

    async fn find_courses_by_name(&self, name: &str) -> StoreResult<Vec<Course>> {
        let key = name_key(name);
        let state = self.state.lock().await;
        Ok(state
            .courses
            .iter()
            .filter(|course| name_key(&course.name) == key)
            .cloned()
            .collect())
    }

    async fn create_course(&self, name: &str, description: &str) -> StoreResult<Course> {
        let mut state = self.state.lock().await;
        let key = name_key(name);
        if state.courses.iter().any(|c| name_key(&c.name) == key) {
            return Err(StoreError::Conflict(format!("course '{name}' already exists")));
        }

        let course = Course {
            id: state.allocate_id(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: Some(Utc::now()),
        };
        state.mutations.push(Mutation::CreateCourse {
            id: course.id,
            name: course.name.clone(),
        });
        state.courses.push(course.clone());
        Ok(course)
    }

    async fn find_categories_by_course(&self, course_id: i32) -> StoreResult<Vec<Category>> {
        let state = self.state.lock().await;
        Ok(state
            .categories
            .iter()
            .filter(|category| category.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn create_category(
        &self,
        course_id: i32,
        name: &str,
        description: &str,
    ) -> StoreResult<Category> {
        let mut state = self.state.lock().await;
        if !state.courses.iter().any(|c| c.id == course_id) {
            return Err(StoreError::NotFound(format!("course {course_id}")));
        }
        let key = name_key(name);
        if state
            .categories
            .iter()
            .any(|c| c.course_id == course_id && name_key(&c.name) == key)
        {
            return Err(StoreError::Conflict(format!(
                "category '{name}' already exists in course {course_id}"
            )));
        }

        let category = Category {
            id: state.allocate_id(),
            course_id,
            name: name.to_string(),
            description: description.to_string(),
            created_at: Some(Utc::now()),
        };
        state.mutations.push(Mutation::CreateCategory {
            id: category.id,
            course_id,
            name: category.name.clone(),
        });
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn find_problems_by_category(&self, category_id: i32) -> StoreResult<Vec<Problem>> {
        let state = self.state.lock().await;
        Ok(state
            .problems
            .iter()
            .filter(|problem| problem.category_id == category_id)
            .cloned()
            .collect())
    }

    async fn create_problem(
        &self,
        category_id: i32,
        draft: &ProblemDraft,
    ) -> StoreResult<Problem> {
        let mut state = self.state.lock().await;
        if !state.categories.iter().any(|c| c.id == category_id) {
            return Err(StoreError::NotFound(format!("category {category_id}")));
        }
        let key = name_key(&draft.name);
        if state
            .problems
            .iter()
            .any(|p| p.category_id == category_id && name_key(&p.name) == key)
        {
            return Err(StoreError::Conflict(format!(
                "problem '{}' already exists in category {category_id}",
                draft.name
            )));
        }

        let now = Utc::now();
        let problem = Problem {
            id: state.allocate_id(),
            category_id,
            name: draft.name.clone(),
            description: draft.description.clone(),
            code_snippet: draft.code_snippet.clone(),
            correct_lines: draft.correct_lines_joined(),
            reason: Value::Object(draft.reason.clone()),
            hint: draft.hint.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.mutations.push(Mutation::CreateProblem {
            id: problem.id,
            category_id,
            name: problem.name.clone(),
        });
        state.problems.push(problem.clone());
        Ok(problem)
    }

    async fn update_problem(&self, problem_id: i32, draft: &ProblemDraft) -> StoreResult<Problem> {
        let mut state = self.state.lock().await;
        let index = state
            .problems
            .iter()
            .position(|p| p.id == problem_id)
            .ok_or_else(|| StoreError::NotFound(format!("problem {problem_id}")))?;

        let category_id = state.problems[index].category_id;
        let key = name_key(&draft.name);
        if state
            .problems
            .iter()
            .any(|p| p.id != problem_id && p.category_id == category_id && name_key(&p.name) == key)
        {
            return Err(StoreError::Conflict(format!(
                "problem '{}' already exists in category {category_id}",
                draft.name
            )));
        }

        let problem = &mut state.problems[index];
        problem.name = draft.name.clone();
        problem.description = draft.description.clone();
        problem.code_snippet = draft.code_snippet.clone();
        problem.correct_lines = draft.correct_lines_joined();
        problem.reason = Value::Object(draft.reason.clone());
        problem.hint = draft.hint.clone();
        problem.updated_at = Some(Utc::now());
        let updated = problem.clone();

        state.mutations.push(Mutation::UpdateProblem {
            id: problem_id,
            name: updated.name.clone(),
        });
        Ok(updated)
    }
}
