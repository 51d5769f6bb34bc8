//! Create-or-update decision for a problem's natural key.

use crate::models::{Category, Problem, ProblemDraft};
use crate::store::{EntityStore, StoreResult, name_key};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertDecision {
    Create,
    Update { existing_id: i32 },
}

/// Whether the applied write created or updated the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Match `problem_name` case-insensitively against the category's problems.
///
/// The category is read from the store on every call so problems written by
/// earlier rows of the same batch are matched too.
pub async fn decide(
    store: &dyn EntityStore,
    category: &Category,
    problem_name: &str,
) -> StoreResult<UpsertDecision> {
    let key = name_key(problem_name);
    let existing = store
        .find_problems_by_category(category.id)
        .await?
        .into_iter()
        .find(|problem| name_key(&problem.name) == key);

    Ok(match existing {
        Some(problem) => UpsertDecision::Update {
            existing_id: problem.id,
        },
        None => UpsertDecision::Create,
    })
}

/// Decide and apply in one step.
pub async fn upsert_problem(
    store: &dyn EntityStore,
    category: &Category,
    draft: &ProblemDraft,
) -> StoreResult<(UpsertOutcome, Problem)> {
    match decide(store, category, &draft.name).await? {
        UpsertDecision::Create => {
            let problem = store.create_problem(category.id, draft).await?;
            Ok((UpsertOutcome::Created, problem))
        }
        UpsertDecision::Update { existing_id } => {
            let problem = store.update_problem(existing_id, draft).await?;
            Ok((UpsertOutcome::Updated, problem))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, Mutation};

    fn draft(name: &str) -> ProblemDraft {
        ProblemDraft {
            name: name.to_string(),
            code_snippet: "x = 1".to_string(),
            correct_lines: vec![1],
            ..Default::default()
        }
    }

    async fn category(store: &InMemoryStore) -> Category {
        let course = store.create_course("C", "").await.unwrap();
        store.create_category(course.id, "L", "").await.unwrap()
    }

    #[tokio::test]
    async fn unknown_name_is_a_create() {
        let store = InMemoryStore::new();
        let category = category(&store).await;
        let decision = decide(&store, &category, "New").await.unwrap();
        assert_eq!(decision, UpsertDecision::Create);
    }

    #[tokio::test]
    async fn existing_name_matches_ignoring_case() {
        let store = InMemoryStore::new();
        let category = category(&store).await;
        let existing = store
            .create_problem(category.id, &draft("SameName"))
            .await
            .unwrap();

        let decision = decide(&store, &category, "samename").await.unwrap();
        assert_eq!(
            decision,
            UpsertDecision::Update {
                existing_id: existing.id
            }
        );
    }

    #[tokio::test]
    async fn second_upsert_in_a_row_sees_the_first() {
        let store = InMemoryStore::new();
        let category = category(&store).await;
        store.take_mutations().await;

        let (first, created) = upsert_problem(&store, &category, &draft("Twice"))
            .await
            .unwrap();
        let (second, updated) = upsert_problem(&store, &category, &draft("TWICE"))
            .await
            .unwrap();

        assert_eq!(first, UpsertOutcome::Created);
        assert_eq!(second, UpsertOutcome::Updated);
        assert_eq!(created.id, updated.id);
        assert_eq!(
            store.take_mutations().await,
            vec![
                Mutation::CreateProblem {
                    id: created.id,
                    category_id: category.id,
                    name: "Twice".to_string()
                },
                Mutation::UpdateProblem {
                    id: created.id,
                    name: "TWICE".to_string()
                },
            ]
        );
    }
}
