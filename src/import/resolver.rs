//! Find-or-create resolution of a row's course and category.
//!
//! Both caches live for exactly one batch. Course names are seeded from the
//! store when the resolver is loaded; a course's categories are read the first
//! time a row references that course. Entities created by earlier rows go
//! straight into the caches, so later rows see them without another lookup.

use std::collections::{HashMap, HashSet};

use crate::models::{Category, Course};
use crate::store::{EntityStore, StoreError, StoreResult, name_key};

pub struct EntityResolver<'a> {
    store: &'a dyn EntityStore,
    courses: HashMap<String, Course>,
    categories: HashMap<i32, HashMap<String, Category>>,
    created_courses: HashSet<String>,
    created_categories: HashSet<(i32, String)>,
}

impl<'a> EntityResolver<'a> {
    /// Build a resolver seeded with every course currently in the store.
    pub async fn load(store: &'a dyn EntityStore) -> StoreResult<Self> {
        let courses = store
            .list_courses()
            .await?
            .into_iter()
            .map(|course| (name_key(&course.name), course))
            .collect::<HashMap<_, _>>();

        log::debug!("entity resolver seeded with {} courses", courses.len());

        Ok(Self {
            store,
            courses,
            categories: HashMap::new(),
            created_courses: HashSet::new(),
            created_categories: HashSet::new(),
        })
    }

    /// Distinct course names created during this batch.
    pub fn courses_created(&self) -> usize {
        self.created_courses.len()
    }

    /// Distinct (course, category name) pairs created during this batch.
    pub fn categories_created(&self) -> usize {
        self.created_categories.len()
    }

    pub async fn resolve_course(&mut self, name: &str) -> StoreResult<Course> {
        let key = name_key(name);
        if let Some(course) = self.courses.get(&key) {
            return Ok(course.clone());
        }

        let course = match self.store.create_course(name, "").await {
            Ok(course) => {
                log::debug!("created course '{}' (id {})", course.name, course.id);
                self.created_courses.insert(key.clone());
                course
            }
            // Another writer got there first; the store has the final say.
            Err(StoreError::Conflict(reason)) => {
                log::debug!("course '{}' created concurrently: {}", name, reason);
                self.store
                    .find_courses_by_name(name)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or(StoreError::Conflict(reason))?
            }
            Err(err) => return Err(err),
        };

        self.courses.insert(key, course.clone());
        Ok(course)
    }

    pub async fn resolve_category(&mut self, course: &Course, name: &str) -> StoreResult<Category> {
        let key = name_key(name);

        if !self.categories.contains_key(&course.id) {
            let known = self
                .store
                .find_categories_by_course(course.id)
                .await?
                .into_iter()
                .map(|category| (name_key(&category.name), category))
                .collect::<HashMap<_, _>>();
            self.categories.insert(course.id, known);
        }

        if let Some(category) = self.categories.get(&course.id).and_then(|known| known.get(&key)) {
            return Ok(category.clone());
        }

        let category = match self.store.create_category(course.id, name, "").await {
            Ok(category) => {
                log::debug!(
                    "created category '{}' in course {} (id {})",
                    category.name,
                    course.id,
                    category.id
                );
                self.created_categories.insert((course.id, key.clone()));
                category
            }
            Err(StoreError::Conflict(reason)) => {
                log::debug!("category '{}' created concurrently: {}", name, reason);
                self.store
                    .find_categories_by_course(course.id)
                    .await?
                    .into_iter()
                    .find(|category| name_key(&category.name) == key)
                    .ok_or(StoreError::Conflict(reason))?
            }
            Err(err) => return Err(err),
        };

        self.categories
            .entry(course.id)
            .or_default()
            .insert(key, category.clone());
        Ok(category)
    }
}
