//! Resolves batch and course ids into their short reference views.

use std::collections::{HashMap, HashSet};

use crate::database::Repository;
use crate::models::batch::Batch;
use crate::models::course::Course;
use crate::models::user::{BatchRef, CourseRef};
use crate::utils::error::AppResult;

#[derive(Default)]
pub struct ReferenceIndex {
    batches: HashMap<String, BatchRef>,
    courses: HashMap<String, CourseRef>,
}

fn unique<'a>(ids: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    ids.into_iter().cloned().collect::<HashSet<_>>().into_iter().collect()
}

impl ReferenceIndex {
    /// One query per collection regardless of how many ids are passed.
    pub async fn load<'a>(
        batches: &Repository<Batch>,
        courses: &Repository<Course>,
        batch_ids: impl IntoIterator<Item = &'a String>,
        course_ids: impl IntoIterator<Item = &'a String>,
    ) -> AppResult<Self> {
        let batches = batches
            .find_by_ids(&unique(batch_ids))
            .await?
            .iter()
            .map(|b| (b.id.clone(), BatchRef::from(b)))
            .collect();
        let courses = courses
            .find_by_ids(&unique(course_ids))
            .await?
            .iter()
            .map(|c| (c.id.clone(), CourseRef::from(c)))
            .collect();
        Ok(Self { batches, courses })
    }

    /// Dangling ids resolve to `None`.
    pub fn batch(&self, id: Option<&String>) -> Option<BatchRef> {
        id.and_then(|id| self.batches.get(id)).cloned()
    }

    pub fn course(&self, id: Option<&String>) -> Option<CourseRef> {
        id.and_then(|id| self.courses.get(id)).cloned()
    }
}
