//! Course catalog service

use std::sync::Arc;

use uuid::Uuid;

use course_catalog_shared::types::Course;

use crate::error::{ApiError, ApiResult};
use crate::repositories::CourseStore;

/// Read operations over the course catalog
pub struct CourseService {
    courses: Arc<dyn CourseStore>,
}

impl CourseService {
    pub fn new(courses: Arc<dyn CourseStore>) -> Self {
        Self { courses }
    }

    pub async fn list_courses(&self) -> ApiResult<Vec<Course>> {
        Ok(self.courses.list().await?)
    }

    pub async fn get_course(&self, id: Uuid) -> ApiResult<Course> {
        self.courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))
    }

    /// An empty category is reported as not found rather than as an
    /// empty list.
    pub async fn list_by_category(&self, category: &str) -> ApiResult<Vec<Course>> {
        let courses = self.courses.list_by_category(category).await?;
        if courses.is_empty() {
            return Err(ApiError::NotFound(format!(
                "No courses found in category '{}'",
                category
            )));
        }
        Ok(courses)
    }
}
