//! Course store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use course_catalog_shared::types::Course;

use super::StoreError;

/// Persistence operations for the course catalog.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn insert(&self, course: &Course) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<Course>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, StoreError>;

    async fn list_by_category(&self, category: &str) -> Result<Vec<Course>, StoreError>;
}

/// Postgres-backed course store
pub struct PgCourseStore {
    pool: PgPool,
}

impl PgCourseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CourseRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    tutor: Option<String>,
    category: Option<String>,
    price: Option<f64>,
    duration: Option<String>,
    available: bool,
    max_students: Option<i32>,
    language: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CourseRow> for Course {
    fn from(row: CourseRow) -> Self {
        Course {
            id: row.id,
            name: row.name,
            description: row.description,
            tutor: row.tutor,
            category: row.category,
            price: row.price,
            duration: row.duration,
            available: row.available,
            max_students: row.max_students,
            language: row.language,
            created_at: row.created_at,
        }
    }
}

const COURSE_COLUMNS: &str = "id, name, description, tutor, category, price, duration, \
                              available, max_students, language, created_at";

#[async_trait]
impl CourseStore for PgCourseStore {
    async fn insert(&self, course: &Course) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO courses
                (id, name, description, tutor, category, price, duration,
                 available, max_students, language, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(course.id)
        .bind(&course.name)
        .bind(&course.description)
        .bind(&course.tutor)
        .bind(&course.category)
        .bind(course.price)
        .bind(&course.duration)
        .bind(course.available)
        .bind(course.max_students)
        .bind(&course.language)
        .bind(course.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Course::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>, StoreError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Course::from))
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE category = $1 ORDER BY created_at"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Course::from).collect())
    }
}
