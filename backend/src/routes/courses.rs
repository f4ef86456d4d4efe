//! Course catalog routes

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use course_catalog_shared::types::Course;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses))
        .route("/category/:category", get(list_by_category))
        .route("/:course_id", get(get_course))
}

/// Fetch all courses
///
/// GET /api/v1/courses
async fn list_courses(State(state): State<AppState>) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(state.courses.list_courses().await?))
}

/// Get courses by category
///
/// GET /api/v1/courses/category/:category
async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(state.courses.list_by_category(&category).await?))
}

/// Get a course by ID
///
/// GET /api/v1/courses/:course_id
async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> ApiResult<Json<Course>> {
    Ok(Json(state.courses.get_course(course_id).await?))
}
