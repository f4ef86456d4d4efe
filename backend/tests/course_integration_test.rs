//! Integration tests for the course catalog endpoints

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use course_catalog_shared::types::Course;
use uuid::Uuid;

fn course(name: &str, category: &str) -> Course {
    Course {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: Some(format!("Learn {name}")),
        tutor: Some("Olude".to_string()),
        category: Some(category.to_string()),
        price: Some(150_000.0),
        duration: Some("10 weeks".to_string()),
        available: true,
        max_students: Some(10),
        language: Some("english".to_string()),
        created_at: Utc::now(),
    }
}

fn catalog() -> Vec<Course> {
    vec![
        course("Frontend Development with React and Next.js", "Web Development"),
        course("Backend Development with FastAPI", "Backend Development"),
        course("Backend Development with Express.js", "Backend Development"),
    ]
}

#[tokio::test]
async fn test_list_all_courses() {
    let app = common::TestApp::with_courses(catalog());

    let (status, response) = app.get("/api/v1/courses").await;

    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_get_course_by_id() {
    let catalog = catalog();
    let wanted = catalog[0].clone();
    let app = common::TestApp::with_courses(catalog);

    let (status, response) = app.get(&format!("/api/v1/courses/{}", wanted.id)).await;

    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(body["name"], wanted.name);

    let (status, _) = app.get(&format!("/api/v1/courses/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_course_with_malformed_id() {
    let app = common::TestApp::with_courses(catalog());

    let (status, _) = app.get("/api/v1/courses/not-a-uuid").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_courses_by_category() {
    let app = common::TestApp::with_courses(catalog());

    let (status, response) = app
        .get("/api/v1/courses/category/Backend%20Development")
        .await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&response).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);

    // An empty category reports not found, not an empty list.
    let (status, _) = app.get("/api/v1/courses/category/Knitting").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
