//! Dashboard routes

use axum::{extract::State, routing::get, Json, Router};

use course_catalog_shared::types::Dashboard;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/", get(get_user_dashboard))
}

/// Get the authenticated user's dashboard
///
/// GET /api/v1/dashboard
async fn get_user_dashboard(
    State(state): State<AppState>,
    current: CurrentUser,
) -> ApiResult<Json<Dashboard>> {
    let dashboard = state.dashboards.get_user_dashboard(current.user.id).await?;
    Ok(Json(dashboard))
}
