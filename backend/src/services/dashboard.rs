//! Dashboard read model
//!
//! Dashboards are created by the email-verification transition; this
//! service only reads them back.

use std::sync::Arc;

use uuid::Uuid;

use course_catalog_shared::types::Dashboard;

use crate::error::{ApiError, ApiResult};
use crate::repositories::DashboardStore;

pub struct DashboardService {
    dashboards: Arc<dyn DashboardStore>,
}

impl DashboardService {
    pub fn new(dashboards: Arc<dyn DashboardStore>) -> Self {
        Self { dashboards }
    }

    pub async fn get_user_dashboard(&self, user_id: Uuid) -> ApiResult<Dashboard> {
        self.dashboards
            .find_by_owner(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Dashboard not found for this user".to_string()))
    }
}
