use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::auth::models::UserRole;

/// The user behind a resolved session, placed in request extensions by the
/// session middleware.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub user_code: String,
    pub full_name: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }

    /// Check if user can use the administrative dashboard
    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }
}
