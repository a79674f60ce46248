//! User profile HTTP handlers.
//!
//! ```text
//! GET /api/v1/users/{id}/profile
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{Error, Profile, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// A user profile as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponseBody {
    #[schema(format = "uuid")]
    pub user_id: Uuid,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub total_sales: i32,
    pub total_purchases: i32,
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Profile> for ProfileResponseBody {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: *profile.user_id.as_uuid(),
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            bio: profile.bio,
            total_sales: profile.total_sales,
            total_purchases: profile.total_purchases,
            created_at: profile.created_at.to_rfc3339(),
        }
    }
}

/// Public profile for a user, backing reviewer and reviewee displays.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/profile",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "Profile for the user", body = ProfileResponseBody),
        (status = 404, description = "No profile for this user", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUserProfile"
)]
#[get("/users/{id}/profile")]
pub async fn get_user_profile(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ProfileResponseBody>> {
    let profile = state
        .profiles
        .get(UserId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(ProfileResponseBody::from(profile)))
}

#[cfg(test)]
#[path = "profiles_tests.rs"]
mod tests;
