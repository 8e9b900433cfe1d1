use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use storefront_identity::identity::IdentityHeaders;

use crate::error::StoreServiceError;
use crate::state::AppState;
use crate::usecase::profile::{GetProfileUseCase, UpdateProfileInput, UpdateProfileUseCase};

// ── GET /users/@me ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(serialize_with = "storefront_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub async fn get_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, StoreServiceError> {
    let usecase = GetProfileUseCase {
        repo: state.profile_repo(),
    };
    let profile = usecase.execute(identity.user_id).await?;
    Ok(Json(ProfileResponse {
        user_id: profile.user_id.to_string(),
        first_name: profile.first_name,
        last_name: profile.last_name,
        email: profile.email,
        updated_at: profile.updated_at,
    }))
}

// ── PATCH /users/@me ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateMeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

pub async fn update_me(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<UpdateMeRequest>,
) -> Result<StatusCode, StoreServiceError> {
    let usecase = UpdateProfileUseCase {
        repo: state.profile_repo(),
    };
    usecase
        .execute(
            identity.user_id,
            UpdateProfileInput {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
