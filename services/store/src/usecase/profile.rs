use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::ProfileRepository;
use crate::domain::types::{Profile, is_valid_email};
use crate::error::StoreServiceError;

const NAME_MAX: usize = 50;

// ── GetProfile ───────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<R: ProfileRepository> {
    pub repo: R,
}

impl<R: ProfileRepository> GetProfileUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Profile, StoreServiceError> {
        Ok(self
            .repo
            .find(user_id)
            .await?
            .unwrap_or_else(|| Profile::empty(user_id)))
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

pub struct UpdateProfileUseCase<R: ProfileRepository> {
    pub repo: R,
}

impl<R: ProfileRepository> UpdateProfileUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<Profile, StoreServiceError> {
        if input.first_name.is_none() && input.last_name.is_none() && input.email.is_none() {
            return Err(StoreServiceError::MissingData);
        }
        let mut profile = self
            .repo
            .find(user_id)
            .await?
            .unwrap_or_else(|| Profile::empty(user_id));

        if let Some(first_name) = input.first_name {
            profile.first_name = bounded_name(first_name)?;
        }
        if let Some(last_name) = input.last_name {
            profile.last_name = bounded_name(last_name)?;
        }
        if let Some(email) = input.email {
            let email = email.trim().to_owned();
            // An empty email clears it.
            if !email.is_empty() && !is_valid_email(&email) {
                return Err(StoreServiceError::InvalidEmail);
            }
            profile.email = email;
        }
        profile.updated_at = Utc::now();
        self.repo.upsert(&profile).await?;
        Ok(profile)
    }
}

fn bounded_name(name: String) -> Result<String, StoreServiceError> {
    let name = name.trim().to_owned();
    if name.chars().count() > NAME_MAX {
        return Err(StoreServiceError::InvalidName);
    }
    Ok(name)
}
