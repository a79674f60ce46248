//! Profile directory domain service.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::{Error, Profile, UserId};

fn map_profile_error(error: ProfileRepositoryError) -> Error {
    match error {
        ProfileRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("profile repository unavailable: {message}"))
        }
        ProfileRepositoryError::Query { message } => {
            Error::internal(format!("profile repository error: {message}"))
        }
    }
}

/// Driving port for profile reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Fetch one user's public profile.
    async fn get(&self, user_id: UserId) -> Result<Profile, Error>;
}

/// Profile directory service over the profile port.
pub struct ProfileDirectoryService<P> {
    profiles: Arc<P>,
}

impl<P> ProfileDirectoryService<P> {
    /// Create the service with its driven port.
    pub fn new(profiles: Arc<P>) -> Self {
        Self { profiles }
    }
}

#[async_trait]
impl<P> ProfileDirectory for ProfileDirectoryService<P>
where
    P: ProfileRepository,
{
    async fn get(&self, user_id: UserId) -> Result<Profile, Error> {
        self.profiles
            .find_by_user(&user_id)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::not_found(format!("no profile for user {user_id}")))
    }
}

#[cfg(test)]
#[path = "profile_service_tests.rs"]
mod tests;
