//! Behavioural coverage for the profile directory service.

use std::sync::Arc;

use chrono::Utc;
use rstest::rstest;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::MockProfileRepository;

fn profile_for(user_id: UserId) -> Profile {
    let now = Utc::now();
    Profile {
        user_id,
        display_name: "Crate Digger".to_owned(),
        avatar_url: Some("https://cdn.example.test/avatars/crate-digger.png".to_owned()),
        bio: None,
        total_sales: 12,
        total_purchases: 3,
        created_at: now,
        updated_at: now,
    }
}

fn service(profiles: MockProfileRepository) -> ProfileDirectoryService<MockProfileRepository> {
    ProfileDirectoryService::new(Arc::new(profiles))
}

#[rstest]
#[tokio::test]
async fn known_users_get_their_profile() {
    let user = UserId::random();
    let expected = profile_for(user);
    let stored = expected.clone();

    let mut profiles = MockProfileRepository::new();
    profiles
        .expect_find_by_user()
        .returning(move |_| Ok(Some(stored.clone())));

    let profile = service(profiles).get(user).await.expect("profile found");
    assert_eq!(profile, expected);
}

#[rstest]
#[tokio::test]
async fn unknown_users_are_not_found() {
    let mut profiles = MockProfileRepository::new();
    profiles.expect_find_by_user().returning(|_| Ok(None));

    let err = service(profiles)
        .get(UserId::random())
        .await
        .expect_err("missing profile rejected");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn repository_outages_surface_as_unavailable() {
    let mut profiles = MockProfileRepository::new();
    profiles.expect_find_by_user().returning(|_| {
        Err(ProfileRepositoryError::connection("pool timed out"))
    });

    let err = service(profiles)
        .get(UserId::random())
        .await
        .expect_err("connection failure surfaced");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
