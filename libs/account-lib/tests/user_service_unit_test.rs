use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use secrecy::Secret;
use uuid::Uuid;

use account_lib::dto::{UserAddDto, UserProfileDto, UserUpdateDto};
use account_lib::entities::AppUser;
use account_lib::errors_service::UserServiceError;
use account_lib::provider::{IdentityError, IdentityProviderTrait, IdentitySubject};
use account_lib::repository::errors::RepositoryError;
use account_lib::repository::models::{RoleRow, UserRoleMapping, UserRow};
use account_lib::repository::traits::{RoleRepositoryTrait, UserRepositoryTrait};
use account_lib::result::ProviderError;
use account_lib::user_service::UserService;

mock! {
    pub Provider {}

    #[async_trait]
    impl IdentityProviderTrait for Provider {
        async fn create_user(&self, user: &AppUser, password: &Secret<String>) -> Result<(), IdentityError>;
        async fn update_user(&self, user: &AppUser) -> Result<(), IdentityError>;
        async fn delete_user(&self, user_id: Uuid) -> Result<(), IdentityError>;
        async fn find_by_id(&self, user_id: Uuid) -> Result<Option<IdentitySubject>, IdentityError>;
        async fn assign_roles(&self, user_id: Uuid, role_ids: &[Uuid]) -> Result<(), IdentityError>;
    }
}

mock! {
    pub UserRepo {}

    #[async_trait]
    impl UserRepositoryTrait for UserRepo {
        async fn get_user(&self, user_id: Uuid) -> Result<Option<UserRow>, RepositoryError>;
        async fn get_users(&self) -> Result<Vec<UserRow>, RepositoryError>;
    }
}

mock! {
    pub RoleRepo {}

    #[async_trait]
    impl RoleRepositoryTrait for RoleRepo {
        async fn get_roles(&self) -> Result<Vec<RoleRow>, RepositoryError>;
        async fn get_roles_for_user(&self, user_id: Uuid) -> Result<Vec<RoleRow>, RepositoryError>;
        async fn get_roles_for_users(&self, user_ids: &[String]) -> Result<Vec<UserRoleMapping>, RepositoryError>;
        async fn count_existing(&self, role_ids: &[Uuid]) -> Result<u64, RepositoryError>;
    }
}

// ==================== TEST HELPERS ====================

fn create_test_service(
    provider: MockProvider,
    user_repo: MockUserRepo,
    role_repo: MockRoleRepo,
) -> UserService<MockProvider, MockUserRepo, MockRoleRepo> {
    UserService::new(Arc::new(provider), Arc::new(user_repo), Arc::new(role_repo))
}

fn user_row(id: Uuid, email: &str) -> UserRow {
    UserRow {
        id: id.to_string(),
        username: email.to_string(),
        email: email.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        image_id: None,
        security_stamp: "stamp-original".to_string(),
        article_count: 0,
    }
}

fn add_dto(email: &str) -> UserAddDto {
    UserAddDto {
        email: email.to_string(),
        password: Secret::new("hunter2hunter2".to_string()),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        role_ids: vec![],
    }
}

fn update_dto(id: Uuid, email: &str) -> UserUpdateDto {
    UserUpdateDto {
        id,
        email: email.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        role_ids: vec![],
    }
}

fn profile_dto(email: &str) -> UserProfileDto {
    UserProfileDto {
        email: email.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        image_id: None,
    }
}

// ==================== CREATE USER TESTS ====================

#[tokio::test]
async fn test_create_user_success() {
    let mut provider = MockProvider::new();
    let user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    provider
        .expect_create_user()
        .withf(|user, _| {
            user.email == "jane@example.com" && user.username == "jane@example.com"
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.create_user(add_dto("jane@example.com")).await.unwrap();

    assert!(result.succeeded);
    assert!(result.field_errors.is_empty());
    assert!(result.provider_errors.is_empty());
}

#[tokio::test]
async fn test_create_user_with_roles_checks_existence_first() {
    let mut provider = MockProvider::new();
    let user_repo = MockUserRepo::new();
    let mut role_repo = MockRoleRepo::new();

    let role_id = Uuid::new_v4();

    role_repo
        .expect_count_existing()
        .withf(move |ids| ids == [role_id])
        .times(1)
        .returning(|_| Ok(1));

    provider.expect_create_user().times(1).returning(|_, _| Ok(()));
    provider
        .expect_assign_roles()
        .withf(move |_, ids| ids == [role_id])
        .times(1)
        .returning(|_, _| Ok(()));

    let mut dto = add_dto("jane@example.com");
    dto.role_ids = vec![role_id];

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.create_user(dto).await.unwrap();

    assert!(result.succeeded);
}

#[tokio::test]
async fn test_create_user_repeated_role_ids_count_as_one() {
    let mut provider = MockProvider::new();
    let user_repo = MockUserRepo::new();
    let mut role_repo = MockRoleRepo::new();

    let role_id = Uuid::new_v4();

    // The existence check sees the deduplicated set, so [A, A] with A
    // known must not read as a missing role.
    role_repo
        .expect_count_existing()
        .withf(move |ids| ids == [role_id])
        .times(1)
        .returning(|_| Ok(1));

    provider.expect_create_user().times(1).returning(|_, _| Ok(()));
    provider
        .expect_assign_roles()
        .times(1)
        .returning(|_, _| Ok(()));

    let mut dto = add_dto("jane@example.com");
    dto.role_ids = vec![role_id, role_id];

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.create_user(dto).await.unwrap();

    assert!(result.succeeded);
}

#[tokio::test]
async fn test_create_user_unknown_role_fails_before_provider() {
    // Provider gets no expectations: any call would panic the mock.
    let provider = MockProvider::new();
    let user_repo = MockUserRepo::new();
    let mut role_repo = MockRoleRepo::new();

    role_repo
        .expect_count_existing()
        .times(1)
        .returning(|_| Ok(0));

    let mut dto = add_dto("jane@example.com");
    dto.role_ids = vec![Uuid::new_v4()];

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.create_user(dto).await.unwrap();

    assert!(!result.succeeded);
    assert!(result.field_errors.iter().any(|e| e.field == "role_ids"));
}

#[tokio::test]
async fn test_create_user_invalid_email_never_reaches_provider() {
    let provider = MockProvider::new();
    let user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.create_user(add_dto("not-an-address")).await.unwrap();

    assert!(!result.succeeded);
    assert!(result.field_errors.iter().any(|e| e.field == "email"));
    assert!(result.provider_errors.is_empty());
}

#[tokio::test]
async fn test_create_user_duplicate_email_surfaces_provider_error() {
    let mut provider = MockProvider::new();
    let user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    provider.expect_create_user().times(1).returning(|user, _| {
        Err(IdentityError::Rejected(vec![ProviderError {
            code: "duplicate_email".to_string(),
            description: format!("email '{}' is already in use", user.email),
        }]))
    });

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.create_user(add_dto("taken@example.com")).await.unwrap();

    assert!(!result.succeeded);
    assert!(result.field_errors.is_empty());
    assert_eq!(result.provider_errors.len(), 1);
    assert_eq!(result.provider_errors[0].code, "duplicate_email");
    assert!(result.provider_errors[0].description.contains("taken@example.com"));
}

#[tokio::test]
async fn test_create_user_provider_outage_is_an_internal_error() {
    let mut provider = MockProvider::new();
    let user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    provider
        .expect_create_user()
        .times(1)
        .returning(|_, _| Err(IdentityError::Unavailable("connection refused".to_string())));

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.create_user(add_dto("jane@example.com")).await;

    assert!(matches!(result, Err(UserServiceError::Internal(_))));
}

// ==================== GET USER TESTS ====================

#[tokio::test]
async fn test_get_user_success() {
    let provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let user_id = Uuid::new_v4();
    user_repo
        .expect_get_user()
        .withf(move |id| *id == user_id)
        .times(1)
        .returning(move |_| Ok(Some(user_row(user_id, "jane@example.com"))));

    let service = create_test_service(provider, user_repo, role_repo);
    let user = service.get_user(user_id).await.unwrap();

    assert_eq!(user.id, user_id);
    assert_eq!(user.email, "jane@example.com");
    assert_eq!(user.username, "jane@example.com");
}

#[tokio::test]
async fn test_get_user_with_roles_resolves_current_role_set() {
    let provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let mut role_repo = MockRoleRepo::new();

    let user_id = Uuid::new_v4();
    let role_id = Uuid::new_v4();
    user_repo
        .expect_get_user()
        .withf(move |id| *id == user_id)
        .times(1)
        .returning(move |_| Ok(Some(user_row(user_id, "jane@example.com"))));
    role_repo
        .expect_get_roles_for_user()
        .withf(move |id| *id == user_id)
        .times(1)
        .returning(move |_| {
            Ok(vec![RoleRow {
                id: role_id.to_string(),
                name: "editor".to_string(),
            }])
        });

    let service = create_test_service(provider, user_repo, role_repo);
    let entry = service.get_user_with_roles(user_id).await.unwrap();

    assert_eq!(entry.user.email, "jane@example.com");
    assert_eq!(entry.roles.len(), 1);
    assert_eq!(entry.roles[0].name, "editor");
}

#[tokio::test]
async fn test_get_user_with_roles_unknown_id_is_not_found() {
    let provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    user_repo.expect_get_user().times(1).returning(|_| Ok(None));

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.get_user_with_roles(Uuid::new_v4()).await;

    assert!(matches!(result, Err(UserServiceError::NotFound)));
}

#[tokio::test]
async fn test_get_user_not_found() {
    let provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    user_repo.expect_get_user().times(1).returning(|_| Ok(None));

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.get_user(Uuid::new_v4()).await;

    assert!(matches!(result, Err(UserServiceError::NotFound)));
}

// ==================== UPDATE USER TESTS ====================

#[tokio::test]
async fn test_update_user_email_change_syncs_username_and_rotates_stamp() {
    let mut provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let user_id = Uuid::new_v4();
    user_repo
        .expect_get_user()
        .times(1)
        .returning(move |_| Ok(Some(user_row(user_id, "old@example.com"))));

    provider
        .expect_update_user()
        .withf(|user| {
            user.username == "new@example.com"
                && user.email == "new@example.com"
                && user.security_stamp != "stamp-original"
        })
        .times(1)
        .returning(|_| Ok(()));
    provider
        .expect_assign_roles()
        .times(1)
        .returning(|_, _| Ok(()));

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service
        .update_user(update_dto(user_id, "new@example.com"))
        .await
        .unwrap();

    assert!(result.succeeded);
}

#[tokio::test]
async fn test_update_user_same_email_keeps_stamp() {
    let mut provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let user_id = Uuid::new_v4();
    user_repo
        .expect_get_user()
        .times(1)
        .returning(move |_| Ok(Some(user_row(user_id, "same@example.com"))));

    provider
        .expect_update_user()
        .withf(|user| user.security_stamp == "stamp-original")
        .times(1)
        .returning(|_| Ok(()));
    provider
        .expect_assign_roles()
        .times(1)
        .returning(|_, _| Ok(()));

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service
        .update_user(update_dto(user_id, "same@example.com"))
        .await
        .unwrap();

    assert!(result.succeeded);
}

#[tokio::test]
async fn test_update_user_unknown_id_short_circuits() {
    let provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    user_repo.expect_get_user().times(1).returning(|_| Ok(None));

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service
        .update_user(update_dto(Uuid::new_v4(), "any@example.com"))
        .await;

    assert!(matches!(result, Err(UserServiceError::NotFound)));
}

#[tokio::test]
async fn test_update_user_merged_entity_is_revalidated() {
    let provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let user_id = Uuid::new_v4();
    user_repo
        .expect_get_user()
        .times(1)
        .returning(move |_| Ok(Some(user_row(user_id, "old@example.com"))));

    let mut dto = update_dto(user_id, "new@example.com");
    dto.first_name = String::new();

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.update_user(dto).await.unwrap();

    assert!(!result.succeeded);
    assert!(result.field_errors.iter().any(|e| e.field == "first_name"));
}

#[tokio::test]
async fn test_update_user_provider_rejection_comes_back_verbatim() {
    let mut provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let user_id = Uuid::new_v4();
    user_repo
        .expect_get_user()
        .times(1)
        .returning(move |_| Ok(Some(user_row(user_id, "old@example.com"))));

    provider.expect_update_user().times(1).returning(|_| {
        Err(IdentityError::Rejected(vec![ProviderError {
            code: "duplicate_email".to_string(),
            description: "email 'new@example.com' is already in use".to_string(),
        }]))
    });

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service
        .update_user(update_dto(user_id, "new@example.com"))
        .await
        .unwrap();

    assert!(!result.succeeded);
    assert_eq!(result.provider_errors[0].code, "duplicate_email");
}

// ==================== DELETE USER TESTS ====================

#[tokio::test]
async fn test_delete_user_returns_email_for_confirmation() {
    let mut provider = MockProvider::new();
    let user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let user_id = Uuid::new_v4();
    provider
        .expect_find_by_id()
        .withf(move |id| *id == user_id)
        .times(1)
        .returning(move |id| {
            Ok(Some(IdentitySubject {
                id,
                username: "gone@example.com".to_string(),
                email: "gone@example.com".to_string(),
            }))
        });
    // One provider call removes the user and its role links together; the
    // service issues no separate role cleanup (assign_roles has no
    // expectation and would panic if touched).
    provider
        .expect_delete_user()
        .withf(move |id| *id == user_id)
        .times(1)
        .returning(|_| Ok(()));

    let service = create_test_service(provider, user_repo, role_repo);
    let deleted = service.delete_user(user_id).await.unwrap();

    assert!(deleted.result.succeeded);
    assert_eq!(deleted.email, "gone@example.com");
}

#[tokio::test]
async fn test_delete_user_unknown_id_is_not_found() {
    let mut provider = MockProvider::new();
    let user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    provider
        .expect_find_by_id()
        .times(1)
        .returning(|_| Ok(None));

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.delete_user(Uuid::new_v4()).await;

    assert!(matches!(result, Err(UserServiceError::NotFound)));
}

// ==================== PROFILE TESTS ====================

#[tokio::test]
async fn test_get_profile_projects_the_callers_record() {
    let provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let subject_id = Uuid::new_v4();
    user_repo
        .expect_get_user()
        .withf(move |id| *id == subject_id)
        .times(1)
        .returning(move |_| Ok(Some(user_row(subject_id, "me@example.com"))));

    let service = create_test_service(provider, user_repo, role_repo);
    let profile = service.get_profile(subject_id).await.unwrap();

    assert_eq!(profile.email, "me@example.com");
    assert_eq!(profile.first_name, "Jane");
}

#[tokio::test]
async fn test_update_profile_success() {
    let mut provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let subject_id = Uuid::new_v4();
    user_repo
        .expect_get_user()
        .times(1)
        .returning(move |_| Ok(Some(user_row(subject_id, "me@example.com"))));

    provider
        .expect_update_user()
        .withf(move |user| user.id == subject_id)
        .times(1)
        .returning(|_| Ok(()));

    let service = create_test_service(provider, user_repo, role_repo);
    let updated = service
        .update_profile(subject_id, profile_dto("me@example.com"))
        .await
        .unwrap();

    assert!(updated);
}

#[tokio::test]
async fn test_update_profile_only_touches_the_subjects_record() {
    let mut provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let caller = Uuid::new_v4();
    // The dto has no id field at all, so a crafted payload cannot steer
    // the write: only the session subject is ever loaded and persisted.
    user_repo
        .expect_get_user()
        .withf(move |id| *id == caller)
        .times(1)
        .returning(move |_| Ok(Some(user_row(caller, "caller@example.com"))));

    provider
        .expect_update_user()
        .withf(move |user| user.id == caller)
        .times(1)
        .returning(|_| Ok(()));

    let service = create_test_service(provider, user_repo, role_repo);
    let updated = service
        .update_profile(caller, profile_dto("caller@example.com"))
        .await
        .unwrap();

    assert!(updated);
}

#[tokio::test]
async fn test_update_profile_email_change_rotates_stamp() {
    let mut provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let subject_id = Uuid::new_v4();
    user_repo
        .expect_get_user()
        .times(1)
        .returning(move |_| Ok(Some(user_row(subject_id, "old@example.com"))));

    provider
        .expect_update_user()
        .withf(|user| {
            user.username == "new@example.com" && user.security_stamp != "stamp-original"
        })
        .times(1)
        .returning(|_| Ok(()));

    let service = create_test_service(provider, user_repo, role_repo);
    let updated = service
        .update_profile(subject_id, profile_dto("new@example.com"))
        .await
        .unwrap();

    assert!(updated);
}

#[tokio::test]
async fn test_update_profile_validation_failure_reads_false() {
    let provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let subject_id = Uuid::new_v4();
    user_repo
        .expect_get_user()
        .times(1)
        .returning(move |_| Ok(Some(user_row(subject_id, "me@example.com"))));

    let mut dto = profile_dto("me@example.com");
    dto.first_name = String::new();

    let service = create_test_service(provider, user_repo, role_repo);
    let updated = service.update_profile(subject_id, dto).await.unwrap();

    assert!(!updated);
}

#[tokio::test]
async fn test_update_profile_provider_rejection_reads_false() {
    let mut provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    let subject_id = Uuid::new_v4();
    user_repo
        .expect_get_user()
        .times(1)
        .returning(move |_| Ok(Some(user_row(subject_id, "me@example.com"))));

    provider.expect_update_user().times(1).returning(|_| {
        Err(IdentityError::Rejected(vec![ProviderError {
            code: "duplicate_email".to_string(),
            description: "taken".to_string(),
        }]))
    });

    let service = create_test_service(provider, user_repo, role_repo);
    let updated = service
        .update_profile(subject_id, profile_dto("me@example.com"))
        .await
        .unwrap();

    assert!(!updated);
}

// ==================== LISTING TESTS ====================

#[tokio::test]
async fn test_get_users_with_roles_batches_role_lookup() {
    let provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let mut role_repo = MockRoleRepo::new();

    let user1_id = Uuid::new_v4();
    let user2_id = Uuid::new_v4();
    let role_id = Uuid::new_v4();

    user_repo.expect_get_users().times(1).returning(move || {
        Ok(vec![
            user_row(user1_id, "one@example.com"),
            user_row(user2_id, "two@example.com"),
        ])
    });

    role_repo
        .expect_get_roles_for_users()
        .times(1)
        .returning(move |_| {
            Ok(vec![UserRoleMapping {
                user_id: user1_id.to_string(),
                role_id: role_id.to_string(),
                role_name: "admin".to_string(),
            }])
        });

    let service = create_test_service(provider, user_repo, role_repo);
    let users = service.get_users_with_roles().await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].user.email, "one@example.com");
    assert_eq!(users[0].roles.len(), 1);
    assert_eq!(users[0].roles[0].name, "admin");
    assert!(users[1].roles.is_empty());
}

#[tokio::test]
async fn test_get_users_with_roles_empty() {
    let provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    user_repo.expect_get_users().times(1).returning(|| Ok(vec![]));

    let service = create_test_service(provider, user_repo, role_repo);
    let users = service.get_users_with_roles().await.unwrap();

    assert!(users.is_empty());
}

#[tokio::test]
async fn test_get_roles_success() {
    let provider = MockProvider::new();
    let user_repo = MockUserRepo::new();
    let mut role_repo = MockRoleRepo::new();

    let role1_id = Uuid::new_v4();
    let role2_id = Uuid::new_v4();

    role_repo.expect_get_roles().times(1).returning(move || {
        Ok(vec![
            RoleRow {
                id: role1_id.to_string(),
                name: "admin".to_string(),
            },
            RoleRow {
                id: role2_id.to_string(),
                name: "editor".to_string(),
            },
        ])
    });

    let service = create_test_service(provider, user_repo, role_repo);
    let roles = service.get_roles().await.unwrap();

    assert_eq!(roles.len(), 2);
    assert_eq!(roles[0].name, "admin");
    assert_eq!(roles[1].name, "editor");
}

#[tokio::test]
async fn test_bad_uuid_in_store_is_reported() {
    let provider = MockProvider::new();
    let mut user_repo = MockUserRepo::new();
    let role_repo = MockRoleRepo::new();

    user_repo.expect_get_user().times(1).returning(|_| {
        let mut row = user_row(Uuid::new_v4(), "jane@example.com");
        row.id = "definitely-not-a-uuid".to_string();
        Ok(Some(row))
    });

    let service = create_test_service(provider, user_repo, role_repo);
    let result = service.get_user(Uuid::new_v4()).await;

    assert!(matches!(result, Err(UserServiceError::InvalidUuid(_))));
}
