use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::dto::{UserAddDto, UserProfileDto, UserUpdateDto};
use crate::entities::{AppUser, ProfileView, Role, UserWithRoles};
use crate::errors_service::UserServiceError;
use crate::mapper;
use crate::provider::{IdentityError, IdentityProviderTrait};
use crate::repository::models::{RoleRow, UserRoleMapping, UserRow};
use crate::repository::traits::{RoleRepositoryTrait, UserRepositoryTrait};
use crate::repository::{RoleRepository, UserRepository};
use crate::result::{DeletedUser, FieldError, OperationResult};
use crate::validation::validate_user;

fn parse_uuid(s: &str) -> Result<Uuid, UserServiceError> {
    Uuid::parse_str(s).map_err(|_| UserServiceError::InvalidUuid(s.to_string()))
}

fn role_from_row(row: RoleRow) -> Result<Role, UserServiceError> {
    Ok(Role {
        id: parse_uuid(&row.id)?,
        name: row.name,
    })
}

fn role_from_mapping(mapping: UserRoleMapping) -> Result<(String, Role), UserServiceError> {
    let role = Role {
        id: parse_uuid(&mapping.role_id)?,
        name: mapping.role_name,
    };
    Ok((mapping.user_id, role))
}

fn user_from_row(row: &UserRow) -> Result<AppUser, UserServiceError> {
    let image_id = match &row.image_id {
        Some(id) => Some(parse_uuid(id)?),
        None => None,
    };
    Ok(AppUser {
        id: parse_uuid(&row.id)?,
        username: row.username.clone(),
        email: row.email.clone(),
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        image_id,
        security_stamp: row.security_stamp.clone(),
    })
}

/// Single orchestration point for the user lifecycle. Every mutating
/// operation is a linear pipeline: validate, delegate to the identity
/// provider, interpret the outcome. Failures are reported through
/// `OperationResult`; only "record not found" short-circuits earlier.
#[derive(Debug, Clone)]
pub struct UserService<P, U = UserRepository, R = RoleRepository>
where
    P: IdentityProviderTrait,
    U: UserRepositoryTrait,
    R: RoleRepositoryTrait,
{
    pub provider: Arc<P>,
    pub user_repo: Arc<U>,
    pub role_repo: Arc<R>,
}

impl<P, U, R> UserService<P, U, R>
where
    P: IdentityProviderTrait,
    U: UserRepositoryTrait,
    R: RoleRepositoryTrait,
{
    pub fn new(provider: Arc<P>, user_repo: Arc<U>, role_repo: Arc<R>) -> Self {
        Self {
            provider,
            user_repo,
            role_repo,
        }
    }

    async fn build_users_with_roles(
        &self,
        user_rows: Vec<UserRow>,
    ) -> Result<Vec<UserWithRoles>, UserServiceError> {
        if user_rows.is_empty() {
            return Ok(vec![]);
        }

        let user_ids: Vec<String> = user_rows.iter().map(|r| r.id.clone()).collect();
        let role_mappings = self
            .role_repo
            .get_roles_for_users(&user_ids)
            .await
            .map_err(UserServiceError::from)?;

        let mut roles_by_user: HashMap<String, Vec<Role>> = HashMap::new();
        for mapping in role_mappings {
            let (user_id, role) = role_from_mapping(mapping)?;
            roles_by_user.entry(user_id).or_default().push(role);
        }

        user_rows
            .iter()
            .map(|row| {
                let roles = roles_by_user.remove(&row.id).unwrap_or_default();
                Ok(UserWithRoles {
                    user: user_from_row(row)?,
                    roles,
                    article_count: row.article_count,
                })
            })
            .collect()
    }

    /// Selected roles must exist before any assignment is attempted.
    async fn missing_role_errors(
        &self,
        role_ids: &[Uuid],
    ) -> Result<Vec<FieldError>, UserServiceError> {
        if role_ids.is_empty() {
            return Ok(vec![]);
        }
        // Assignment is a set operation; repeated ids must not fail the
        // count comparison.
        let mut unique = role_ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let existing = self
            .role_repo
            .count_existing(&unique)
            .await
            .map_err(UserServiceError::from)?;
        if existing as usize != unique.len() {
            return Ok(vec![FieldError {
                field: "role_ids".to_string(),
                message: "one or more selected roles do not exist".to_string(),
            }]);
        }
        Ok(vec![])
    }

    pub async fn get_users_with_roles(&self) -> Result<Vec<UserWithRoles>, UserServiceError> {
        let rows = self
            .user_repo
            .get_users()
            .await
            .map_err(UserServiceError::from)?;
        self.build_users_with_roles(rows).await
    }

    pub async fn get_roles(&self) -> Result<Vec<Role>, UserServiceError> {
        self.role_repo
            .get_roles()
            .await
            .map_err(UserServiceError::from)?
            .into_iter()
            .map(role_from_row)
            .collect()
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<AppUser, UserServiceError> {
        let row = self
            .user_repo
            .get_user(user_id)
            .await
            .map_err(UserServiceError::from)?
            .ok_or(UserServiceError::NotFound)?;
        user_from_row(&row)
    }

    /// Single user plus their current role set, as the populated update
    /// form needs it.
    pub async fn get_user_with_roles(
        &self,
        user_id: Uuid,
    ) -> Result<UserWithRoles, UserServiceError> {
        let row = self
            .user_repo
            .get_user(user_id)
            .await
            .map_err(UserServiceError::from)?
            .ok_or(UserServiceError::NotFound)?;
        let roles = self
            .role_repo
            .get_roles_for_user(user_id)
            .await
            .map_err(UserServiceError::from)?
            .into_iter()
            .map(role_from_row)
            .collect::<Result<Vec<Role>, UserServiceError>>()?;

        Ok(UserWithRoles {
            user: user_from_row(&row)?,
            roles,
            article_count: row.article_count,
        })
    }

    /// Map, validate, then delegate creation (including password hashing)
    /// to the identity provider. The provider is never touched on a
    /// validation failure; provider rejections come back verbatim.
    pub async fn create_user(
        &self,
        dto: UserAddDto,
    ) -> Result<OperationResult, UserServiceError> {
        let user = mapper::from_add_dto(&dto);

        let mut field_errors = validate_user(&user);
        field_errors.extend(self.missing_role_errors(&dto.role_ids).await?);
        if !field_errors.is_empty() {
            return Ok(OperationResult::invalid(field_errors));
        }

        match self.provider.create_user(&user, &dto.password).await {
            Ok(()) => {}
            Err(IdentityError::Rejected(errors)) => {
                return Ok(OperationResult::rejected(errors));
            }
            Err(other) => return Err(other.into()),
        }

        if !dto.role_ids.is_empty() {
            match self.provider.assign_roles(user.id, &dto.role_ids).await {
                Ok(()) => {}
                Err(IdentityError::Rejected(errors)) => {
                    return Ok(OperationResult::rejected(errors));
                }
                Err(other) => return Err(other.into()),
            }
        }

        tracing::info!(user_id = %user.id, email = %user.email, "user created");
        Ok(OperationResult::success())
    }

    /// Load, overwrite mapped fields, revalidate the merged entity, then
    /// persist. An email change re-derives the username and rotates the
    /// security stamp, invalidating sessions tied to the old one.
    pub async fn update_user(
        &self,
        dto: UserUpdateDto,
    ) -> Result<OperationResult, UserServiceError> {
        let row = self
            .user_repo
            .get_user(dto.id)
            .await
            .map_err(UserServiceError::from)?
            .ok_or(UserServiceError::NotFound)?;
        let mut user = user_from_row(&row)?;
        let previous_email = user.email.clone();

        mapper::apply_update(&mut user, &dto);

        let mut field_errors = validate_user(&user);
        field_errors.extend(self.missing_role_errors(&dto.role_ids).await?);
        if !field_errors.is_empty() {
            return Ok(OperationResult::invalid(field_errors));
        }

        if user.email != previous_email {
            user.username = user.email.clone();
            user.security_stamp = Uuid::new_v4().to_string();
        }

        match self.provider.update_user(&user).await {
            Ok(()) => {}
            Err(IdentityError::Rejected(errors)) => {
                return Ok(OperationResult::rejected(errors));
            }
            Err(other) => return Err(other.into()),
        }

        match self.provider.assign_roles(user.id, &dto.role_ids).await {
            Ok(()) => {}
            Err(IdentityError::Rejected(errors)) => {
                return Ok(OperationResult::rejected(errors));
            }
            Err(other) => return Err(other.into()),
        }

        tracing::info!(user_id = %user.id, email = %user.email, "user updated");
        Ok(OperationResult::success())
    }

    /// Delete through the provider, which removes role associations in the
    /// same transaction. Returns the removed email for confirmation
    /// messaging.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<DeletedUser, UserServiceError> {
        let subject = self
            .provider
            .find_by_id(user_id)
            .await
            .map_err(UserServiceError::from)?
            .ok_or(UserServiceError::NotFound)?;

        match self.provider.delete_user(user_id).await {
            Ok(()) => {
                tracing::info!(user_id = %user_id, email = %subject.email, "user deleted");
                Ok(DeletedUser {
                    email: subject.email,
                    result: OperationResult::success(),
                })
            }
            Err(IdentityError::Rejected(errors)) => Ok(DeletedUser {
                email: subject.email,
                result: OperationResult::rejected(errors),
            }),
            Err(other) => Err(other.into()),
        }
    }

    /// Resolve the caller's own record. The subject id comes from the
    /// session context, never from request data.
    pub async fn get_profile(&self, subject_id: Uuid) -> Result<ProfileView, UserServiceError> {
        let user = self.get_user(subject_id).await?;
        Ok(ProfileView {
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            image_id: user.image_id,
        })
    }

    /// Same merge/revalidate/persist sequence as `update_user`, scoped to
    /// the caller's record. Reports a bare boolean: validation and provider
    /// rejections both read as `false`.
    pub async fn update_profile(
        &self,
        subject_id: Uuid,
        dto: UserProfileDto,
    ) -> Result<bool, UserServiceError> {
        let row = self
            .user_repo
            .get_user(subject_id)
            .await
            .map_err(UserServiceError::from)?
            .ok_or(UserServiceError::NotFound)?;
        let mut user = user_from_row(&row)?;
        let previous_email = user.email.clone();

        mapper::apply_profile(&mut user, &dto);

        if !validate_user(&user).is_empty() {
            return Ok(false);
        }

        if user.email != previous_email {
            user.username = user.email.clone();
            user.security_stamp = Uuid::new_v4().to_string();
        }

        match self.provider.update_user(&user).await {
            Ok(()) => {
                tracing::info!(user_id = %user.id, "profile updated");
                Ok(true)
            }
            Err(IdentityError::Rejected(_)) => Ok(false),
            Err(other) => Err(other.into()),
        }
    }
}
