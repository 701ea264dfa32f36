use secrecy::Secret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;

use account_lib::dto::{UserAddDto, UserProfileDto, UserUpdateDto};
use account_lib::entities::{AppUser, ProfileView, Role, UserWithRoles};
use account_lib::result::{DeletedUser, FieldError, OperationResult, ProviderError};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddUserRequest {
    pub email: String,
    #[schema(value_type = String)]
    pub password: Secret<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

impl From<AddUserRequest> for UserAddDto {
    fn from(req: AddUserRequest) -> Self {
        UserAddDto {
            email: req.email,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            role_ids: req.role_ids,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

impl UpdateUserRequest {
    pub fn into_dto(self, id: Uuid) -> UserUpdateDto {
        UserUpdateDto {
            id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            role_ids: self.role_ids,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_id: Option<Uuid>,
}

impl From<UpdateProfileRequest> for UserProfileDto {
    fn from(req: UpdateProfileRequest) -> Self {
        UserProfileDto {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            image_id: req.image_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_id: Option<Uuid>,
}

impl From<AppUser> for UserResponse {
    fn from(user: AppUser) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            image_id: user.image_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        RoleResponse {
            id: role.id,
            name: role.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserWithRolesResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub roles: Vec<RoleResponse>,
    pub article_count: i64,
}

impl From<UserWithRoles> for UserWithRolesResponse {
    fn from(entry: UserWithRoles) -> Self {
        UserWithRolesResponse {
            user: UserResponse::from(entry.user),
            roles: entry.roles.into_iter().map(RoleResponse::from).collect(),
            article_count: entry.article_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub image_id: Option<Uuid>,
}

impl From<ProfileView> for ProfileResponse {
    fn from(view: ProfileView) -> Self {
        ProfileResponse {
            email: view.email,
            first_name: view.first_name,
            last_name: view.last_name,
            image_id: view.image_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldErrorBody {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProviderErrorBody {
    pub code: String,
    pub description: String,
}

/// Wire shape of `OperationResult`: callers re-render their form from the
/// two error collections.
#[derive(Debug, Serialize, ToSchema)]
pub struct OperationResponse {
    pub succeeded: bool,
    pub field_errors: Vec<FieldErrorBody>,
    pub provider_errors: Vec<ProviderErrorBody>,
}

impl From<OperationResult> for OperationResponse {
    fn from(result: OperationResult) -> Self {
        OperationResponse {
            succeeded: result.succeeded,
            field_errors: result
                .field_errors
                .into_iter()
                .map(|FieldError { field, message }| FieldErrorBody { field, message })
                .collect(),
            provider_errors: result
                .provider_errors
                .into_iter()
                .map(|ProviderError { code, description }| ProviderErrorBody {
                    code,
                    description,
                })
                .collect(),
        }
    }
}

/// Delete confirmation: the removed account's email for the success toast.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedUserResponse {
    pub email: String,
    #[serde(flatten)]
    pub result: OperationResponse,
}

impl From<DeletedUser> for DeletedUserResponse {
    fn from(deleted: DeletedUser) -> Self {
        DeletedUserResponse {
            email: deleted.email,
            result: OperationResponse::from(deleted.result),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileUpdateResponse {
    pub updated: bool,
}
