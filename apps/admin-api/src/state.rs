use std::sync::Arc;

use account_lib::provider::IdentityProviderTrait;
use account_lib::repository::traits::{RoleRepositoryTrait, UserRepositoryTrait};
use account_lib::repository::{RoleRepository, UserRepository};
use account_lib::user_service::UserService;

use crate::identity::HttpIdentityProvider;

#[derive(Clone)]
pub struct AppState<P = HttpIdentityProvider, U = UserRepository, R = RoleRepository>
where
    P: IdentityProviderTrait + Send + Sync + 'static,
    U: UserRepositoryTrait + Send + Sync + 'static,
    R: RoleRepositoryTrait + Send + Sync + 'static,
{
    pub user_service: Arc<UserService<P, U, R>>,
    pub env: String,
}
