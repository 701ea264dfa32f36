pub mod errors;
pub mod models;
pub mod role_repository;
pub mod traits;
pub mod user_repository;

pub use role_repository::RoleRepository;
pub use user_repository::UserRepository;
