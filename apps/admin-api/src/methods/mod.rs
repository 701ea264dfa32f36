pub mod add_user;
pub mod delete_user;
pub mod entities;
pub mod get_profile;
pub mod get_user_by_id;
pub mod health_check;
pub mod list_roles;
pub mod list_users;
pub mod routes;
pub mod update_profile;
pub mod update_user;
