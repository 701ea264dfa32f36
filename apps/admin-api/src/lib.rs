pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod methods;
pub mod shutdown;
pub mod state;
