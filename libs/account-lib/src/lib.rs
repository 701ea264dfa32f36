pub mod dto;
pub mod entities;
pub mod errors_service;
pub mod mapper;
pub mod provider;
pub mod repository;
pub mod result;
pub mod user_service;
pub mod util;
pub mod validation;

pub use entities::*;
pub use errors_service::*;
pub use result::*;
pub use user_service::*;
