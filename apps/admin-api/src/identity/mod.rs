mod client;
mod config;
mod models;

pub use client::HttpIdentityProvider;
pub use config::IdentityConfig;
