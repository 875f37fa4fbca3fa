pub mod admin;
pub mod alias;
pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod league;
pub mod mailer;
pub mod picks;
pub mod query;
pub mod results;

pub use config::Settings;
pub use mailer::MagicLinkMailer;

pub use sea_orm;
