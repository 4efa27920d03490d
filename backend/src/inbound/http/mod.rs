//! HTTP inbound adapter exposing the REST endpoints.

pub mod activity;
pub mod auth;
pub mod error;
pub mod health;
pub mod jobs;
pub mod reports;
pub mod sms;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
