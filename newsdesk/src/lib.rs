// Library interface for newsdesk modules
// This allows tests and the binary to import modules

pub mod admin;
pub mod cli;
pub mod client;
pub mod error;
pub mod models;
pub mod proxy;
pub mod public;
pub mod query;

pub use admin::AdminApi;
pub use client::ApiClient;
pub use error::{ApiError, Result};
pub use public::PublicApi;
