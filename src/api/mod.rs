//! Backend API plumbing: transport, session tokens, and the error taxonomy.

mod auth;
mod client;
mod error;

pub use auth::{EnvTokenProvider, NoTokenProvider, StaticTokenProvider, TokenProvider};
pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
