//! All AI/LLM functionality

pub mod auth;
pub mod client;
pub mod prompt_builder;

// Re-export main types for convenience
pub use auth::{Credential, CredentialSource};
pub use client::{VertexClient, parse_summary};
