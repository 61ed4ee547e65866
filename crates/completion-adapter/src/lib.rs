//! A [`quota_generator::BatchAdapter`] that prompts a hosted text-completion
//! model and parses the JSON array in its reply.
//!
//! Overload, rate limiting, server errors, network failures and replies
//! without a parseable array are transient. Refused credentials and other
//! client errors are fatal.

pub mod client;
pub mod error;
pub mod extract;
pub mod prompt;

pub use client::{AnthropicAdapter, CompletionConfig, API_VERSION, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::CompletionError;
pub use extract::extract_json_array;
pub use prompt::{render_exclusions, PromptTemplate};
