//! LLM client trait for abstracting model backends
//!
//! The interpreter only needs one completion shape: system directive plus
//! user prompt in, untrusted text out. Implementations own their transport.

use async_trait::async_trait;

use crate::core::Result;

/// Trait for language model backends
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a system directive and user prompt, returning the raw response
    /// text. No guarantee is made about the output format; callers must treat
    /// it as untrusted.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;

    /// Get the backend name
    fn name(&self) -> &str;
}
