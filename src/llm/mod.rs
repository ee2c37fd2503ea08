//! LLM module - model client abstraction and the Gemini implementation

pub mod gemini;
pub mod traits;

pub use gemini::GeminiClient;
pub use traits::LlmClient;
