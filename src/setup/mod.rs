//! Setup module - turns free-text instructions into executed browser actions

pub mod executor;
pub mod interpreter;
pub mod orchestrator;
pub mod vocabulary;

pub use executor::Executor;
pub use interpreter::{Interpreter, StructuredAction};
pub use orchestrator::{FailurePolicy, Orchestrator};
pub use vocabulary::{ActionVocabulary, VocabularyEntry};
