//! Setup orchestrator
//!
//! Walks the ordered setup instructions: interpret each into actions, then
//! execute the actions in order against the shared page. A failed action
//! always aborts the rest of its own instruction; whether it aborts the
//! whole run is a policy choice.

use std::sync::Arc;
use tracing::{info, warn};

use crate::browser::PageHandle;
use crate::core::Result;
use crate::llm::LlmClient;
use crate::setup::executor::Executor;
use crate::setup::interpreter::Interpreter;
use crate::setup::vocabulary::ActionVocabulary;

/// What to do when an action exhausts its strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the failure and abort the fetch
    FailFast,
    /// Drop the rest of the failed instruction, continue with the next one
    SkipInstruction,
}

/// Runs an ordered setup sequence against one page
pub struct Orchestrator {
    interpreter: Interpreter,
    executor: Executor,
    vocabulary: ActionVocabulary,
    policy: FailurePolicy,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        executor: Executor,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            interpreter: Interpreter::new(llm),
            executor,
            vocabulary: ActionVocabulary::standard(),
            policy,
        }
    }

    /// Interpret and execute every instruction in order.
    ///
    /// Model transport errors always propagate. Action failures follow the
    /// configured policy. An instruction that interprets to no actions is
    /// logged and has no effect.
    pub async fn run(&self, instructions: &[String], page: &dyn PageHandle) -> Result<()> {
        for (index, instruction) in instructions.iter().enumerate() {
            info!(step = index + 1, instruction = %instruction, "running setup instruction");
            let actions = self.interpreter.interpret(instruction, &self.vocabulary).await?;
            if actions.is_empty() {
                info!(step = index + 1, "instruction produced no actions");
                continue;
            }

            for action in &actions {
                if let Err(e) = self.executor.execute(action, page).await {
                    match self.policy {
                        FailurePolicy::FailFast => return Err(e),
                        FailurePolicy::SkipInstruction => {
                            warn!(step = index + 1, error = %e, "instruction failed, skipping its remaining actions");
                            break;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
