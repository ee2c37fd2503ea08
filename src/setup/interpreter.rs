//! Instruction interpreter
//!
//! Sends one natural-language setup instruction plus the action vocabulary to
//! the language model and parses the response into structured actions. The
//! model output is untrusted: code fences and prose wrapping are tolerated,
//! and an irrecoverably malformed response degrades to an empty action list
//! rather than an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::core::Result;
use crate::llm::LlmClient;
use crate::setup::vocabulary::ActionVocabulary;

/// A single parsed browser action.
///
/// Params are not validated against the vocabulary schema here; the executor
/// treats missing or extra params defensively.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StructuredAction {
    /// Tool name drawn from the vocabulary
    pub tool: String,
    /// Free-form parameter map
    #[serde(default)]
    pub params: serde_json::Map<String, Value>,
}

impl StructuredAction {
    /// String parameter by key, if present
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }

    /// Numeric parameter by key, accepting a number or a numeric string
    pub fn param_u64(&self, key: &str) -> Option<u64> {
        match self.params.get(key)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

const SYSTEM_DIRECTIVE: &str = "You translate a user's browser instruction into a JSON array of \
actions. Respond with JSON only: no markdown, no code fences, no explanations. Each action is an \
object with a \"tool\" field naming one of the available tools and a \"params\" object.";

/// Translates free-text instructions into ordered action sequences
pub struct Interpreter {
    llm: Arc<dyn LlmClient>,
}

impl Interpreter {
    /// Create an interpreter backed by the given model client
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Interpret one instruction against the full vocabulary.
    ///
    /// Model transport errors propagate. Parse failures yield an empty
    /// sequence so one garbled response cannot sink the rest of the setup
    /// sequence.
    pub async fn interpret(
        &self,
        instruction: &str,
        vocabulary: &ActionVocabulary,
    ) -> Result<Vec<StructuredAction>> {
        let user_prompt = format!(
            "Available tools:\n{}\nInstruction: {}\n\n\
             Return a JSON array of actions that accomplish the instruction.",
            vocabulary.prompt_block(),
            instruction
        );

        let raw = self.llm.complete(SYSTEM_DIRECTIVE, &user_prompt).await?;
        let actions = parse_actions(&raw);
        if actions.is_empty() {
            debug!(instruction, "instruction interpreted to no actions");
        }
        Ok(actions)
    }
}

/// Parse a raw model response into an ordered action sequence.
///
/// Pipeline: fence extraction, JSON parse, then normalization of the three
/// accepted shapes (array, `{"actions": [...]}`, single action object). Any
/// parse failure yields an empty sequence.
pub fn parse_actions(raw: &str) -> Vec<StructuredAction> {
    let text = extract_fenced_block(raw).unwrap_or_else(|| raw.trim().to_string());

    let value: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            debug!("discarding unparseable model response: {}", e);
            return Vec::new();
        }
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("actions") {
            Some(Value::Array(items)) => items,
            Some(other) => vec![other],
            None => vec![Value::Object(map)],
        },
        other => vec![other],
    };

    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<StructuredAction>(item).ok())
        .collect()
}

/// Extract the interior of the first fenced code block, if any.
///
/// A leading language tag on the opening fence line is dropped.
fn extract_fenced_block(raw: &str) -> Option<String> {
    let start = raw.find("```")?;
    let rest = &raw[start + 3..];
    let end = rest.rfind("```")?;
    if end == 0 {
        return None;
    }
    let mut body = &rest[..end];
    if let Some(newline) = body.find('\n') {
        let tag = body[..newline].trim();
        if !tag.is_empty() && tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            body = &body[newline + 1..];
        }
    }
    Some(body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_array_parses_in_order() {
        let raw = r#"[{"tool":"click","params":{"selector":"Login"}},
                      {"tool":"fill","params":{"selector":"email","value":"a@b.c"}}]"#;
        let actions = parse_actions(raw);
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].tool, "click");
        assert_eq!(actions[1].tool, "fill");
        assert_eq!(actions[1].param_str("value"), Some("a@b.c"));
    }

    #[test]
    fn test_actions_key_is_unwrapped() {
        let raw = r#"{"actions":[{"tool":"scroll","params":{"direction":"down"}}]}"#;
        let actions = parse_actions(raw);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].tool, "scroll");
    }

    #[test]
    fn test_single_object_is_wrapped() {
        let raw = r#"{"tool":"press","params":{"key":"Enter"}}"#;
        let actions = parse_actions(raw);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].tool, "press");
    }

    #[test]
    fn test_fenced_block_equals_unfenced() {
        let unfenced = r##"[{"tool":"click","params":{"selector":"#go"}}]"##;
        let fenced = format!("Here you go:\n```json\n{}\n```", unfenced);
        assert_eq!(parse_actions(&fenced), parse_actions(unfenced));
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n[{\"tool\":\"wait\",\"params\":{\"duration\":500}}]\n```";
        let actions = parse_actions(raw);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].param_u64("duration"), Some(500));
    }

    #[test]
    fn test_malformed_response_yields_empty() {
        assert!(parse_actions("I could not determine any actions.").is_empty());
        assert!(parse_actions("```json\nnot json at all\n```").is_empty());
        assert!(parse_actions("").is_empty());
    }

    #[test]
    fn test_items_without_tool_are_skipped() {
        let raw = r#"[{"tool":"click","params":{}},{"params":{"selector":"x"}}]"#;
        let actions = parse_actions(raw);
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn test_param_u64_accepts_numeric_string() {
        let raw = r#"[{"tool":"wait","params":{"duration":"1500"}}]"#;
        let actions = parse_actions(raw);
        assert_eq!(actions[0].param_u64("duration"), Some(1500));
    }
}
