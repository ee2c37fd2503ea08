//! Action vocabulary
//!
//! The fixed, closed catalog of browser operations the interpreter is allowed
//! to emit. Pure data: names, descriptions, and parameter constraints, always
//! presented to the model in full.

/// One browser operation the model may request
#[derive(Debug, Clone, Copy)]
pub struct VocabularyEntry {
    /// Unique tool name
    pub name: &'static str,
    /// What the operation does, phrased for the model
    pub description: &'static str,
    /// Parameter name paired with its human-readable constraint
    pub params: &'static [(&'static str, &'static str)],
}

/// The static, process-wide catalog
#[derive(Debug, Clone)]
pub struct ActionVocabulary {
    entries: Vec<VocabularyEntry>,
}

impl ActionVocabulary {
    /// The standard catalog of supported browser operations
    pub fn standard() -> Self {
        Self {
            entries: vec![
                VocabularyEntry {
                    name: "click",
                    description: "Click a button, link, or other element on the page",
                    params: &[(
                        "selector",
                        "CSS selector, visible text, or aria-label of the element",
                    )],
                },
                VocabularyEntry {
                    name: "fill",
                    description: "Type text into an input field or textarea",
                    params: &[
                        (
                            "selector",
                            "CSS selector, placeholder text, or name attribute of the field",
                        ),
                        ("value", "The text to type"),
                    ],
                },
                VocabularyEntry {
                    name: "select",
                    description: "Choose an option from a dropdown",
                    params: &[
                        ("selector", "CSS selector of the <select> element"),
                        ("value", "The option value to choose"),
                    ],
                },
                VocabularyEntry {
                    name: "navigate",
                    description: "Go to a different URL",
                    params: &[("url", "Absolute URL to navigate to")],
                },
                VocabularyEntry {
                    name: "wait",
                    description: "Wait for an element to appear, or for a fixed duration",
                    params: &[
                        ("selector", "CSS selector to wait for (optional)"),
                        ("duration", "Milliseconds to wait when no selector is given"),
                    ],
                },
                VocabularyEntry {
                    name: "scroll",
                    description: "Scroll the page or bring an element into view",
                    params: &[
                        ("selector", "CSS selector to scroll to (optional)"),
                        ("direction", "One of: down, up, bottom, top"),
                    ],
                },
                VocabularyEntry {
                    name: "hover",
                    description: "Hover the pointer over an element",
                    params: &[("selector", "CSS selector of the element")],
                },
                VocabularyEntry {
                    name: "press",
                    description: "Press a keyboard key",
                    params: &[("key", "Key name, e.g. Enter, Tab, Escape")],
                },
            ],
        }
    }

    /// All entries in catalog order
    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    /// Look up an entry by tool name
    pub fn get(&self, name: &str) -> Option<&VocabularyEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Whether a tool name is part of the catalog
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Render the catalog as a prompt block for the model
    pub fn prompt_block(&self) -> String {
        let mut block = String::new();
        for entry in &self.entries {
            block.push_str(&format!("- {}: {}\n", entry.name, entry.description));
            for (param, constraint) in entry.params {
                block.push_str(&format!("    {}: {}\n", param, constraint));
            }
        }
        block
    }
}

impl Default for ActionVocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_names_are_unique() {
        let vocabulary = ActionVocabulary::standard();
        let mut names: Vec<&str> = vocabulary.entries().iter().map(|e| e.name).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn test_catalog_contains_core_tools() {
        let vocabulary = ActionVocabulary::standard();
        for tool in ["click", "fill", "select", "navigate", "wait", "scroll", "hover", "press"] {
            assert!(vocabulary.contains(tool), "missing tool: {}", tool);
        }
        assert!(!vocabulary.contains("screenshot"));
    }

    #[test]
    fn test_prompt_block_lists_every_tool() {
        let vocabulary = ActionVocabulary::standard();
        let block = vocabulary.prompt_block();
        for entry in vocabulary.entries() {
            assert!(block.contains(entry.name));
        }
    }
}
