//! Action executor
//!
//! Applies one structured action to a live page. Element targeting works
//! through ordered strategy tables: each strategy is a pure transform from
//! the raw selector hint to a concrete query, tried in priority order with a
//! per-attempt timeout until one both resolves and completes the interaction.

use tracing::{debug, warn};

use crate::browser::{PageHandle, ScrollDirection, Target};
use crate::core::{BrowserConfig, FetchError, Result};
use crate::setup::interpreter::StructuredAction;
use crate::setup::vocabulary::ActionVocabulary;

/// A named targeting strategy. Returns `None` when the strategy does not
/// apply to this hint at all.
type Strategy = (&'static str, fn(&str) -> Option<Target>);

/// Click strategies in fixed priority order
const CLICK_STRATEGIES: &[Strategy] = &[
    ("selector-like", selector_like),
    ("exact-text", exact_text),
    ("text-regex", text_regex),
    ("link-text", link_text),
    ("button-text", button_text),
    ("aria-label", aria_label),
    ("raw-selector", raw_selector),
];

/// Fill strategies in fixed priority order
const FILL_STRATEGIES: &[Strategy] = &[
    ("raw-selector", raw_selector),
    ("placeholder", input_placeholder),
    ("name-attr", name_attribute),
    ("textarea-placeholder", textarea_placeholder),
];

fn selector_like(hint: &str) -> Option<Target> {
    if hint.starts_with('#') || hint.starts_with('.') || hint.starts_with('[') || hint.contains('>')
    {
        Some(Target::Css(hint.to_string()))
    } else {
        None
    }
}

fn exact_text(hint: &str) -> Option<Target> {
    let text = js_quote(hint);
    Some(Target::Script(format!(
        "(() => {{ const t = {text}; \
         for (const el of document.querySelectorAll('*')) {{ \
           if (el.children.length === 0 && el.textContent.trim() === t) return el; \
         }} return null; }})()"
    )))
}

fn text_regex(hint: &str) -> Option<Target> {
    let pattern = js_quote(&regex_escape(hint));
    Some(Target::Script(format!(
        "(() => {{ const re = new RegExp({pattern}, 'i'); \
         for (const el of document.querySelectorAll('*')) {{ \
           if (el.children.length === 0 && re.test(el.textContent)) return el; \
         }} return null; }})()"
    )))
}

fn link_text(hint: &str) -> Option<Target> {
    contains_text("a", hint)
}

fn button_text(hint: &str) -> Option<Target> {
    contains_text(
        "button, [role=\"button\"], input[type=\"submit\"], input[type=\"button\"]",
        hint,
    )
}

fn aria_label(hint: &str) -> Option<Target> {
    let text = js_quote(hint);
    Some(Target::Script(format!(
        "(() => {{ const t = {text}.toLowerCase(); \
         for (const el of document.querySelectorAll('[aria-label]')) {{ \
           if (el.getAttribute('aria-label').toLowerCase().includes(t)) return el; \
         }} return null; }})()"
    )))
}

fn raw_selector(hint: &str) -> Option<Target> {
    Some(Target::Css(hint.to_string()))
}

fn input_placeholder(hint: &str) -> Option<Target> {
    Some(Target::Css(format!(
        "input[placeholder*=\"{}\"]",
        css_attr(hint)
    )))
}

fn name_attribute(hint: &str) -> Option<Target> {
    Some(Target::Css(format!("[name=\"{}\"]", css_attr(hint))))
}

fn textarea_placeholder(hint: &str) -> Option<Target> {
    Some(Target::Css(format!(
        "textarea[placeholder*=\"{}\"]",
        css_attr(hint)
    )))
}

/// Case-insensitive "element containing this text" query over a selector group
fn contains_text(group: &str, hint: &str) -> Option<Target> {
    let group = js_quote(group);
    let text = js_quote(hint);
    Some(Target::Script(format!(
        "(() => {{ const t = {text}.toLowerCase(); \
         for (const el of document.querySelectorAll({group})) {{ \
           const body = el.textContent || el.value || ''; \
           if (body.toLowerCase().includes(t)) return el; \
         }} return null; }})()"
    )))
}

/// Quote a string for embedding in a JS expression
fn js_quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

/// Escape a literal for embedding in a JS regex
fn regex_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a value for a double-quoted CSS attribute selector
fn css_attr(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// The interaction a strategy attempt should perform once targeted
enum Interaction<'a> {
    Click,
    Fill(&'a str),
}

/// Applies structured actions to a page
pub struct Executor {
    config: BrowserConfig,
    vocabulary: ActionVocabulary,
}

impl Executor {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            vocabulary: ActionVocabulary::standard(),
        }
    }

    /// Execute one action against the page.
    ///
    /// Tools outside the vocabulary and missing required params are logged
    /// no-ops. Strategy exhaustion for a known action raises
    /// `ActionExhausted`.
    pub async fn execute(&self, action: &StructuredAction, page: &dyn PageHandle) -> Result<()> {
        if !self.vocabulary.contains(&action.tool) {
            warn!(tool = %action.tool, "tool not in vocabulary, skipping");
            return Ok(());
        }

        debug!(tool = %action.tool, "executing action");
        match action.tool.as_str() {
            "click" => {
                let Some(hint) = action.param_str("selector") else {
                    warn!("click action without a selector, skipping");
                    return Ok(());
                };
                self.run_strategies(page, CLICK_STRATEGIES, hint, &Interaction::Click, "click")
                    .await?;
                page.wait_for_network_idle().await
            }
            "fill" => {
                let Some(hint) = action.param_str("selector") else {
                    warn!("fill action without a selector, skipping");
                    return Ok(());
                };
                let value = action.param_str("value").unwrap_or_default();
                self.run_strategies(
                    page,
                    FILL_STRATEGIES,
                    hint,
                    &Interaction::Fill(value),
                    "fill",
                )
                .await
            }
            "select" => {
                let Some(hint) = action.param_str("selector") else {
                    warn!("select action without a selector, skipping");
                    return Ok(());
                };
                let value = action.param_str("value").unwrap_or_default();
                let target = Target::Css(hint.to_string());
                let done = self
                    .bounded(page.select_option(&target, value))
                    .await
                    .unwrap_or(Ok(false))?;
                if done {
                    Ok(())
                } else {
                    Err(FetchError::exhausted("select", hint))
                }
            }
            "navigate" => {
                let Some(url) = action.param_str("url") else {
                    warn!("navigate action without a url, skipping");
                    return Ok(());
                };
                page.navigate(url).await?;
                page.wait_for_network_idle().await
            }
            "wait" => self.wait(action, page).await,
            "scroll" => self.scroll(action, page).await,
            "hover" => {
                let Some(hint) = action.param_str("selector") else {
                    warn!("hover action without a selector, skipping");
                    return Ok(());
                };
                let target = Target::Css(hint.to_string());
                let done = self
                    .bounded(page.hover(&target))
                    .await
                    .unwrap_or(Ok(false))?;
                if done {
                    Ok(())
                } else {
                    Err(FetchError::exhausted("hover", hint))
                }
            }
            "press" => {
                let Some(key) = action.param_str("key") else {
                    warn!("press action without a key, skipping");
                    return Ok(());
                };
                page.press_key(key).await
            }
            // Catalog entries and dispatch arms are maintained together;
            // anything the catalog admits but no arm handles is skipped.
            other => {
                warn!(tool = other, "no handler for vocabulary tool, skipping");
                Ok(())
            }
        }
    }

    /// Try the strategies in table order until one resolves and completes
    /// the interaction. A per-attempt timeout counts as that strategy
    /// failing, never as an executor error.
    async fn run_strategies(
        &self,
        page: &dyn PageHandle,
        strategies: &[Strategy],
        hint: &str,
        interaction: &Interaction<'_>,
        tool: &str,
    ) -> Result<()> {
        for (name, strategy) in strategies {
            let Some(target) = strategy(hint) else {
                continue;
            };
            let attempt = async {
                match interaction {
                    Interaction::Click => page.click(&target).await,
                    Interaction::Fill(value) => page.fill(&target, value).await,
                }
            };
            match self.bounded(attempt).await {
                None => {
                    debug!(strategy = name, "strategy timed out");
                }
                Some(Ok(true)) => {
                    debug!(strategy = name, target = target.describe(), "strategy hit");
                    return Ok(());
                }
                Some(Ok(false)) => {
                    debug!(strategy = name, "strategy missed");
                }
                Some(Err(e)) => return Err(e),
            }
        }
        Err(FetchError::exhausted(tool, hint))
    }

    /// Bound a strategy attempt by the action timeout. `None` means timeout.
    async fn bounded<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T>>,
    ) -> Option<Result<T>> {
        tokio::time::timeout(self.config.action_timeout(), fut)
            .await
            .ok()
    }

    /// Wait for a selector to resolve, or sleep a fixed duration
    async fn wait(&self, action: &StructuredAction, page: &dyn PageHandle) -> Result<()> {
        if let Some(hint) = action.param_str("selector") {
            let target = Target::Css(hint.to_string());
            let deadline = tokio::time::Instant::now() + self.config.navigation_timeout();
            while tokio::time::Instant::now() < deadline {
                if page.exists(&target).await? {
                    return Ok(());
                }
                tokio::time::sleep(std::time::Duration::from_millis(250)).await;
            }
            return Err(FetchError::exhausted("wait", hint));
        }

        let millis = action.param_u64("duration").unwrap_or(1000);
        let bound = self.config.navigation_timeout();
        let duration = std::time::Duration::from_millis(millis).min(bound);
        tokio::time::sleep(duration).await;
        Ok(())
    }

    /// Scroll a target into view, or run a fixed viewport scroll
    async fn scroll(&self, action: &StructuredAction, page: &dyn PageHandle) -> Result<()> {
        if let Some(hint) = action.param_str("selector") {
            let target = Target::Css(hint.to_string());
            let done = self
                .bounded(page.scroll_into_view(&target))
                .await
                .unwrap_or(Ok(false))?;
            if done {
                return Ok(());
            }
            return Err(FetchError::exhausted("scroll", hint));
        }

        let direction = ScrollDirection::parse(action.param_str("direction").unwrap_or("down"));
        page.scroll(direction).await
    }
}
