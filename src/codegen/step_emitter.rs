//! Step Emitter
//!
//! Maps each normalized interaction to the statements that replay it, plus an
//! inline post-condition where one applies. Emission cannot fail: everything
//! that could go wrong was rejected during normalization.

use super::literal::{comment_text, js_string};
use super::tab_switch::{emit_switch, TabSwitchPolicy};
use crate::synthesis::selector_policy::{SelectorCandidates, SelectorResolutionPolicy, TargetBinding};
use crate::workflow::flow::{Interaction, InteractionKind, Step};

/// Names of the handles the emitted statements operate on.
///
/// Passed to the emitter explicitly so nothing in the generated body relies on
/// an ambient binding the emitter did not choose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionBinding {
    /// Page fixture provided by the test framework
    pub page_fixture: String,
    /// Browsing-context handle whose pages `SwitchTab` scans
    pub context: String,
    /// Mutable handle every step acts on; rebound by `SwitchTab`
    pub active_page: String,
}

/// Fixture names the test framework injects
const PAGE_FIXTURE: &str = "page";
const CONTEXT_FIXTURE: &str = "context";

impl Default for SessionBinding {
    fn default() -> Self {
        Self {
            page_fixture: PAGE_FIXTURE.to_string(),
            context: CONTEXT_FIXTURE.to_string(),
            active_page: "activePage".to_string(),
        }
    }
}

impl SessionBinding {
    /// Check every handle is a plain identifier and no two handles share a name
    pub fn validate(&self) -> Result<(), crate::Error> {
        for (field, name) in [
            ("page_fixture", &self.page_fixture),
            ("context", &self.context),
            ("active_page", &self.active_page),
        ] {
            if !is_identifier(name) {
                return Err(crate::Error::Config(format!(
                    "session.{} must be a script identifier, got '{}'",
                    field, name
                )));
            }
        }
        if self.active_page == self.page_fixture || self.active_page == self.context {
            return Err(crate::Error::Config(format!(
                "session.active_page '{}' collides with another handle",
                self.active_page
            )));
        }
        if self.page_fixture == self.context {
            return Err(crate::Error::Config(format!(
                "session.page_fixture and session.context are both '{}'",
                self.context
            )));
        }
        Ok(())
    }

    /// Destructuring pattern of the test callback, e.g. `{ page, context: ctx }`
    pub fn fixture_pattern(&self) -> String {
        format!(
            "{{ {}, {} }}",
            fixture_entry(PAGE_FIXTURE, &self.page_fixture),
            fixture_entry(CONTEXT_FIXTURE, &self.context)
        )
    }
}

fn fixture_entry(fixture: &str, local: &str) -> String {
    if fixture == local {
        fixture.to_string()
    } else {
        format!("{}: {}", fixture, local)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Statements emitted for one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementBlock {
    /// Step label
    pub step: u32,
    /// Interaction kind the block replays
    pub kind: InteractionKind,
    /// Review comments, including the `// Step N:` header
    pub comments: Vec<String>,
    /// Executable lines, already indented relative to the block
    pub statements: Vec<String>,
    /// Inline post-condition, if the kind has one
    pub assertion: Option<String>,
}

impl StatementBlock {
    /// All lines in output order
    pub fn lines(&self) -> impl Iterator<Item = &String> {
        self.comments
            .iter()
            .chain(self.statements.iter())
            .chain(self.assertion.iter())
    }
}

/// Emits statement blocks for normalized steps
#[derive(Debug, Clone, Default)]
pub struct StepEmitter {
    policy: SelectorResolutionPolicy,
    tab_switch: TabSwitchPolicy,
    session: SessionBinding,
}

impl StepEmitter {
    pub fn new(policy: SelectorResolutionPolicy, tab_switch: TabSwitchPolicy, session: SessionBinding) -> Self {
        Self {
            policy,
            tab_switch,
            session,
        }
    }

    pub fn policy(&self) -> SelectorResolutionPolicy {
        self.policy
    }

    pub fn session(&self) -> &SessionBinding {
        &self.session
    }

    /// Emit the block for one step
    pub fn emit(&self, step: &Step) -> StatementBlock {
        let page = &self.session.active_page;
        let mut comments = vec![format!("// Step {}: {}", step.index, narrative(&step.interaction))];
        let mut statements = Vec::new();
        let mut assertion = None;

        match &step.interaction {
            Interaction::Navigate { url } => {
                let url = js_string(url);
                statements.push(format!("await {}.goto({});", page, url));
                assertion = Some(format!("await expect({}).toHaveURL({});", page, url));
            }
            Interaction::Wait { duration_ms } => {
                statements.push(format!("await {}.waitForTimeout({});", page, duration_ms));
            }
            Interaction::Click { target } => {
                comments.push(candidates_comment(target));
                let binding = self.bind(step.index, target, &mut statements);
                statements.push(format!("await {}.click();", binding.expr));
            }
            Interaction::Type { target, value } => {
                comments.push(candidates_comment(target));
                let binding = self.bind(step.index, target, &mut statements);
                let value = js_string(value);
                statements.push(format!("await {}.fill({});", binding.expr, value));
                assertion = Some(format!("await expect({}).toHaveValue({});", binding.expr, value));
            }
            Interaction::PressKey { target, key } => {
                comments.push(candidates_comment(target));
                let binding = self.bind(step.index, target, &mut statements);
                statements.push(format!("await {}.press({});", binding.expr, js_string(key)));
            }
            Interaction::Scroll { dx, dy } => {
                statements.push(format!("await {}.mouse.move(0, 0);", page));
                statements.push(format!("await {}.mouse.wheel({}, {});", page, dx, dy));
            }
            Interaction::SwitchTab { title_substring } => {
                statements.extend(emit_switch(self.tab_switch, &self.session, title_substring));
            }
        }

        StatementBlock {
            step: step.index,
            kind: step.interaction.kind(),
            comments,
            statements,
            assertion,
        }
    }

    fn bind(&self, index: u32, target: &SelectorCandidates, statements: &mut Vec<String>) -> TargetBinding {
        let binding = self.policy.bind(index, &self.session.active_page, target);
        if let Some(setup) = &binding.setup {
            statements.push(setup.clone());
        }
        binding
    }
}

/// One-line description used in the `// Step N:` comment
fn narrative(interaction: &Interaction) -> String {
    let text = match interaction {
        Interaction::Navigate { url } => format!("Navigate to {}", url),
        Interaction::Wait { duration_ms } => format!("Wait {}ms", duration_ms),
        Interaction::Click { target } => format!("Click {}", target.primary()),
        Interaction::Type { target, value } => format!("Type \"{}\" into {}", value, target.primary()),
        Interaction::PressKey { target, key } => format!("Press {} on {}", key, target.primary()),
        Interaction::Scroll { dx, dy } => format!("Scroll by ({}, {})", dx, dy),
        Interaction::SwitchTab { title_substring } => {
            format!("Switch to tab whose title contains \"{}\"", title_substring)
        }
    };
    comment_text(&text)
}

fn candidates_comment(target: &SelectorCandidates) -> String {
    format!("// Candidates: {}", comment_text(&target.describe()))
}
