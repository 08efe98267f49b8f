//! Script Assembly

use super::final_assertion::liveness_assertion;
use super::literal::js_string;
use super::retry_helper;
use super::step_emitter::{StatementBlock, StepEmitter};
use crate::workflow::flow::Flow;
use std::fmt::Write;

/// Name of the suite every script declares
pub const SUITE_NAME: &str = "intelligent-automation";

/// Global budget of every test case
pub const TEST_TIMEOUT_MS: u64 = 60_000;

/// Body indentation inside `test.describe` + `test`
const BODY_INDENT: &str = "    ";

/// A compiled script. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedScript {
    flow_name: String,
    step_count: usize,
    source: String,
}

impl GeneratedScript {
    /// Name of the flow the script was compiled from
    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }

    /// Number of explicit steps in the script
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Script text
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Builder for script text
pub struct ScriptBuilder {
    /// Buffer for building the script
    buffer: String,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self {
            buffer: String::with_capacity(4096),
        }
    }

    /// Build the full script for `flow` using `emitter` for the explicit steps
    pub fn build(&mut self, flow: &Flow, emitter: &StepEmitter) -> GeneratedScript {
        self.buffer.clear();

        let blocks: Vec<StatementBlock> = flow.steps().iter().map(|s| emitter.emit(s)).collect();

        // Writing to a String is infallible
        self.write_preamble(emitter).expect("write to String");
        self.write_test(flow, emitter, &blocks).expect("write to String");

        GeneratedScript {
            flow_name: flow.name.clone(),
            step_count: blocks.len(),
            source: std::mem::take(&mut self.buffer),
        }
    }

    /// Import line and module-level helpers
    fn write_preamble(&mut self, emitter: &StepEmitter) -> std::fmt::Result {
        let policy = emitter.policy();
        if policy.needs_type_imports() {
            writeln!(
                self.buffer,
                "import {{ test, expect, type Locator, type Page }} from '@playwright/test';"
            )?;
        } else {
            writeln!(self.buffer, "import {{ test, expect }} from '@playwright/test';")?;
        }
        writeln!(self.buffer)?;

        writeln!(self.buffer, "{}", retry_helper::declaration())?;
        writeln!(self.buffer)?;

        if let Some(helper) = policy.helper_declaration() {
            writeln!(self.buffer, "{}", helper)?;
            writeln!(self.buffer)?;
        }
        Ok(())
    }

    /// Suite, test case and body
    fn write_test(&mut self, flow: &Flow, emitter: &StepEmitter, blocks: &[StatementBlock]) -> std::fmt::Result {
        let session = emitter.session();

        writeln!(self.buffer, "test.describe({}, () => {{", js_string(SUITE_NAME))?;
        writeln!(
            self.buffer,
            "  test({}, async ({}) => {{",
            js_string(&flow.name),
            session.fixture_pattern()
        )?;

        self.write_line(&format!("test.setTimeout({});", TEST_TIMEOUT_MS))?;
        self.write_line(&format!("let {} = {};", session.active_page, session.page_fixture))?;
        writeln!(self.buffer)?;

        // Implicit navigation from recording start: unnumbered
        let start = js_string(&flow.start_url);
        self.write_line(&format!("await {}.goto({});", session.active_page, start))?;
        self.write_line(&format!("await {}.waitForLoadState('networkidle');", session.active_page))?;
        writeln!(self.buffer)?;

        for block in blocks {
            for line in block.lines() {
                self.write_line(line)?;
            }
            writeln!(self.buffer)?;
        }

        for line in liveness_assertion(session) {
            self.write_line(&line)?;
        }

        writeln!(self.buffer, "  }});")?;
        writeln!(self.buffer, "}});")?;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> std::fmt::Result {
        writeln!(self.buffer, "{}{}", BODY_INDENT, line)
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
