//! Script Compiler
//!
//! Runs the whole pipeline: normalize → carry selectors → emit steps →
//! assemble script (retry helper, implicit navigation, liveness assertion) →
//! optionally write the artifact.
//!
//! Compilation holds no state between flows; the same flow always yields the
//! same script text.

use super::flow::{Flow, RawFlow};
use super::normalizer::normalize;
use crate::artifact::writer::ArtifactWriter;
use crate::codegen::script_builder::{GeneratedScript, ScriptBuilder};
use crate::codegen::step_emitter::{SessionBinding, StepEmitter};
use crate::codegen::tab_switch::TabSwitchPolicy;
use crate::codegen::validation::{ScriptValidator, ValidationResult};
use crate::synthesis::selector_policy::SelectorResolutionPolicy;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Compiler configuration
#[derive(Debug, Clone, Default)]
pub struct CompilerConfig {
    /// How targeted steps resolve their selector candidates
    pub selector_policy: SelectorResolutionPolicy,
    /// What an unmatched tab switch does at run time
    pub tab_switch: TabSwitchPolicy,
    /// Handles the emitted statements act on
    pub session: SessionBinding,
}

impl CompilerConfig {
    /// Reject settings that would emit a script which cannot run as intended
    pub fn validate(&self) -> crate::Result<()> {
        if let SelectorResolutionPolicy::TryInOrderWithTimeout { per_attempt_ms: 0 } = self.selector_policy {
            return Err(crate::Error::Config("selector_policy.per_attempt_ms must be > 0".to_string()));
        }
        if let TabSwitchPolicy::Bounded { max_scans, interval_ms } = self.tab_switch {
            if max_scans == 0 {
                return Err(crate::Error::Config("tab_switch.max_scans must be > 0".to_string()));
            }
            if interval_ms == 0 {
                return Err(crate::Error::Config("tab_switch.interval_ms must be > 0".to_string()));
            }
        }
        self.session.validate()
    }
}

/// Compiles flows into scripts
pub struct ScriptCompiler {
    config: CompilerConfig,
    emitter: StepEmitter,
    validator: ScriptValidator,
}

impl ScriptCompiler {
    /// Create with default config
    pub fn new() -> Self {
        Self::with_config(CompilerConfig::default())
    }

    /// Create with custom config
    pub fn with_config(config: CompilerConfig) -> Self {
        let emitter = StepEmitter::new(config.selector_policy, config.tab_switch, config.session.clone());
        Self {
            config,
            emitter,
            validator: ScriptValidator::new(),
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a normalized flow
    pub fn compile(&self, flow: &Flow) -> GeneratedScript {
        debug!(
            flow_id = %flow.id,
            flow = %flow.name,
            steps = flow.len(),
            policy = self.config.selector_policy.name(),
            "Compiling flow"
        );
        ScriptBuilder::new().build(flow, &self.emitter)
    }

    /// Normalize and compile a recorded flow
    pub fn compile_raw(&self, raw: RawFlow) -> crate::Result<GeneratedScript> {
        self.config.validate()?;
        let flow = normalize(raw)?;
        Ok(self.compile(&flow))
    }

    /// Check a compiled script's structure
    pub fn validate(&self, script: &GeneratedScript) -> ValidationResult {
        self.validator.validate(script)
    }

    /// Normalize, compile and persist a recorded flow; returns the written path
    pub fn compile_and_write(
        &self,
        raw: RawFlow,
        writer: &ArtifactWriter,
        now: DateTime<Utc>,
    ) -> crate::Result<PathBuf> {
        let flow_id = raw.id;
        let script = self.compile_raw(raw)?;

        let validation = self.validate(&script);
        for warning in &validation.warnings {
            warn!(%flow_id, flow = %script.flow_name(), "{}", warning);
        }
        ensure_valid(&validation)?;

        let path = writer.write(&script, script.flow_name(), now)?;
        info!(%flow_id, steps = script.step_count(), "Compiled flow '{}'", script.flow_name());
        Ok(path)
    }
}

/// Refuse a script whose structural checks failed
fn ensure_valid(validation: &ValidationResult) -> crate::Result<()> {
    if validation.passed {
        return Ok(());
    }
    let messages: Vec<String> = validation
        .errors
        .iter()
        .map(|err| format!("[{:?}] {}", err.error_type, err.message))
        .collect();
    Err(crate::Error::Validation(messages.join("; ")))
}

impl Default for ScriptCompiler {
    fn default() -> Self {
        Self::new()
    }
}
