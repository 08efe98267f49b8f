//! Script Generation & Validation
//!
//! Turns normalized steps into a standalone Playwright test script.

pub mod final_assertion;
pub mod literal;
pub mod retry_helper;
pub mod script_builder;
pub mod step_emitter;
pub mod tab_switch;
pub mod validation;

pub use script_builder::{GeneratedScript, ScriptBuilder};
pub use step_emitter::{SessionBinding, StatementBlock, StepEmitter};
pub use tab_switch::TabSwitchPolicy;
pub use validation::ScriptValidator;
