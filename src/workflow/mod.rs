//! Workflow Module
//!
//! Orchestrates the complete compilation from a recorded flow to a written script.

pub mod compiler;
pub mod flow;
pub mod normalizer;

pub use compiler::{CompilerConfig, ScriptCompiler};
pub use flow::{Flow, Interaction, InteractionKind, RawFlow, RawInteraction, Step};
pub use normalizer::{normalize, FlowError};
