//! # Flow Compiler
//!
//! Compiles recorded browser interaction flows into deterministic, standalone
//! Playwright test scripts.
//!
//! ## Overview
//!
//! A capture engine records what a user did in a live browsing session
//! (navigations, waits, clicks, typing, key presses, scrolls, tab switches) and
//! hands the timeline over as a [`RawFlow`]. This crate normalizes it, emits
//! one statement block per interaction, wraps the blocks in a fixed test
//! skeleton and writes the script under a timestamped file name.
//!
//! ## Quick Start
//!
//! ```no_run
//! use flow_compiler::{RawFlow, ScriptCompiler};
//!
//! let raw = RawFlow::load(std::path::Path::new("flows/login.json"))?;
//! let compiler = ScriptCompiler::new();
//! let script = compiler.compile_raw(raw)?;
//! println!("{}", script.source());
//! # Ok::<(), flow_compiler::Error>(())
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   RawFlow   │───▶│ Normalizer  │───▶│  Selector   │───▶│    Step     │
//! │  (capture)  │    │             │    │  Carrier    │    │   Emitter   │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//!                                                                 │
//!                                                                 ▼
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │  <name>_    │◀───│  Artifact   │◀───│  Liveness   │◀───│   Script    │
//! │  <ts>.spec  │    │   Writer    │    │  Assertion  │    │   Builder   │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//! ```
//!
//! - [`workflow`]: input model, normalization and the compile pipeline
//! - [`synthesis`]: selector candidates and resolution policies
//! - [`codegen`]: statement emission, script assembly and validation
//! - [`artifact`]: file naming and persistence
//! - [`app`]: CLI and configuration management

pub mod app;
pub mod artifact;
pub mod codegen;
pub mod synthesis;
pub mod workflow;

pub use artifact::writer::{ArtifactWriter, WriteError};
pub use codegen::script_builder::GeneratedScript;
pub use synthesis::selector_policy::{SelectorCandidates, SelectorResolutionPolicy};
pub use workflow::compiler::{CompilerConfig, ScriptCompiler};
pub use workflow::flow::{Flow, Interaction, InteractionKind, RawFlow, RawInteraction, Step};
pub use workflow::normalizer::{normalize, FlowError};

/// Result type alias for the flow compiler
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the flow compiler
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generated script failed validation: {0}")]
    Validation(String),

    #[error("Flow parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
