//! Selector Synthesis
//!
//! Carries ranked selector candidates to the emitter and decides how they
//! are resolved at run time.

pub mod selector_policy;

pub use selector_policy::{SelectorCandidates, SelectorResolutionPolicy};
