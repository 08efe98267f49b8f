//! Flow Normalizer
//!
//! Validates a recorded flow and reshapes it into the typed [`Flow`] model.
//! Nothing is merged or deduplicated: two identical navigations in a row stay
//! two steps.

use super::flow::{Flow, Interaction, InteractionKind, RawFlow, RawInteraction, Step};
use crate::synthesis::selector_policy::SelectorCandidates;
use tracing::debug;

/// Compile-time rejection of a recorded flow
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// The flow has no explicit interactions
    #[error("flow '{name}' has no explicit interactions")]
    Empty { name: String },

    /// A Click / Type / PressKey interaction carries no selector candidates
    #[error("step {step} ({kind}) has no target selector candidates")]
    MissingTarget { step: u32, kind: InteractionKind },

    /// A payload required by the interaction kind is missing or invalid
    #[error("step {step} is malformed: {reason}")]
    MalformedInteraction { step: u32, reason: String },

    /// Two interactions share a recorded step index
    #[error("step index {0} is recorded more than once")]
    DuplicateStepIndex(u32),
}

/// Normalize a recorded flow.
///
/// Interactions are ordered by their recorded `step_index` and relabelled
/// 1, 2, 3, ... The implicit start navigation is kept separate and unnumbered.
pub fn normalize(raw: RawFlow) -> Result<Flow, FlowError> {
    if raw.interactions.is_empty() {
        return Err(FlowError::Empty { name: raw.name });
    }

    check_absolute_url(0, &raw.start_url, "startUrl")?;

    let mut interactions = raw.interactions;
    interactions.sort_by_key(|i| i.step_index);
    if let Some(pair) = interactions
        .windows(2)
        .find(|w| w[0].step_index == w[1].step_index)
    {
        return Err(FlowError::DuplicateStepIndex(pair[0].step_index));
    }

    let mut steps = Vec::with_capacity(interactions.len());
    for (position, raw_interaction) in interactions.into_iter().enumerate() {
        let index = position as u32 + 1;
        let interaction = convert(index, raw_interaction)?;
        steps.push(Step { index, interaction });
    }

    debug!(flow_id = %raw.id, flow = %raw.name, steps = steps.len(), "Normalized flow");

    Ok(Flow {
        id: raw.id,
        name: raw.name,
        recorded_at: raw.recorded_at,
        start_url: raw.start_url,
        steps,
    })
}

fn convert(step: u32, raw: RawInteraction) -> Result<Interaction, FlowError> {
    warn_on_foreign_payloads(step, &raw);

    let interaction = match raw.kind {
        InteractionKind::Navigate => {
            let url = required(step, raw.url, "url")?;
            check_absolute_url(step, &url, "url")?;
            Interaction::Navigate { url }
        }
        InteractionKind::Wait => {
            let duration_ms = required(step, raw.duration_ms, "durationMs")?;
            if duration_ms == 0 {
                return Err(malformed(step, "durationMs must be a positive integer"));
            }
            Interaction::Wait { duration_ms }
        }
        InteractionKind::Click => Interaction::Click {
            target: carry_candidates(step, raw.kind, raw.target_selectors)?,
        },
        InteractionKind::Type => Interaction::Type {
            target: carry_candidates(step, raw.kind, raw.target_selectors)?,
            value: required(step, raw.value, "value")?,
        },
        InteractionKind::PressKey => {
            let target = carry_candidates(step, raw.kind, raw.target_selectors)?;
            let key = required(step, raw.value, "value")?;
            if key.trim().is_empty() {
                return Err(malformed(step, "key name must not be blank"));
            }
            Interaction::PressKey { target, key }
        }
        InteractionKind::Scroll => {
            let (dx, dy) = required(step, raw.delta, "delta")?;
            Interaction::Scroll { dx, dy }
        }
        InteractionKind::SwitchTab => {
            let title_substring = required(step, raw.title_substring, "titleSubstring")?;
            if title_substring.is_empty() {
                return Err(malformed(step, "titleSubstring must not be empty"));
            }
            Interaction::SwitchTab { title_substring }
        }
    };

    Ok(interaction)
}

/// Carry a candidate list through unchanged, rejecting an absent or empty one.
fn carry_candidates(
    step: u32,
    kind: InteractionKind,
    selectors: Option<Vec<String>>,
) -> Result<SelectorCandidates, FlowError> {
    let selectors = selectors.unwrap_or_default();
    if let Some(pos) = selectors.iter().position(|s| s.trim().is_empty()) {
        return Err(malformed(step, &format!("selector candidate {} is blank", pos + 1)));
    }
    SelectorCandidates::new(selectors).ok_or(FlowError::MissingTarget { step, kind })
}

fn required<T>(step: u32, value: Option<T>, field: &str) -> Result<T, FlowError> {
    value.ok_or_else(|| malformed(step, &format!("missing {}", field)))
}

fn malformed(step: u32, reason: &str) -> FlowError {
    FlowError::MalformedInteraction {
        step,
        reason: reason.to_string(),
    }
}

fn check_absolute_url(step: u32, value: &str, field: &str) -> Result<(), FlowError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| malformed(step, &format!("{} '{}' is not an absolute URL: {}", field, value, e)))
}

fn warn_on_foreign_payloads(step: u32, raw: &RawInteraction) {
    let kind = raw.kind;
    let foreign = [
        ("targetSelectors", raw.target_selectors.is_some() && !kind.is_targeted()),
        (
            "value",
            raw.value.is_some() && !matches!(kind, InteractionKind::Type | InteractionKind::PressKey),
        ),
        ("durationMs", raw.duration_ms.is_some() && kind != InteractionKind::Wait),
        ("delta", raw.delta.is_some() && kind != InteractionKind::Scroll),
        ("titleSubstring", raw.title_substring.is_some() && kind != InteractionKind::SwitchTab),
        ("url", raw.url.is_some() && kind != InteractionKind::Navigate),
    ];
    for (field, present) in foreign {
        if present {
            debug!(step, %kind, field, "Ignoring payload not used by this interaction kind");
        }
    }
}
