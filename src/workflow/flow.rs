//! Flow Data Structures
//!
//! Defines the recorded-flow format handed over by the capture engine and the
//! normalized, typed model the compiler works on.

use crate::synthesis::selector_policy::SelectorCandidates;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Kind of a recorded interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    Navigate,
    Wait,
    Click,
    Type,
    PressKey,
    Scroll,
    SwitchTab,
}

impl InteractionKind {
    /// Whether this kind acts on a page element and so needs selector candidates
    pub fn is_targeted(&self) -> bool {
        matches!(self, Self::Click | Self::Type | Self::PressKey)
    }
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Navigate => "Navigate",
            Self::Wait => "Wait",
            Self::Click => "Click",
            Self::Type => "Type",
            Self::PressKey => "PressKey",
            Self::Scroll => "Scroll",
            Self::SwitchTab => "SwitchTab",
        };
        f.write_str(name)
    }
}

/// One recorded interaction as emitted by the capture engine.
///
/// Every payload is optional at this layer; which ones are required depends on
/// `kind` and is enforced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInteraction {
    /// Recording-time ordering key
    pub step_index: u32,
    /// Interaction kind
    pub kind: InteractionKind,
    /// Ranked selector strategies (Click / Type / PressKey)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_selectors: Option<Vec<String>>,
    /// Typed text or key name (Type / PressKey)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Suspension length (Wait)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Wheel delta as `[dx, dy]` (Scroll)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<(i64, i64)>,
    /// Title fragment to look for (SwitchTab)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_substring: Option<String>,
    /// Absolute destination (Navigate)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RawInteraction {
    fn bare(step_index: u32, kind: InteractionKind) -> Self {
        Self {
            step_index,
            kind,
            target_selectors: None,
            value: None,
            duration_ms: None,
            delta: None,
            title_substring: None,
            url: None,
        }
    }

    pub fn navigate(step_index: u32, url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::bare(step_index, InteractionKind::Navigate)
        }
    }

    pub fn wait(step_index: u32, duration_ms: u64) -> Self {
        Self {
            duration_ms: Some(duration_ms),
            ..Self::bare(step_index, InteractionKind::Wait)
        }
    }

    pub fn click(step_index: u32, selectors: &[&str]) -> Self {
        Self {
            target_selectors: Some(selectors.iter().map(|s| s.to_string()).collect()),
            ..Self::bare(step_index, InteractionKind::Click)
        }
    }

    pub fn type_text(step_index: u32, selectors: &[&str], value: impl Into<String>) -> Self {
        Self {
            target_selectors: Some(selectors.iter().map(|s| s.to_string()).collect()),
            value: Some(value.into()),
            ..Self::bare(step_index, InteractionKind::Type)
        }
    }

    pub fn press_key(step_index: u32, selectors: &[&str], key: impl Into<String>) -> Self {
        Self {
            target_selectors: Some(selectors.iter().map(|s| s.to_string()).collect()),
            value: Some(key.into()),
            ..Self::bare(step_index, InteractionKind::PressKey)
        }
    }

    pub fn scroll(step_index: u32, dx: i64, dy: i64) -> Self {
        Self {
            delta: Some((dx, dy)),
            ..Self::bare(step_index, InteractionKind::Scroll)
        }
    }

    pub fn switch_tab(step_index: u32, title_substring: impl Into<String>) -> Self {
        Self {
            title_substring: Some(title_substring.into()),
            ..Self::bare(step_index, InteractionKind::SwitchTab)
        }
    }
}

/// A recorded flow as handed over by the capture engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFlow {
    /// Correlation id, used in logs only
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Human-readable flow name, becomes the test case name
    pub name: String,
    /// When the recording started
    pub recorded_at: DateTime<Utc>,
    /// The implicit navigation established at recording start
    pub start_url: String,
    /// Explicit interactions
    #[serde(default)]
    pub interactions: Vec<RawInteraction>,
}

impl RawFlow {
    /// Create an empty flow that starts at `start_url`
    pub fn new(name: impl Into<String>, start_url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            recorded_at: Utc::now(),
            start_url: start_url.into(),
            interactions: Vec::new(),
        }
    }

    /// Append an interaction
    pub fn push(&mut self, interaction: RawInteraction) {
        self.interactions.push(interaction);
    }

    /// Builder-style variant of [`RawFlow::push`]
    pub fn with(mut self, interaction: RawInteraction) -> Self {
        self.push(interaction);
        self
    }

    /// Load a flow from a file. `.yaml` / `.yml` files are read as YAML,
    /// everything else as JSON.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        let flow: RawFlow = if is_yaml {
            serde_yaml_ng::from_str(&content).map_err(|e| crate::Error::Parse(e.to_string()))?
        } else {
            serde_json::from_str(&content)?
        };

        tracing::debug!(
            flow_id = %flow.id,
            flow = %flow.name,
            interactions = flow.interactions.len(),
            "Loaded flow from {:?}",
            path
        );
        Ok(flow)
    }

    /// Save the flow as pretty JSON
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }
}

/// A normalized interaction; each variant carries exactly its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Navigate { url: String },
    Wait { duration_ms: u64 },
    Click { target: SelectorCandidates },
    Type { target: SelectorCandidates, value: String },
    PressKey { target: SelectorCandidates, key: String },
    Scroll { dx: i64, dy: i64 },
    SwitchTab { title_substring: String },
}

impl Interaction {
    pub fn kind(&self) -> InteractionKind {
        match self {
            Self::Navigate { .. } => InteractionKind::Navigate,
            Self::Wait { .. } => InteractionKind::Wait,
            Self::Click { .. } => InteractionKind::Click,
            Self::Type { .. } => InteractionKind::Type,
            Self::PressKey { .. } => InteractionKind::PressKey,
            Self::Scroll { .. } => InteractionKind::Scroll,
            Self::SwitchTab { .. } => InteractionKind::SwitchTab,
        }
    }

    /// Selector candidates, for targeted interactions
    pub fn target(&self) -> Option<&SelectorCandidates> {
        match self {
            Self::Click { target } | Self::Type { target, .. } | Self::PressKey { target, .. } => {
                Some(target)
            }
            _ => None,
        }
    }
}

/// An explicit, labelled step of a normalized flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// 1-based label used in "Step N" comments
    pub index: u32,
    pub interaction: Interaction,
}

/// A validated flow, ready for emission.
///
/// Only [`crate::workflow::normalizer::normalize`] constructs one, so `steps`
/// is never empty and its indices run 1, 2, 3, ... in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    pub id: Uuid,
    pub name: String,
    pub recorded_at: DateTime<Utc>,
    /// Implicit leading navigation, unnumbered
    pub start_url: String,
    pub(crate) steps: Vec<Step>,
}

impl Flow {
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false for a normalized flow; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Count steps of a given kind
    pub fn count_of(&self, kind: InteractionKind) -> usize {
        self.steps
            .iter()
            .filter(|s| s.interaction.kind() == kind)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_raw_flow_creation() {
        let flow = RawFlow::new("login", "https://example.com");
        assert_eq!(flow.name, "login");
        assert_eq!(flow.start_url, "https://example.com");
        assert!(flow.is_empty());
    }

    #[test]
    fn test_builder_appends_in_order() {
        let flow = RawFlow::new("f", "https://example.com")
            .with(RawInteraction::wait(1, 500))
            .with(RawInteraction::click(2, &["#go"]));
        assert_eq!(flow.len(), 2);
        assert_eq!(flow.interactions[0].kind, InteractionKind::Wait);
        assert_eq!(flow.interactions[1].kind, InteractionKind::Click);
    }

    #[test]
    fn test_deserialize_camel_case_json() {
        let json = r##"{
            "name": "search",
            "recordedAt": "2025-03-14T09:26:53.589Z",
            "startUrl": "https://example.com",
            "interactions": [
                { "stepIndex": 1, "kind": "Type", "targetSelectors": ["#q", "input[name=q]"], "value": "rust" },
                { "stepIndex": 2, "kind": "Scroll", "delta": [0, 400] },
                { "stepIndex": 3, "kind": "SwitchTab", "titleSubstring": "Results" }
            ]
        }"##;

        let flow: RawFlow = serde_json::from_str(json).unwrap();
        assert_eq!(flow.name, "search");
        assert_eq!(flow.interactions.len(), 3);
        assert_eq!(
            flow.interactions[0].target_selectors.as_deref(),
            Some(&["#q".to_string(), "input[name=q]".to_string()][..])
        );
        assert_eq!(flow.interactions[1].delta, Some((0, 400)));
        assert_eq!(flow.interactions[2].title_substring.as_deref(), Some("Results"));
    }

    #[test]
    fn test_missing_id_is_generated() {
        let json = r#"{"name":"a","recordedAt":"2025-01-01T00:00:00Z","startUrl":"https://a.test"}"#;
        let a: RawFlow = serde_json::from_str(json).unwrap();
        let b: RawFlow = serde_json::from_str(json).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.interactions.is_empty());
    }

    #[test]
    fn test_serialization_skips_absent_payloads() {
        let json = serde_json::to_string(&RawInteraction::wait(1, 2000)).unwrap();
        assert!(json.contains("\"durationMs\":2000"));
        assert!(!json.contains("targetSelectors"));
        assert!(!json.contains("url"));
    }

    #[test]
    fn test_save_and_load_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flow.json");

        let flow = RawFlow::new("go back", "https://example.com")
            .with(RawInteraction::wait(1, 2000))
            .with(RawInteraction::wait(2, 1000));
        flow.save(&path).unwrap();

        let loaded = RawFlow::load(&path).unwrap();
        assert_eq!(loaded.id, flow.id);
        assert_eq!(loaded.interactions, flow.interactions);
    }

    #[test]
    fn test_load_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flow.yaml");
        std::fs::write(
            &path,
            r#"
name: open docs
recordedAt: 2025-06-01T10:00:00Z
startUrl: https://docs.example.com
interactions:
  - stepIndex: 1
    kind: Click
    targetSelectors: ["role=link[name=\"Guide\"]", "a.guide"]
  - stepIndex: 2
    kind: PressKey
    targetSelectors: ["body"]
    value: End
"#,
        )
        .unwrap();

        let flow = RawFlow::load(&path).unwrap();
        assert_eq!(flow.name, "open docs");
        assert_eq!(flow.interactions[1].kind, InteractionKind::PressKey);
        assert_eq!(flow.interactions[1].value.as_deref(), Some("End"));
    }

    #[test]
    fn test_load_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(RawFlow::load(&path), Err(crate::Error::Serialization(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = RawFlow::load(Path::new("/nonexistent/flow_12345.json"));
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_targeted_kinds() {
        assert!(InteractionKind::Click.is_targeted());
        assert!(InteractionKind::Type.is_targeted());
        assert!(InteractionKind::PressKey.is_targeted());
        assert!(!InteractionKind::Navigate.is_targeted());
        assert!(!InteractionKind::SwitchTab.is_targeted());
    }
}
