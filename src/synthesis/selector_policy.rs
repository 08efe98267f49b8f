//! Selector Candidates and Resolution Policy
//!
//! Candidate lists arrive already ranked; this module carries them through
//! unchanged and decides how an emitted statement turns them into a locator.

use serde::{Deserialize, Serialize};

use crate::codegen::literal::{js_string, js_string_array};

/// Ordered, non-empty list of selector strategies for one element.
///
/// Order is authoritative: index 0 is the primary candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorCandidates(Vec<String>);

impl SelectorCandidates {
    /// Wrap a candidate list, `None` when it is empty
    pub fn new(candidates: Vec<String>) -> Option<Self> {
        if candidates.is_empty() {
            None
        } else {
            Some(Self(candidates))
        }
    }

    /// The first-ranked candidate
    pub fn primary(&self) -> &str {
        &self.0[0]
    }

    /// Every candidate in rank order
    pub fn all(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Human-readable list for review comments, e.g. `a, b, c`
    pub fn describe(&self) -> String {
        self.0.join(", ")
    }
}

/// How an emitted step locates its target element at run time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum SelectorResolutionPolicy {
    /// Use the primary candidate only; the rest are documented in a comment
    #[default]
    FirstOnly,
    /// Try candidates one after another, each given `per_attempt_ms` to attach
    TryInOrderWithTimeout { per_attempt_ms: u64 },
    /// Race every candidate and use whichever attaches first
    TryAllConcurrentFirstWin,
}

/// Locator expression for one step, plus the statement that must run first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetBinding {
    pub setup: Option<String>,
    pub expr: String,
}

const RESOLVE_IN_ORDER: &str = r#"async function resolveInOrder(page: Page, candidates: string[], perAttemptMs: number): Promise<Locator> {
  let lastError: unknown = new Error('no selector candidates');
  for (const candidate of candidates) {
    const locator = page.locator(candidate).first();
    try {
      await locator.waitFor({ state: 'attached', timeout: perAttemptMs });
      return locator;
    } catch (error) {
      lastError = error;
    }
  }
  throw lastError;
}"#;

const RESOLVE_FIRST_WIN: &str = r#"async function resolveFirstWin(page: Page, candidates: string[]): Promise<Locator> {
  return Promise.any(
    candidates.map(async (candidate) => {
      const locator = page.locator(candidate).first();
      await locator.waitFor({ state: 'attached' });
      return locator;
    }),
  );
}"#;

impl SelectorResolutionPolicy {
    /// Short name used by the CLI and in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::FirstOnly => "first-only",
            Self::TryInOrderWithTimeout { .. } => "try-in-order",
            Self::TryAllConcurrentFirstWin => "first-win",
        }
    }

    /// Module-level helper the policy relies on, if any
    pub fn helper_declaration(&self) -> Option<&'static str> {
        match self {
            Self::FirstOnly => None,
            Self::TryInOrderWithTimeout { .. } => Some(RESOLVE_IN_ORDER),
            Self::TryAllConcurrentFirstWin => Some(RESOLVE_FIRST_WIN),
        }
    }

    /// Whether the helper needs the `Page` / `Locator` type imports
    pub fn needs_type_imports(&self) -> bool {
        self.helper_declaration().is_some()
    }

    /// Build the locator for step `step_index` on the page handle `page`
    pub fn bind(&self, step_index: u32, page: &str, candidates: &SelectorCandidates) -> TargetBinding {
        match self {
            Self::FirstOnly => TargetBinding {
                setup: None,
                expr: format!("{}.locator({})", page, js_string(candidates.primary())),
            },
            Self::TryInOrderWithTimeout { per_attempt_ms } => {
                let name = format!("step{}Target", step_index);
                TargetBinding {
                    setup: Some(format!(
                        "const {} = await resolveInOrder({}, {}, {});",
                        name,
                        page,
                        js_string_array(candidates.all()),
                        per_attempt_ms
                    )),
                    expr: name,
                }
            }
            Self::TryAllConcurrentFirstWin => {
                let name = format!("step{}Target", step_index);
                TargetBinding {
                    setup: Some(format!(
                        "const {} = await resolveFirstWin({}, {});",
                        name,
                        page,
                        js_string_array(candidates.all())
                    )),
                    expr: name,
                }
            }
        }
    }
}

impl std::str::FromStr for SelectorResolutionPolicy {
    type Err = String;

    /// Parses the CLI names; `try-in-order` gets a 2000ms default per attempt
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-only" | "first" => Ok(Self::FirstOnly),
            "try-in-order" | "in-order" => Ok(Self::TryInOrderWithTimeout {
                per_attempt_ms: DEFAULT_PER_ATTEMPT_MS,
            }),
            "first-win" | "concurrent" => Ok(Self::TryAllConcurrentFirstWin),
            other => Err(format!(
                "unknown selector policy '{}' (expected first-only, try-in-order or first-win)",
                other
            )),
        }
    }
}

/// Per-candidate budget when `try-in-order` is chosen without an explicit value
pub const DEFAULT_PER_ATTEMPT_MS: u64 = 2000;
