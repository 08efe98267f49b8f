//! Tab / Context Switch Resolver
//!
//! Emits the loop that scans the open pages of the browsing context in
//! creation order and promotes the first one whose title contains the
//! recorded fragment. Only the matched page is touched (`bringToFront`); the
//! others are read, never modified.

use super::literal::{comment_text, js_string};
use super::step_emitter::SessionBinding;
use serde::{Deserialize, Serialize};

/// What the emitted scan does when no title matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum TabSwitchPolicy {
    /// One pass over the open pages; without a match the active page stays as it was
    #[default]
    ScanOnce,
    /// Rescan up to `max_scans` times, `interval_ms` apart, then throw `TabNotFoundError`
    Bounded { max_scans: u32, interval_ms: u64 },
}

/// Emit the switch statements for `title_substring`
pub fn emit_switch(policy: TabSwitchPolicy, session: &SessionBinding, title_substring: &str) -> Vec<String> {
    let needle = js_string(title_substring);
    let context = &session.context;
    let page = &session.active_page;

    match policy {
        TabSwitchPolicy::ScanOnce => vec![
            format!("for (const candidate of {}.pages()) {{", context),
            format!("  if ((await candidate.title()).includes({})) {{", needle),
            "    await candidate.bringToFront();".to_string(),
            format!("    {} = candidate;", page),
            "    break;".to_string(),
            "  }".to_string(),
            "}".to_string(),
        ],
        TabSwitchPolicy::Bounded { max_scans, interval_ms } => {
            let message = js_string(&format!(
                "TabNotFoundError: no open page title contains \"{}\"",
                comment_text(title_substring)
            ));
            vec![
                "{".to_string(),
                "  let switched = false;".to_string(),
                format!("  for (let scan = 0; scan < {} && !switched; scan++) {{", max_scans),
                format!("    for (const candidate of {}.pages()) {{", context),
                format!("      if ((await candidate.title()).includes({})) {{", needle),
                "        await candidate.bringToFront();".to_string(),
                format!("        {} = candidate;", page),
                "        switched = true;".to_string(),
                "        break;".to_string(),
                "      }".to_string(),
                "    }".to_string(),
                format!("    if (!switched && scan + 1 < {}) {{", max_scans),
                format!("      await {}.waitForTimeout({});", page, interval_ms),
                "    }".to_string(),
                "  }".to_string(),
                "  if (!switched) {".to_string(),
                format!("    throw new Error({});", message),
                "  }".to_string(),
                "}".to_string(),
            ]
        }
    }
}
