//! Final-State Assertion Synthesizer
//!
//! The intended destination of an arbitrary flow is unknown, so the closing
//! assertion only checks liveness: the active page has some non-empty URL.

use super::step_emitter::SessionBinding;

pub const LIVENESS_COMMENT: &str = "// Final state: the active page must still have a URL";

/// Closing statements of every script body
pub fn liveness_assertion(session: &SessionBinding) -> Vec<String> {
    vec![
        LIVENESS_COMMENT.to_string(),
        format!("await expect({}).toHaveURL(/.+/);", session.active_page),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness_assertion() {
        let lines = liveness_assertion(&SessionBinding::default());
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "await expect(activePage).toHaveURL(/.+/);");
    }
}
