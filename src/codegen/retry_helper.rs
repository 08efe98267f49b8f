//! Retry Wrapper Generator
//!
//! Every script declares a bounded retry helper at module level. The emitted
//! steps do not call it; wiring it around fragile actions is left to whoever
//! edits or runs the script.

/// Attempts before the last error is re-raised
pub const RETRY_ATTEMPTS: u32 = 3;

/// Fixed pause between attempts
pub const RETRY_BACKOFF_MS: u64 = 1000;

/// Name the helper is declared under
pub const RETRY_HELPER_NAME: &str = "withRetry";

/// Module-level declaration of the retry helper
pub fn declaration() -> String {
    format!(
        "async function {name}<T>(action: () => Promise<T>, retries = {attempts}, delayMs = {backoff}): Promise<T> {{
  let lastError: unknown;
  for (let attempt = 1; attempt <= retries; attempt++) {{
    try {{
      return await action();
    }} catch (error) {{
      lastError = error;
      if (attempt < retries) {{
        await new Promise((resolve) => setTimeout(resolve, delayMs));
      }}
    }}
  }}
  throw lastError;
}}",
        name = RETRY_HELPER_NAME,
        attempts = RETRY_ATTEMPTS,
        backoff = RETRY_BACKOFF_MS,
    )
}
