//! Generated Script Validation
//!
//! Structural checks over rendered script text. Used by the `validate`
//! command on files that may have been edited by hand since generation.

use super::retry_helper::RETRY_HELPER_NAME;
use super::script_builder::{GeneratedScript, SUITE_NAME, TEST_TIMEOUT_MS};
use regex::Regex;
use std::sync::OnceLock;

/// Regex patterns compiled once on first use.
struct CachedPatterns {
    import: Regex,
    step_header: Regex,
    suite: Regex,
    liveness: Regex,
}

fn cached_patterns() -> &'static CachedPatterns {
    static PATTERNS: OnceLock<CachedPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| CachedPatterns {
        import: Regex::new(r"(?m)^import \{[^}]*\btest\b[^}]*\} from '@playwright/test';$").unwrap(),
        step_header: Regex::new(r"(?m)^\s*// Step (\d+): ").unwrap(),
        suite: Regex::new(r"(?m)^test\.describe\('([^']*)'").unwrap(),
        liveness: Regex::new(r"^await expect\(\w+\)\.toHaveURL\(/\.\+/\);$").unwrap(),
    })
}

/// Validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub error_type: ValidationErrorType,
    pub message: String,
    /// Location (if applicable)
    pub location: Option<String>,
}

/// Types of validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorType {
    /// No framework import
    MissingImport,
    /// Retry helper not declared
    MissingRetryHelper,
    /// Suite missing, misnamed or duplicated
    InvalidSuite,
    /// Global timeout directive missing
    MissingTimeout,
    /// `// Step N:` labels are not 1, 2, 3, ...
    StepNumbering,
    /// Last statement is not the liveness assertion
    MissingLivenessAssertion,
}

/// Validation result
#[derive(Debug)]
pub struct ValidationResult {
    pub passed: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn from_parts(errors: Vec<ValidationError>, warnings: Vec<String>) -> Self {
        Self {
            passed: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Script validator
pub struct ScriptValidator {
    patterns: &'static CachedPatterns,
}

impl ScriptValidator {
    pub fn new() -> Self {
        Self {
            patterns: cached_patterns(),
        }
    }

    /// Validate a freshly compiled script
    pub fn validate(&self, script: &GeneratedScript) -> ValidationResult {
        self.validate_source(script.source())
    }

    /// Validate script text
    pub fn validate_source(&self, source: &str) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if !self.patterns.import.is_match(source) {
            errors.push(error(
                ValidationErrorType::MissingImport,
                "Missing import from '@playwright/test'",
                Some("start"),
            ));
        }

        if !source.contains(&format!("async function {}<T>(", RETRY_HELPER_NAME)) {
            errors.push(error(
                ValidationErrorType::MissingRetryHelper,
                &format!("Retry helper '{}' is not declared", RETRY_HELPER_NAME),
                None,
            ));
        }

        errors.extend(self.check_suite(source));

        if !source.contains(&format!("test.setTimeout({});", TEST_TIMEOUT_MS)) {
            errors.push(error(
                ValidationErrorType::MissingTimeout,
                &format!("Missing test.setTimeout({}) directive", TEST_TIMEOUT_MS),
                None,
            ));
        }

        errors.extend(self.check_step_numbering(source));
        errors.extend(self.check_liveness_last(source));

        if source.contains(".pages()") && !source.contains("TabNotFoundError") {
            warnings.push(
                "Tab switch scans open pages once; an unmatched title leaves the active page unchanged"
                    .to_string(),
            );
        }

        ValidationResult::from_parts(errors, warnings)
    }

    fn check_suite(&self, source: &str) -> Vec<ValidationError> {
        let suites: Vec<String> = self
            .patterns
            .suite
            .captures_iter(source)
            .map(|c| c[1].to_string())
            .collect();

        match suites.as_slice() {
            [name] if name == SUITE_NAME => vec![],
            [] => vec![error(
                ValidationErrorType::InvalidSuite,
                &format!("Missing test.describe('{}')", SUITE_NAME),
                None,
            )],
            [name] => vec![error(
                ValidationErrorType::InvalidSuite,
                &format!("Suite is named '{}', expected '{}'", name, SUITE_NAME),
                None,
            )],
            many => vec![error(
                ValidationErrorType::InvalidSuite,
                &format!("Expected one suite, found {}", many.len()),
                None,
            )],
        }
    }

    fn check_step_numbering(&self, source: &str) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (position, cap) in self.patterns.step_header.captures_iter(source).enumerate() {
            let expected = position + 1;
            let found: usize = cap[1].parse().unwrap_or(0);
            if found != expected {
                errors.push(error(
                    ValidationErrorType::StepNumbering,
                    &format!("Found Step {} where Step {} was expected", found, expected),
                    Some(&format!("Step {}", expected)),
                ));
            }
        }
        errors
    }

    fn check_liveness_last(&self, source: &str) -> Vec<ValidationError> {
        // Last line that is not blank, a comment, or a closing brace
        let last_statement = source
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with("//") && !l.starts_with('}'))
            .last();

        match last_statement {
            Some(line) if self.patterns.liveness.is_match(line) => vec![],
            _ => vec![error(
                ValidationErrorType::MissingLivenessAssertion,
                "Script does not end with the liveness assertion",
                Some("end"),
            )],
        }
    }
}

impl Default for ScriptValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn error(error_type: ValidationErrorType, message: &str, location: Option<&str>) -> ValidationError {
    ValidationError {
        error_type,
        message: message.to_string(),
        location: location.map(str::to_string),
    }
}
