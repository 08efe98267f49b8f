//! Artifact Namer / Writer
//!
//! Persists a compiled script as `<slug(flow name)>_<instant>.<extension>`,
//! where `<instant>` is the ISO-8601 write time at millisecond resolution with
//! `:` and `.` replaced by `-`. Two writes in the same millisecond for the same
//! flow name target the same path; the later one wins.

use crate::codegen::script_builder::GeneratedScript;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default file extension of generated scripts
pub const DEFAULT_EXTENSION: &str = "spec";

/// Slug used when a flow name has no usable characters
const FALLBACK_SLUG: &str = "flow";

/// A script could not be persisted
#[derive(Debug, thiserror::Error)]
#[error("failed to write script to {path:?}: {source}")]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Writes scripts into one output directory
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    extension: String,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Use a different file extension (without the leading dot)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name for `flow_name` written at `now`
    pub fn file_name(&self, flow_name: &str, now: DateTime<Utc>) -> String {
        format!("{}_{}.{}", slug(flow_name), timestamp_component(now), self.extension)
    }

    /// Write `script` and return the path it landed at
    pub fn write(&self, script: &GeneratedScript, flow_name: &str, now: DateTime<Utc>) -> Result<PathBuf, WriteError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| WriteError {
            path: self.output_dir.clone(),
            source,
        })?;

        let path = self.output_dir.join(self.file_name(flow_name, now));
        std::fs::write(&path, script.source()).map_err(|source| WriteError {
            path: path.clone(),
            source,
        })?;

        info!(
            flow = %flow_name,
            steps = script.step_count(),
            path = %path.display(),
            "Wrote generated script"
        );
        Ok(path)
    }

    /// Generated scripts in the output directory, sorted by file name
    pub fn list(&self) -> std::io::Result<Vec<PathBuf>> {
        if !self.output_dir.exists() {
            return Ok(Vec::new());
        }

        let suffix = format!(".{}", self.extension);
        let mut entries: Vec<PathBuf> = std::fs::read_dir(&self.output_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.ends_with(&suffix))
                    .unwrap_or(false)
            })
            .collect();
        entries.sort();
        Ok(entries)
    }
}

/// Lowercase the name and collapse every run of non-alphanumerics into `-`
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if out.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        out
    }
}

/// ISO-8601 instant, millisecond precision, filesystem-safe
pub fn timestamp_component(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(|c: char| c == ':' || c == '.', "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::script_builder::ScriptBuilder;
    use crate::codegen::step_emitter::StepEmitter;
    use crate::workflow::flow::{RawFlow, RawInteraction};
    use crate::workflow::normalizer::normalize;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap() + chrono::Duration::milliseconds(589)
    }

    fn script(name: &str) -> GeneratedScript {
        let flow = normalize(RawFlow::new(name, "https://example.com").with(RawInteraction::wait(1, 10))).unwrap();
        ScriptBuilder::new().build(&flow, &StepEmitter::default())
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("go back"), "go-back");
        assert_eq!(slug("  Login -- Flow!! "), "login-flow");
        assert_eq!(slug("CAQH ProView"), "caqh-proview");
        assert_eq!(slug("***"), "flow");
    }

    #[test]
    fn test_timestamp_component() {
        assert_eq!(timestamp_component(instant()), "2025-03-14T09-26-53-589Z");
    }

    #[test]
    fn test_file_name() {
        let writer = ArtifactWriter::new("out");
        assert_eq!(writer.file_name("go back", instant()), "go-back_2025-03-14T09-26-53-589Z.spec");
    }

    #[test]
    fn test_custom_extension() {
        let writer = ArtifactWriter::new("out").with_extension(".spec.ts");
        assert_eq!(writer.file_name("a", instant()), "a_2025-03-14T09-26-53-589Z.spec.ts");
    }

    #[test]
    fn test_write_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("generated");
        let writer = ArtifactWriter::new(&out);

        let script = script("go back");
        let path = writer.write(&script, "go back", instant()).unwrap();

        assert_eq!(path, out.join("go-back_2025-03-14T09-26-53-589Z.spec"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), script.source());
    }

    #[test]
    fn test_same_millisecond_last_writer_wins() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());

        let first = script("first body");
        let second = script("second body");
        let a = writer.write(&first, "same", instant()).unwrap();
        let b = writer.write(&second, "same", instant()).unwrap();

        assert_eq!(a, b);
        assert_eq!(std::fs::read_to_string(&b).unwrap(), second.source());
    }

    #[test]
    fn test_write_error_when_dir_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let writer = ArtifactWriter::new(blocker.join("out"));
        let err = writer.write(&script("x"), "x", instant()).unwrap_err();
        assert!(err.path.starts_with(&blocker));
    }

    #[test]
    fn test_list_filters_by_extension() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ArtifactWriter::new(temp_dir.path());
        writer.write(&script("b"), "b", instant()).unwrap();
        writer.write(&script("a"), "a", instant()).unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "ignore").unwrap();

        let listed = writer.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].ends_with("a_2025-03-14T09-26-53-589Z.spec"));
    }

    #[test]
    fn test_list_missing_dir() {
        let writer = ArtifactWriter::new("/nonexistent/generated_12345");
        assert!(writer.list().unwrap().is_empty());
    }
}
