//! Domain model shared by the pipeline and the front ends.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

use crate::Error;

/// Time limit used when the statement does not state one.
pub const DEFAULT_TIME_LIMIT_SECONDS: f64 = 1.0;

/// Memory limit used when the statement does not state one.
pub const DEFAULT_MEMORY_LIMIT_MB: u32 = 256;

/// Longest accepted problem label (`A`, `B1`, `F2`, ...).
pub const MAX_LABEL_LEN: usize = 2;

/// Returns true for a short alphanumeric problem label.
pub fn is_valid_label(label: &str) -> bool {
    !label.is_empty() && label.len() <= MAX_LABEL_LEN && label.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Identifies one problem: a contest id and an upper-cased label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProblemReference {
    contest_id: u32,
    label: String,
}

impl ProblemReference {
    /// Build a reference, trimming and upper-casing the label.
    pub fn new(contest_id: u32, label: &str) -> Result<Self, Error> {
        if contest_id == 0 {
            return Err(Error::InvalidInput("contest id must be a positive number".into()));
        }

        let label = label.trim().to_ascii_uppercase();
        if !is_valid_label(&label) {
            return Err(Error::InvalidInput(format!(
                "problem id must be a letter or alphanumeric code (e.g., A, B, C), got {label:?}"
            )));
        }

        Ok(Self { contest_id, label })
    }

    pub fn contest_id(&self) -> u32 {
        self.contest_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Output file name: `{contestId}{LABEL}.pdf`.
    pub fn file_name(&self) -> String {
        format!("{}{}.pdf", self.contest_id, self.label)
    }
}

impl fmt::Display for ProblemReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.contest_id, self.label)
    }
}

/// One sample test, already whitespace-trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleTest {
    pub input: String,
    pub output: String,
}

/// Canonical intermediate form of a problem statement.
///
/// Limits are always populated (defaults apply when the page does not
/// state them), so the reflowed header is always well formed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedDocument {
    pub title: String,
    pub time_limit_seconds: f64,
    pub memory_limit_mb: u32,
    /// Statement body markup, embedded verbatim by reflow.
    pub statement_markup: String,
    pub samples: Vec<SampleTest>,
    pub notes_markup: Option<String>,
    /// 0 means unknown.
    pub rating: u32,
    /// Set on the placeholder built after every fetch attempt failed.
    pub diagnostic: bool,
}

impl Default for NormalizedDocument {
    fn default() -> Self {
        Self {
            title: String::new(),
            time_limit_seconds: DEFAULT_TIME_LIMIT_SECONDS,
            memory_limit_mb: DEFAULT_MEMORY_LIMIT_MB,
            statement_markup: String::new(),
            samples: Vec::new(),
            notes_markup: None,
            rating: 0,
            diagnostic: false,
        }
    }
}

/// A finished PDF ready to stream or archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl RenderedDocument {
    pub fn new(reference: &ProblemReference, content: Vec<u8>) -> Self {
        Self { file_name: reference.file_name(), content }
    }
}

/// Formula rendering mode requested by the caller.
///
/// All modes currently select the same pass-through formula adapter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RenderMode {
    #[default]
    Default,
    Fast,
    Graphics,
}
