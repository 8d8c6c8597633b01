//! Conversion report types for tracking lossiness and policy decisions.
//!
//! Every v2 to v3 conversion produces a report next to the converted
//! document, similar to how `validation::ValidationReport` tracks
//! precondition issues.

use serde::Serialize;
use std::fmt;

use super::DocumentKind;

/// A report generated during a single document conversion.
///
/// Tracks input/output counts, lossiness warnings, and policy decisions
/// so that dropped content is visible instead of silent.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionReport {
    /// Kind of document converted.
    pub kind: DocumentKind,
    /// The v2 `@id` of the source document.
    pub source_id: String,
    /// The derived v3 `id`, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Counts from the v2 input.
    pub input: ConversionCounts,
    /// Counts in the v3 output.
    pub output: ConversionCounts,
    /// Issues discovered during conversion.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    /// Create a new empty report for one source document.
    pub fn new(kind: DocumentKind, source_id: impl Into<String>) -> Self {
        Self {
            kind,
            source_id: source_id.into(),
            target_id: None,
            input: ConversionCounts::default(),
            output: ConversionCounts::default(),
            issues: Vec::new(),
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    /// Count of warning-level issues (true lossiness).
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    /// Count of info-level issues (policy decisions, notes).
    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }

    /// Returns true if this conversion loses information.
    ///
    /// A conversion is lossy if it has any warning-level issues.
    pub fn is_lossy(&self) -> bool {
        self.warning_count() > 0
    }

    /// Returns true if any issue carries the given code.
    pub fn has(&self, code: ConversionIssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    /// Iterate over warning messages.
    pub fn lossy_messages(&self) -> impl Iterator<Item = &str> {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .map(|i| i.message.as_str())
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.kind.name(), self.source_id)?;
        if let Some(target) = &self.target_id {
            writeln!(f, "  -> {}", target)?;
        }

        writeln!(f, "  input:  {}", self.input)?;
        if self.output != self.input {
            writeln!(f, "  output: {}", self.output)?;
        }

        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", warnings)?;
            for message in self.lossy_messages() {
                writeln!(f, "  - {}", message)?;
            }
        }

        let infos = self.info_count();
        if infos > 0 {
            writeln!(f)?;
            writeln!(f, "Notes ({}):", infos)?;
            for issue in self
                .issues
                .iter()
                .filter(|i| i.severity == ConversionSeverity::Info)
            {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Counts of document elements.
///
/// Manifests fill `sequences`, `canvases` and `annotations`; collections
/// fill `members`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionCounts {
    pub sequences: usize,
    pub canvases: usize,
    pub annotations: usize,
    pub members: usize,
}

impl fmt::Display for ConversionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.members > 0 && self.canvases == 0 {
            write!(f, "{} member(s)", self.members)
        } else {
            write!(
                f,
                "{} sequence(s), {} canvas(es), {} annotation(s)",
                self.sequences, self.canvases, self.annotations
            )
        }
    }
}

/// A single issue discovered during conversion.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    /// Create a warning-level issue (indicates lossiness).
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue (policy note, does not block).
    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

/// Severity level for conversion issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    /// Information loss; requires `--allow-lossy`.
    Warning,
    /// A policy note; does not block conversion.
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON report and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    // Lossiness (Warning level)
    /// Sequences after the first are not represented in v3 `items`.
    DropExtraSequences,
    /// Top-level v2 keys with no v3 mapping are dropped.
    DropUnmappedFields,

    // Policy decisions (Info level)
    /// `vhint` is accepted but has no v3 equivalent.
    VhintIgnored,
    /// `description` copied to `summary` with its HTML markup.
    SummaryHtmlPassthrough,
    /// HTML markup removed from `description` when building `summary`.
    SummaryHtmlStripped,
    /// A canvas has no images and gets an empty `items` list.
    CanvasWithoutImages,
    /// Per-image `on` targets are replaced by the owning canvas id.
    AnnotationTargetRewritten,
}
