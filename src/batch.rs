//! Batch conversion of a catalog directory tree.
//!
//! The catalog keeps v2 documents as
//!
//! ```text
//! <root>/<manifestName>/manifest.json
//! <root>/collection/<filename>.json
//! ```
//!
//! and publishes v3 documents next to them, by default under `<root>/3/`
//! and `<root>/collection/3/`. Every file is converted on its own: a failure
//! is logged and counted, and the batch moves on.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::config::ConvertConfig;
use crate::convert::{self, ConversionReport, DocumentKind};
use crate::error::IiifError;
use crate::io_json;

const MANIFEST_FILE: &str = "manifest.json";
const JSON_EXTENSION: &str = "json";

/// Where a batch reads from and writes to.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Root of the v2 tree.
    pub input_root: PathBuf,
    /// Name of the collection folder under `input_root`.
    pub collection_dir: String,
    /// v3 manifests go to `<manifests_out>/<manifestName>/manifest.json`.
    pub manifests_out: PathBuf,
    /// v3 collections go to `<collections_out>/<filename>`.
    pub collections_out: PathBuf,
    /// Write documents whose conversion report is lossy.
    pub allow_lossy: bool,
}

impl BatchOptions {
    /// The catalog's in-place layout: `<root>/3` and `<root>/collection/3`.
    pub fn in_place(input_root: impl Into<PathBuf>) -> Self {
        let input_root = input_root.into();
        Self {
            manifests_out: input_root.join("3"),
            collections_out: input_root.join("collection").join("3"),
            collection_dir: "collection".to_string(),
            input_root,
            allow_lossy: false,
        }
    }

    /// A separate output tree: `<out>/<manifestName>/manifest.json` and
    /// `<out>/collection/<filename>`.
    pub fn with_output(input_root: impl Into<PathBuf>, output_root: &Path) -> Self {
        Self {
            manifests_out: output_root.to_path_buf(),
            collections_out: output_root.join("collection"),
            ..Self::in_place(input_root)
        }
    }
}

/// Output roots resolved on disk, so outputs are recognized however the
/// input root and the output roots are spelled.
struct OutputRoots {
    resolved: Vec<PathBuf>,
    lexical: Vec<PathBuf>,
}

impl OutputRoots {
    fn new(opts: &BatchOptions) -> Self {
        let lexical = vec![opts.manifests_out.clone(), opts.collections_out.clone()];
        // Roots that do not exist yet cannot hold anything the walk finds.
        let resolved = lexical
            .iter()
            .filter_map(|root| fs::canonicalize(root).ok())
            .collect();
        Self { resolved, lexical }
    }

    fn contains(&self, path: &Path) -> bool {
        match fs::canonicalize(path) {
            Ok(real) => self.resolved.iter().any(|root| real.starts_with(root)),
            Err(_) => self.lexical.iter().any(|root| path.starts_with(root)),
        }
    }
}

/// Outcome of a batch run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchReport {
    /// Documents converted and written.
    pub converted: usize,
    /// Documents that failed to read, convert or write.
    pub failed: usize,
    /// Candidate files skipped because they live in an output folder.
    pub skipped: usize,
    /// One entry per failed document.
    pub failures: Vec<BatchFailure>,
    /// Conversion reports of the written documents.
    pub reports: Vec<ConversionReport>,
}

impl BatchReport {
    /// Total lossiness warnings across written documents.
    pub fn warning_count(&self) -> usize {
        self.reports.iter().map(ConversionReport::warning_count).sum()
    }

    fn record_failure(&mut self, failure: BatchFailure) {
        tracing::warn!(
            input = %failure.path.display(),
            error = %failure.message,
            "conversion failed"
        );
        self.failed += 1;
        self.failures.push(failure);
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Successfully converted: {}", self.converted)?;
        writeln!(f, "Errors: {}", self.failed)?;
        if self.skipped > 0 {
            writeln!(f, "Skipped: {}", self.skipped)?;
        }
        let warnings = self.warning_count();
        if warnings > 0 {
            writeln!(f, "Lossy warnings: {}", warnings)?;
        }
        for failure in &self.failures {
            writeln!(f, "  - {}: {}", failure.path.display(), failure.message)?;
        }
        Ok(())
    }
}

/// A document the batch could not convert.
#[derive(Clone, Debug, Serialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub kind: DocumentKind,
    pub message: String,
}

/// A v2 file found by the walk, with its output location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchJob {
    pub kind: DocumentKind,
    pub input: PathBuf,
    pub output: PathBuf,
}

/// The jobs of a batch, plus what the walk could not turn into a job.
#[derive(Clone, Debug, Default)]
pub struct BatchPlan {
    /// Jobs sorted by input path.
    pub jobs: Vec<BatchJob>,
    /// Candidates skipped because they live under an output root.
    pub skipped: usize,
    /// Unreadable entries and jobs whose output another job already claims.
    pub failures: Vec<BatchFailure>,
}

/// Lists the conversion jobs under the input root.
///
/// An entry the walk cannot read (dangling symlink, permission error,
/// symlink loop) becomes a failure of the plan; the walk goes on. When two
/// inputs map to the same output, the first in path order keeps it and the
/// later one fails.
///
/// # Errors
/// Fails only if the input root itself is unreadable.
pub fn plan_batch(opts: &BatchOptions) -> Result<BatchPlan, IiifError> {
    fs::metadata(&opts.input_root).map_err(|source| IiifError::Traversal {
        path: opts.input_root.clone(),
        message: source.to_string(),
    })?;

    let outputs = OutputRoots::new(opts);
    let mut plan = BatchPlan::default();

    for entry in WalkDir::new(&opts.input_root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                plan.failures
                    .push(walk_failure(&opts.input_root, DocumentKind::Manifest, &err));
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
            continue;
        }
        if outputs.contains(entry.path()) {
            plan.skipped += 1;
            continue;
        }
        let Some(folder) = entry.path().parent().and_then(Path::file_name) else {
            continue;
        };
        plan.jobs.push(BatchJob {
            kind: DocumentKind::Manifest,
            output: opts.manifests_out.join(folder).join(MANIFEST_FILE),
            input: entry.into_path(),
        });
    }

    let collection_root = opts.input_root.join(&opts.collection_dir);
    if collection_root.is_dir() {
        for entry in WalkDir::new(&collection_root).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    plan.failures
                        .push(walk_failure(&collection_root, DocumentKind::Collection, &err));
                    continue;
                }
            };
            let path = entry.path();
            let is_json = path.extension().and_then(|e| e.to_str()) == Some(JSON_EXTENSION);
            if !entry.file_type().is_file() || !is_json {
                continue;
            }
            if outputs.contains(path) {
                plan.skipped += 1;
                continue;
            }
            plan.jobs.push(BatchJob {
                kind: DocumentKind::Collection,
                output: opts.collections_out.join(entry.file_name()),
                input: entry.into_path(),
            });
        }
    }

    plan.jobs.sort_by(|a, b| a.input.cmp(&b.input));
    claim_outputs(&mut plan);
    Ok(plan)
}

fn walk_failure(root: &Path, kind: DocumentKind, err: &walkdir::Error) -> BatchFailure {
    BatchFailure {
        path: err.path().unwrap_or(root).to_path_buf(),
        kind,
        message: err.to_string(),
    }
}

/// Keeps the first job per output path and fails the rest.
fn claim_outputs(plan: &mut BatchPlan) {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut kept = Vec::with_capacity(plan.jobs.len());

    for job in plan.jobs.drain(..) {
        if let Some(first) = claimed.get(&job.output) {
            plan.failures.push(BatchFailure {
                message: format!(
                    "output {} is already written from {}",
                    job.output.display(),
                    first.display()
                ),
                path: job.input,
                kind: job.kind,
            });
            continue;
        }
        claimed.insert(job.output.clone(), job.input.clone());
        kept.push(job);
    }
    plan.jobs = kept;
}

/// Converts every v2 document under the input root.
///
/// A failed document never aborts the batch and leaves no output file.
///
/// # Errors
/// Fails only if the input root itself is unreadable.
pub fn run_batch(opts: &BatchOptions, config: &ConvertConfig) -> Result<BatchReport, IiifError> {
    let plan = plan_batch(opts)?;
    tracing::info!(
        jobs = plan.jobs.len(),
        skipped = plan.skipped,
        root = %opts.input_root.display(),
        "starting batch conversion"
    );

    let mut report = BatchReport {
        skipped: plan.skipped,
        ..Default::default()
    };
    for failure in plan.failures {
        report.record_failure(failure);
    }

    for job in &plan.jobs {
        match run_job(job, config, opts.allow_lossy) {
            Ok(conversion) => {
                tracing::debug!(
                    input = %job.input.display(),
                    output = %job.output.display(),
                    "converted"
                );
                report.converted += 1;
                report.reports.push(conversion);
                if report.converted % 100 == 0 {
                    tracing::info!(converted = report.converted, "progress");
                }
            }
            Err(err) => report.record_failure(BatchFailure {
                path: job.input.clone(),
                kind: job.kind,
                message: err.to_string(),
            }),
        }
    }

    tracing::info!(
        converted = report.converted,
        failed = report.failed,
        "batch conversion complete"
    );
    Ok(report)
}

/// Converts one document and writes it if the conversion is acceptable.
pub fn run_job(
    job: &BatchJob,
    config: &ConvertConfig,
    allow_lossy: bool,
) -> Result<ConversionReport, IiifError> {
    match job.kind {
        DocumentKind::Manifest => {
            let v2 = io_json::read_manifest(&job.input)?;
            let converted = convert::convert_manifest(&v2, config)?;
            check_lossy(&converted.report, allow_lossy)?;
            io_json::write_json(&job.output, &converted.document)?;
            Ok(converted.report)
        }
        DocumentKind::Collection => {
            let v2 = io_json::read_collection(&job.input)?;
            let converted = convert::convert_collection(&v2, config)?;
            check_lossy(&converted.report, allow_lossy)?;
            io_json::write_json(&job.output, &converted.document)?;
            Ok(converted.report)
        }
    }
}

/// Refuses a lossy conversion unless it was allowed.
pub fn check_lossy(report: &ConversionReport, allow_lossy: bool) -> Result<(), IiifError> {
    if report.is_lossy() && !allow_lossy {
        return Err(IiifError::LossyConversion {
            report: Box::new(report.clone()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write(path: &Path, value: serde_json::Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string(&value).unwrap()).unwrap();
    }

    fn v2_manifest(name: &str) -> serde_json::Value {
        json!({
            "@id": format!("https://hi-ut.github.io/dataset/iiif/{name}/manifest.json"),
            "label": name,
            "sequences": [{"canvases": [{
                "@id": format!("https://x/{name}/canvas/p1"),
                "height": 10, "width": 10,
                "images": [{"@id": "i", "resource": {"@id": "http://img/1.jpg"}}]
            }]}]
        })
    }

    #[test]
    fn plan_skips_output_folders() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a-0001/manifest.json"), v2_manifest("a-0001"));
        write(&root.join("3/a-0001/manifest.json"), json!({}));
        write(&root.join("collection/top.json"), json!({}));
        write(&root.join("collection/3/top.json"), json!({}));
        fs::write(root.join("collection/notes.txt"), "x").unwrap();

        let plan = plan_batch(&BatchOptions::in_place(root)).unwrap();
        assert_eq!(plan.skipped, 1);
        assert_eq!(plan.jobs.len(), 2);
        assert!(plan.failures.is_empty());
        let manifest_job = plan
            .jobs
            .iter()
            .find(|j| j.kind == DocumentKind::Manifest)
            .unwrap();
        assert_eq!(manifest_job.output, root.join("3/a-0001/manifest.json"));
        let collection_job = plan
            .jobs
            .iter()
            .find(|j| j.kind == DocumentKind::Collection)
            .unwrap();
        assert_eq!(collection_job.output, root.join("collection/3/top.json"));
    }

    #[test]
    fn failed_document_does_not_abort_batch() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a-0001/manifest.json"), v2_manifest("a-0001"));
        write(&root.join("b-0002/manifest.json"), json!({"label": "missing id"}));

        let out = tempfile::tempdir().unwrap();
        let opts = BatchOptions::with_output(root, out.path());
        let report = run_batch(&opts, &ConvertConfig::default()).unwrap();

        assert_eq!(report.converted, 1);
        assert_eq!(report.failed, 1);
        assert!(out.path().join("a-0001/manifest.json").is_file());
        assert!(!out.path().join("b-0002").exists());
        assert!(report.failures[0].path.ends_with("b-0002/manifest.json"));
    }

    #[test]
    fn lossy_document_needs_permission() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let mut value = v2_manifest("a-0001");
        let first = value["sequences"][0].clone();
        value["sequences"] = json!([first.clone(), first]);
        write(&root.join("a-0001/manifest.json"), value);

        let mut opts = BatchOptions::in_place(root);
        let report = run_batch(&opts, &ConvertConfig::default()).unwrap();
        assert_eq!(report.failed, 1);
        assert!(report.failures[0].message.contains("--allow-lossy"));
        assert!(!root.join("3/a-0001/manifest.json").exists());

        opts.allow_lossy = true;
        let report = run_batch(&opts, &ConvertConfig::default()).unwrap();
        assert_eq!(report.converted, 1);
        assert_eq!(report.warning_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_is_counted_and_batch_continues() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a-0001/manifest.json"), v2_manifest("a-0001"));
        write(&root.join("b-0002/manifest.json"), v2_manifest("b-0002"));
        std::os::unix::fs::symlink(root.join("gone"), root.join("stale-link")).unwrap();

        let out = tempfile::tempdir().unwrap();
        let report = run_batch(
            &BatchOptions::with_output(root, out.path()),
            &ConvertConfig::default(),
        )
        .unwrap();

        assert_eq!(report.converted, 2);
        assert_eq!(report.failed, 1);
        assert!(report.failures[0].path.ends_with("stale-link"));
        assert!(out.path().join("a-0001/manifest.json").is_file());
        assert!(out.path().join("b-0002/manifest.json").is_file());
    }

    #[test]
    fn outputs_recognized_when_root_is_spelled_differently() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a-0001/manifest.json"), v2_manifest("a-0001"));
        fs::create_dir_all(root.join("sub")).unwrap();

        // `<root>/sub/..` walks as `<root>/sub/../out/...`, never lexically
        // under `<root>/out`.
        let opts = BatchOptions::with_output(root.join("sub").join(".."), &root.join("out"));
        let first = run_batch(&opts, &ConvertConfig::default()).unwrap();
        assert_eq!(first.converted, 1);
        assert_eq!(first.failed, 0);

        let second = run_batch(&opts, &ConvertConfig::default()).unwrap();
        assert_eq!(second.converted, 1);
        assert_eq!(second.failed, 0);
        assert_eq!(second.skipped, 1);
    }

    #[test]
    fn same_folder_name_in_two_subtrees_fails_the_later_one() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(&root.join("a/item/manifest.json"), v2_manifest("item"));
        write(&root.join("b/item/manifest.json"), v2_manifest("item"));

        let plan = plan_batch(&BatchOptions::in_place(root)).unwrap();
        assert_eq!(plan.jobs.len(), 1);
        assert!(plan.jobs[0].input.ends_with("a/item/manifest.json"));
        assert_eq!(plan.failures.len(), 1);
        assert!(plan.failures[0].path.ends_with("b/item/manifest.json"));
        assert!(plan.failures[0].message.contains("already written"));

        let report = run_batch(&BatchOptions::in_place(root), &ConvertConfig::default()).unwrap();
        assert_eq!(report.converted, 1);
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn missing_input_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = plan_batch(&BatchOptions::in_place(dir.path().join("absent")));
        assert!(matches!(result, Err(IiifError::Traversal { .. })));
    }

    #[test]
    fn missing_collection_folder_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let report = run_batch(&BatchOptions::in_place(dir.path()), &ConvertConfig::default())
            .unwrap();
        assert_eq!(report.converted, 0);
        assert_eq!(report.failed, 0);
    }

    #[test]
    fn display_summarizes_counts() {
        let report = BatchReport {
            converted: 3,
            failed: 1,
            failures: vec![BatchFailure {
                path: PathBuf::from("x/manifest.json"),
                kind: DocumentKind::Manifest,
                message: "boom".to_string(),
            }],
            ..Default::default()
        };
        let text = report.to_string();
        assert!(text.contains("Successfully converted: 3"));
        assert!(text.contains("Errors: 1"));
        assert!(text.contains("x/manifest.json: boom"));
    }
}
