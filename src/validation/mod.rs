//! Preflight validation of v2 documents.
//!
//! The converters assume a few things about their input: a single sequence,
//! `@id` URLs that follow the catalog's folder layout, canvases with real
//! dimensions. This module checks those assumptions up front and reports
//! them instead of letting the conversion silently truncate or fail midway.

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::HashMap;

use crate::ids;
use crate::io_json::V2Document;
use crate::model::v2;

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
}

/// Validates either kind of v2 document.
pub fn validate_document(document: &V2Document, opts: &ValidateOptions) -> ValidationReport {
    match document {
        V2Document::Manifest(manifest) => validate_manifest(manifest, opts),
        V2Document::Collection(collection) => validate_collection(collection, opts),
    }
}

/// Validates a v2 manifest and returns a report of all issues found.
///
/// Checks:
/// - the `@id` yields a manifest folder name
/// - exactly one sequence is present
/// - canvas ids of the first sequence are unique
/// - canvases have non-zero dimensions and at least one image
pub fn validate_manifest(manifest: &v2::Manifest, _opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    if let Err(err) = ids::manifest_name(&manifest.id) {
        report.add(ValidationIssue::error(
            IssueCode::InvalidManifestId,
            err.to_string(),
            IssueContext::Document,
        ));
    }

    if manifest.label.is_empty() {
        report.add(ValidationIssue::warning(
            IssueCode::EmptyLabel,
            "Empty manifest label",
            IssueContext::Document,
        ));
    }

    match manifest.sequences.len() {
        0 => report.add(ValidationIssue::warning(
            IssueCode::NoSequences,
            "No sequences; the v3 manifest will have no canvases",
            IssueContext::Document,
        )),
        1 => {}
        n => {
            for index in 1..n {
                report.add(ValidationIssue::warning(
                    IssueCode::MultipleSequences,
                    format!(
                        "Only the first of {} sequences is converted; this one has {} canvas(es)",
                        n,
                        manifest.sequences[index].canvases.len()
                    ),
                    IssueContext::Sequence { index },
                ));
            }
        }
    }

    if let Some(sequence) = manifest.sequences.first() {
        validate_canvases(&sequence.canvases, &mut report);
    }

    report
}

fn validate_canvases(canvases: &[v2::Canvas], report: &mut ValidationReport) {
    let mut seen_ids: HashMap<&str, usize> = HashMap::new();

    for (idx, canvas) in canvases.iter().enumerate() {
        let context = || IssueContext::Canvas {
            id: canvas.id.clone(),
        };

        if let Some(first_idx) = seen_ids.get(canvas.id.as_str()) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateCanvasId,
                format!(
                    "Duplicate canvas ID (first seen at index {}, again at {})",
                    first_idx, idx
                ),
                context(),
            ));
        } else {
            seen_ids.insert(canvas.id.as_str(), idx);
        }

        if canvas.width == 0 || canvas.height == 0 {
            report.add(ValidationIssue::error(
                IssueCode::InvalidCanvasDimensions,
                format!(
                    "Invalid dimensions {}x{} (must be positive)",
                    canvas.width, canvas.height
                ),
                context(),
            ));
        }

        if canvas.images.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::CanvasWithoutImages,
                "Canvas has no images",
                context(),
            ));
        }
    }
}

/// Validates a v2 collection and returns a report of all issues found.
///
/// Checks that the collection, its parent and every member map to v3 ids,
/// and flags members listed twice.
pub fn validate_collection(
    collection: &v2::Collection,
    _opts: &ValidateOptions,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    if let Err(err) = ids::collection_filename(&collection.id) {
        report.add(ValidationIssue::error(
            IssueCode::InvalidCollectionId,
            err.to_string(),
            IssueContext::Document,
        ));
    }

    if let Some(within) = &collection.within {
        if let Err(err) = ids::collection_filename(within) {
            report.add(ValidationIssue::error(
                IssueCode::InvalidCollectionId,
                format!("within: {}", err),
                IssueContext::Document,
            ));
        }
    }

    if collection.label.is_empty() {
        report.add(ValidationIssue::warning(
            IssueCode::EmptyLabel,
            "Empty collection label",
            IssueContext::Document,
        ));
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    let sub_collections = collection.collections.as_deref().unwrap_or(&[]);
    let manifests = collection.manifests.as_deref().unwrap_or(&[]);

    let members = sub_collections
        .iter()
        .map(|c| (c.id.as_str(), c.label.as_str(), ids::collection_filename(&c.id).err()))
        .chain(
            manifests
                .iter()
                .map(|m| (m.id.as_str(), m.label.as_str(), ids::manifest_name(&m.id).err())),
        );

    for (idx, (id, label, id_error)) in members.enumerate() {
        let context = || IssueContext::Member { id: id.to_string() };

        if let Some(err) = id_error {
            report.add(ValidationIssue::error(
                IssueCode::InvalidMemberId,
                err.to_string(),
                context(),
            ));
        }

        if let Some(first_idx) = seen.get(id) {
            report.add(ValidationIssue::warning(
                IssueCode::DuplicateMember,
                format!("Listed again at position {} (first at {})", idx, first_idx),
                context(),
            ));
        } else {
            seen.insert(id, idx);
        }

        if label.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyLabel,
                "Empty member label",
                context(),
            ));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(value: serde_json::Value) -> v2::Manifest {
        serde_json::from_value(value).unwrap()
    }

    fn canvas(id: &str) -> serde_json::Value {
        json!({
            "@id": id, "height": 100, "width": 80,
            "images": [{"@id": format!("{id}/img"), "resource": {"@id": "http://img/x.jpg"}}]
        })
    }

    fn valid_manifest() -> v2::Manifest {
        manifest(json!({
            "@id": "https://x/iiif/item-1/manifest.json",
            "label": "Item",
            "sequences": [{"canvases": [canvas("c1"), canvas("c2")]}]
        }))
    }

    #[test]
    fn test_valid_manifest() {
        let report = validate_manifest(&valid_manifest(), &ValidateOptions::default());
        assert!(
            report.is_clean(),
            "Expected no issues, got: {:?}",
            report.issues
        );
    }

    #[test]
    fn test_multiple_sequences_warns() {
        let mut m = valid_manifest();
        m.sequences.push(m.sequences[0].clone());
        let report = validate_manifest(&m, &ValidateOptions::default());
        assert!(report.is_ok());
        assert!(report.has(IssueCode::MultipleSequences));
    }

    #[test]
    fn test_no_sequences_warns() {
        let mut m = valid_manifest();
        m.sequences.clear();
        let report = validate_manifest(&m, &ValidateOptions::default());
        assert!(report.has(IssueCode::NoSequences));
    }

    #[test]
    fn test_duplicate_canvas_and_bad_dimensions() {
        let m = manifest(json!({
            "@id": "https://x/iiif/item-1/manifest.json",
            "label": "Item",
            "sequences": [{"canvases": [
                canvas("c1"),
                canvas("c1"),
                {"@id": "c3", "height": 0, "width": 10}
            ]}]
        }));
        let report = validate_manifest(&m, &ValidateOptions::default());
        assert_eq!(report.error_count(), 2);
        assert!(report.has(IssueCode::DuplicateCanvasId));
        assert!(report.has(IssueCode::InvalidCanvasDimensions));
        assert!(report.has(IssueCode::CanvasWithoutImages));
    }

    #[test]
    fn test_invalid_manifest_id() {
        let mut m = valid_manifest();
        m.id = "manifest.json".to_string();
        let report = validate_manifest(&m, &ValidateOptions::default());
        assert!(!report.is_ok());
        assert!(report.has(IssueCode::InvalidManifestId));
    }

    fn collection(value: serde_json::Value) -> v2::Collection {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_collection() {
        let c = collection(json!({
            "@id": "https://x/collection/top.json",
            "label": "Top",
            "within": "https://x/collection/root.json",
            "collections": [{"@id": "https://x/collection/a.json", "label": "A"}],
            "manifests": [{"@id": "https://x/iiif/m1/manifest.json", "label": "M1"}]
        }));
        let report = validate_collection(&c, &ValidateOptions::default());
        assert!(report.is_clean(), "{:?}", report.issues);
    }

    #[test]
    fn test_collection_member_issues() {
        let c = collection(json!({
            "@id": "https://x/collection/top.json",
            "label": "Top",
            "within": "https://x/collection/",
            "manifests": [
                {"@id": "https://x/iiif/m1/manifest.json", "label": "M1"},
                {"@id": "https://x/iiif/m1/manifest.json", "label": ""},
                {"@id": "manifest.json", "label": "bad"}
            ]
        }));
        let report = validate_collection(&c, &ValidateOptions::default());
        assert!(report.has(IssueCode::InvalidCollectionId));
        assert!(report.has(IssueCode::DuplicateMember));
        assert!(report.has(IssueCode::EmptyLabel));
        assert!(report.has(IssueCode::InvalidMemberId));
        assert_eq!(report.error_count(), 2);
    }

    #[test]
    fn test_validate_document_dispatches() {
        let doc = V2Document::Manifest(valid_manifest());
        assert!(validate_document(&doc, &ValidateOptions::default()).is_clean());
    }
}
