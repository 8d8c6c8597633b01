//! IIIF Presentation v2 to v3 conversion.
//!
//! The converters are pure functions: they take a parsed v2 document and a
//! [`ConvertConfig`], and return the v3 document together with a
//! [`ConversionReport`]. Reading and writing files is left to
//! [`crate::io_json`] and [`crate::batch`].
//!
//! # Example
//!
//! ```
//! use iiifconv::config::ConvertConfig;
//! use iiifconv::convert::convert_manifest;
//! use iiifconv::model::v2;
//!
//! let manifest: v2::Manifest = serde_json::from_str(r#"{
//!     "@id": "https://hi-ut.github.io/dataset/iiif/nishikie_hi-0001/manifest.json",
//!     "label": "東海道五拾三次",
//!     "sequences": [{"canvases": []}]
//! }"#).unwrap();
//!
//! let converted = convert_manifest(&manifest, &ConvertConfig::default()).unwrap();
//! assert_eq!(
//!     converted.document.id,
//!     "https://hi-ut.github.io/dataset/iiif/3/nishikie_hi-0001/manifest.json"
//! );
//! assert!(!converted.report.is_lossy());
//! ```

mod collection;
mod manifest;
pub mod report;

pub use collection::{convert_collection, convert_collection_reference, convert_manifest_reference};
pub use manifest::{convert_canvas, convert_manifest};
pub use report::{
    ConversionCounts, ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity,
};

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::config::{ConvertConfig, SummaryPolicy};
use crate::model::v2::{ImageRef, MetadataEntry};
use crate::model::v3::{ImageDescriptor, LabelValue, LanguageMap, ResourceType};
use crate::model::DEFAULT_IMAGE_FORMAT;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid HTML tag regex"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// The two kinds of top-level document handled by the converter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Manifest,
    Collection,
}

impl DocumentKind {
    /// Human-readable name for the kind.
    pub fn name(&self) -> &'static str {
        match self {
            DocumentKind::Manifest => "manifest",
            DocumentKind::Collection => "collection",
        }
    }
}

/// A converted document and the report describing its conversion.
#[derive(Clone, Debug)]
pub struct Converted<T> {
    pub document: T,
    pub report: ConversionReport,
}

/// Maps v2 metadata pairs to v3 language-mapped pairs, preserving order.
pub fn convert_metadata(entries: &[MetadataEntry], language: &str) -> Vec<LabelValue> {
    entries
        .iter()
        .map(|entry| LabelValue {
            label: LanguageMap::single(language, entry.label.as_str()),
            value: LanguageMap::single(language, entry.value.as_str()),
        })
        .collect()
}

/// Normalizes an optional v2 thumbnail into a v3 thumbnail list.
///
/// - absent or empty URL: `[]`
/// - bare URL: `[{id, type: "Image"}]`
/// - descriptor: `[{id, type: "Image", format, width, height}]`, with
///   `format` defaulting to `image/jpeg`
pub fn convert_thumbnail(thumbnail: Option<&ImageRef>) -> Vec<ImageDescriptor> {
    match thumbnail {
        None => Vec::new(),
        Some(ImageRef::Url(url)) if url.is_empty() => Vec::new(),
        Some(ImageRef::Url(url)) => vec![ImageDescriptor {
            id: url.clone(),
            kind: ResourceType::Image,
            format: None,
            width: None,
            height: None,
        }],
        Some(ImageRef::Descriptor(desc)) => vec![ImageDescriptor {
            id: desc.id.clone(),
            kind: ResourceType::Image,
            format: Some(
                desc.format
                    .clone()
                    .unwrap_or_else(|| DEFAULT_IMAGE_FORMAT.to_string()),
            ),
            width: desc.width,
            height: desc.height,
        }],
    }
}

/// Builds a v3 `summary` from a v2 `description` according to the policy.
///
/// Records an info note when the description carries markup.
pub(crate) fn convert_summary(
    description: &str,
    config: &ConvertConfig,
    report: &mut ConversionReport,
) -> LanguageMap {
    let has_markup = HTML_TAG.is_match(description);
    let text = match config.summary {
        SummaryPolicy::Verbatim => {
            if has_markup {
                report.add(ConversionIssue::info(
                    ConversionIssueCode::SummaryHtmlPassthrough,
                    "description contains HTML markup; copied to summary verbatim",
                ));
            }
            description.to_string()
        }
        SummaryPolicy::StripHtml => {
            if has_markup {
                report.add(ConversionIssue::info(
                    ConversionIssueCode::SummaryHtmlStripped,
                    "HTML markup removed from description when building summary",
                ));
            }
            strip_html(description)
        }
    };
    LanguageMap::single(&config.language, text)
}

/// Removes HTML tags, decodes the common entities and collapses whitespace.
pub fn strip_html(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    WHITESPACE_RUN.replace_all(decoded.trim(), " ").into_owned()
}
