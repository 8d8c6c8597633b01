//! IIIF Presentation 2 input types.
//!
//! Only the keys the converters read are modeled. Required keys (`@id`,
//! canvas dimensions, metadata `label`/`value`, image `resource`) make
//! deserialization fail when missing. Manifest and collection roots keep any
//! other top-level keys in `extra` so that conversion can report them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A v2 manifest document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<MetadataEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<ImageRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageRef>,

    #[serde(
        rename = "viewingDirection",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub viewing_direction: Option<String>,

    #[serde(default)]
    pub sequences: Vec<Sequence>,

    /// Top-level keys with no modeled counterpart.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One `{label, value}` pair of descriptive metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub label: String,
    pub value: String,
}

impl MetadataEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// An image reference: either a bare URL or a descriptor object.
///
/// Used for `thumbnail` and `logo`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    Descriptor(ImageDescriptor),
}

impl ImageRef {
    /// The referenced URL regardless of form.
    pub fn url(&self) -> &str {
        match self {
            ImageRef::Url(url) => url,
            ImageRef::Descriptor(desc) => &desc.id,
        }
    }
}

/// An image described by `@id` plus optional format and dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
}

/// A v2 sequence; only its canvases are read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub canvases: Vec<Canvas>,
}

/// A v2 canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(default)]
    pub label: String,

    pub height: u64,
    pub width: u64,

    #[serde(default)]
    pub images: Vec<ImageAnnotation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageRef>,
}

/// A v2 painting annotation (`oa:Annotation`) wrapping an image resource.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageAnnotation {
    #[serde(rename = "@id")]
    pub id: String,

    pub resource: ImageDescriptor,

    /// Target canvas in v2. Not carried over; v3 targets the owning canvas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<String>,
}

/// A v2 collection document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageRef>,

    /// URL of the parent collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<CollectionRef>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests: Option<Vec<ManifestRef>>,

    /// Viewer hint (e.g. `use-thumb`). Has no v3 equivalent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vhint: Option<String>,

    /// Top-level keys with no modeled counterpart.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A manifest stub listed in a v2 collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestRef {
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<MetadataEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageRef>,
}

/// A sub-collection stub listed in a v2 collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollectionRef {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ImageRef>,
}
