//! IIIF Presentation 3 output types.
//!
//! Field order is the key order of the emitted JSON. Absent optional fields
//! are omitted rather than written as `null`.

use std::collections::BTreeMap;

use serde::Serialize;

/// The `type` value of a v3 resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ResourceType {
    Manifest,
    Collection,
    Canvas,
    AnnotationPage,
    Annotation,
    Image,
    Agent,
}

/// A v3 language map, e.g. `{"ja": ["錦絵"]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LanguageMap(pub BTreeMap<String, Vec<String>>);

impl LanguageMap {
    /// A map holding a single value under `language`.
    pub fn single(language: &str, value: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(language.to_string(), vec![value.into()]);
        Self(map)
    }

    /// The first value stored under `language`, if any.
    pub fn first(&self, language: &str) -> Option<&str> {
        self.0
            .get(language)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// A `{label, value}` pair, used for `metadata` and `requiredStatement`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelValue {
    pub label: LanguageMap,
    pub value: LanguageMap,
}

/// A v3 manifest.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(rename = "@context")]
    pub context: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub label: LanguageMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<LabelValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<LanguageMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_statement: Option<LabelValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Vec<Agent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Vec<ImageDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewing_direction: Option<String>,
    pub items: Vec<Canvas>,
}

/// An institution credited as `provider`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Agent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub label: LanguageMap,
    pub logo: Vec<ImageDescriptor>,
}

/// An image used as thumbnail or logo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
}

/// A v3 canvas.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Canvas {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub label: LanguageMap,
    pub height: u64,
    pub width: u64,
    pub items: Vec<AnnotationPage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Vec<ImageDescriptor>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotationPage {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub items: Vec<Annotation>,
}

/// A painting annotation placing one image on a canvas.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Annotation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub motivation: String,
    pub body: ImageBody,
    pub target: String,
}

/// The image painted by an [`Annotation`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageBody {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u64>,
}

/// A v3 collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(rename = "@context")]
    pub context: String,
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub label: LanguageMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<LanguageMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Vec<ImageDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_of: Option<Vec<Reference>>,
    pub items: Vec<CollectionItem>,
}

/// A bare `{id, type}` link, used for `partOf`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Reference {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
}

/// A member of a v3 collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CollectionItem {
    Collection(CollectionRef),
    Manifest(ManifestRef),
}

/// A sub-collection listed in a v3 collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CollectionRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub label: LanguageMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Vec<ImageDescriptor>>,
}

/// A manifest listed in a v3 collection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ManifestRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub label: LanguageMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<LabelValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Vec<ImageDescriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rights: Option<String>,
}
