//! Conversion configuration.
//!
//! Everything catalog-specific that ends up in v3 output (URL templates,
//! language key, provider agent) lives here and is passed into each
//! converter. Defaults target the hi-ut dataset on GitHub Pages.
//!
//! A config can be loaded from YAML; every key is optional:
//!
//! ```yaml
//! language: ja
//! manifest_id_template: "https://example.org/iiif/3/{manifestName}/manifest.json"
//! collection_id_template: "https://example.org/iiif/collection/3/{filename}"
//! summary: strip_html
//! provider:
//!   id: "https://example.org/"
//!   label: "Example Library"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IiifError;

/// Placeholder substituted with the manifest folder name.
pub const MANIFEST_NAME_PLACEHOLDER: &str = "{manifestName}";
/// Placeholder substituted with the collection file name.
pub const FILENAME_PLACEHOLDER: &str = "{filename}";

pub const DEFAULT_MANIFEST_ID_TEMPLATE: &str =
    "https://hi-ut.github.io/dataset/iiif/3/{manifestName}/manifest.json";
pub const DEFAULT_COLLECTION_ID_TEMPLATE: &str =
    "https://hi-ut.github.io/dataset/iiif/collection/3/{filename}";

/// Settings shared by all converters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Language key used for every v3 language map.
    pub language: String,

    /// Template for v3 manifest ids; must contain `{manifestName}`.
    pub manifest_id_template: String,

    /// Template for v3 collection ids; must contain `{filename}`.
    pub collection_id_template: String,

    /// Label of the `requiredStatement` built from v2 `attribution`.
    pub attribution_label: String,

    /// Agent emitted as `provider` when a v2 manifest has a `logo`.
    pub provider: ProviderConfig,

    /// How v2 `description` becomes v3 `summary`.
    pub summary: SummaryPolicy,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            language: "ja".to_string(),
            manifest_id_template: DEFAULT_MANIFEST_ID_TEMPLATE.to_string(),
            collection_id_template: DEFAULT_COLLECTION_ID_TEMPLATE.to_string(),
            attribution_label: "提供".to_string(),
            provider: ProviderConfig::default(),
            summary: SummaryPolicy::Verbatim,
        }
    }
}

impl ConvertConfig {
    /// Checks that both id templates carry their placeholder.
    pub fn validate(&self) -> Result<(), IiifError> {
        if !self.manifest_id_template.contains(MANIFEST_NAME_PLACEHOLDER) {
            return Err(IiifError::InvalidConfig(format!(
                "manifest_id_template must contain {}",
                MANIFEST_NAME_PLACEHOLDER
            )));
        }
        if !self.collection_id_template.contains(FILENAME_PLACEHOLDER) {
            return Err(IiifError::InvalidConfig(format!(
                "collection_id_template must contain {}",
                FILENAME_PLACEHOLDER
            )));
        }
        if self.language.is_empty() {
            return Err(IiifError::InvalidConfig(
                "language must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The v3 manifest URL for a manifest folder name.
    pub fn manifest_id(&self, manifest_name: &str) -> String {
        self.manifest_id_template
            .replace(MANIFEST_NAME_PLACEHOLDER, manifest_name)
    }

    /// The v3 collection URL for a collection file name.
    pub fn collection_id(&self, filename: &str) -> String {
        self.collection_id_template
            .replace(FILENAME_PLACEHOLDER, filename)
    }
}

/// The institution credited as v3 `provider`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub id: String,
    pub label: String,
    /// MIME type of the logo image.
    pub logo_format: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            id: "https://www.hi.u-tokyo.ac.jp/".to_string(),
            label: "東京大学史料編纂所".to_string(),
            logo_format: "image/x-icon".to_string(),
        }
    }
}

/// Treatment of v2 `description` when building v3 `summary`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryPolicy {
    /// Copy the description as-is, markup included.
    #[default]
    Verbatim,
    /// Remove HTML tags and collapse the remaining whitespace.
    StripHtml,
}

/// Loads a config from a YAML file and validates it.
pub fn load_config(path: &Path) -> Result<ConvertConfig, IiifError> {
    let text = fs::read_to_string(path)?;
    let config = from_yaml_str(&text).map_err(|source| IiifError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Parses a config from YAML text without validating it.
pub fn from_yaml_str(text: &str) -> Result<ConvertConfig, serde_yaml::Error> {
    if text.trim().is_empty() {
        return Ok(ConvertConfig::default());
    }
    serde_yaml::from_str(text)
}
