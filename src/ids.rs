//! Derivation of v3 ids from v2 `@id` URLs.
//!
//! The catalog lays out v2 documents as `.../<manifestName>/manifest.json`
//! and `.../collection/<filename>`. v3 ids keep the manifest folder name or
//! the collection file name and substitute it into the configured template.

use crate::config::ConvertConfig;
use crate::error::IiifError;

/// Returns the manifest folder name: the second-to-last `/` segment.
///
/// # Errors
/// Fails when the id has fewer than two segments or that segment is empty.
pub fn manifest_name(v2_id: &str) -> Result<&str, IiifError> {
    let mut segments = v2_id.rsplit('/');
    let _last = segments.next();
    match segments.next() {
        Some(name) if !name.is_empty() => Ok(name),
        Some(_) => Err(IiifError::IdDerivation {
            id: v2_id.to_string(),
            message: "second-to-last path segment is empty".to_string(),
        }),
        None => Err(IiifError::IdDerivation {
            id: v2_id.to_string(),
            message: "expected at least two '/'-separated segments".to_string(),
        }),
    }
}

/// Returns the collection file name: the last `/` segment.
///
/// # Errors
/// Fails when the last segment is empty (e.g. a trailing slash).
pub fn collection_filename(v2_id: &str) -> Result<&str, IiifError> {
    match v2_id.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(IiifError::IdDerivation {
            id: v2_id.to_string(),
            message: "last path segment is empty".to_string(),
        }),
    }
}

/// Maps a v2 manifest `@id` to its v3 manifest URL.
pub fn v3_manifest_id(config: &ConvertConfig, v2_id: &str) -> Result<String, IiifError> {
    manifest_name(v2_id).map(|name| config.manifest_id(name))
}

/// Maps a v2 collection `@id` (or `within` URL) to its v3 collection URL.
pub fn v3_collection_id(config: &ConvertConfig, v2_id: &str) -> Result<String, IiifError> {
    collection_filename(v2_id).map(|name| config.collection_id(name))
}
