//! Building a v2 collection from a set of v2 manifests.
//!
//! The catalog publishes one v2 collection per source database, listing a
//! stub for every manifest whose folder starts with the database name
//! (`<root>/<name>-0001/manifest.json`, ...). The collection is written with
//! sorted keys, like the manifests it lists.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::IiifError;
use crate::io_json;
use crate::model::v2::{self, ManifestRef};
use crate::model::V2_CONTEXT;

pub const DEFAULT_BASE_URL: &str = "https://hi-ut.github.io/dataset";
const MANIFEST_FILE: &str = "manifest.json";

/// Options for [`build_collection`].
#[derive(Clone, Debug)]
pub struct CollectOptions {
    /// Collection name; also the folder prefix of its manifests.
    pub name: String,
    /// Collection label.
    pub label: String,
    /// Site root; the collection id is `{base_url}/iiif/collection/{name}.json`.
    pub base_url: String,
    /// Viewer hint written to the collection.
    pub vhint: Option<String>,
}

impl CollectOptions {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            vhint: Some("use-thumb".to_string()),
        }
    }

    /// The `@id` of the collection being built.
    pub fn collection_id(&self) -> String {
        format!(
            "{}/iiif/collection/{}.json",
            self.base_url.trim_end_matches('/'),
            self.name
        )
    }
}

/// Builds a v2 collection listing a stub for each manifest, in order.
pub fn build_collection(manifests: &[v2::Manifest], opts: &CollectOptions) -> v2::Collection {
    let stubs = manifests.iter().map(manifest_stub).collect();

    v2::Collection {
        context: Some(V2_CONTEXT.to_string()),
        id: opts.collection_id(),
        kind: Some("sc:Collection".to_string()),
        label: opts.label.clone(),
        manifests: Some(stubs),
        vhint: opts.vhint.clone(),
        ..Default::default()
    }
}

/// The stub a collection lists for one manifest.
pub fn manifest_stub(manifest: &v2::Manifest) -> ManifestRef {
    ManifestRef {
        context: Some(V2_CONTEXT.to_string()),
        id: manifest.id.clone(),
        kind: Some("sc:Manifest".to_string()),
        label: manifest.label.clone(),
        license: manifest.license.clone(),
        metadata: Some(manifest.metadata.clone().unwrap_or_default()),
        thumbnail: manifest.thumbnail.clone(),
    }
}

/// Finds `<root>/<prefix>*/manifest.json` files, sorted by path.
///
/// # Errors
/// Fails if the directory cannot be traversed.
pub fn find_manifests(root: &Path, prefix: &str) -> Result<Vec<PathBuf>, IiifError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).min_depth(2).max_depth(2) {
        let entry = entry.map_err(|source| IiifError::Traversal {
            path: root.to_path_buf(),
            message: source.to_string(),
        })?;
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
            continue;
        }
        let in_prefixed_folder = entry
            .path()
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(prefix));
        if in_prefixed_folder {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Reads the matching manifests under `root` and writes their collection.
///
/// A manifest that cannot be read is logged and left out of the collection.
/// Returns the number of manifests listed.
pub fn collect_to_file(
    root: &Path,
    opts: &CollectOptions,
    output: &Path,
) -> Result<usize, IiifError> {
    let paths = find_manifests(root, &opts.name)?;
    let mut manifests = Vec::with_capacity(paths.len());
    for path in &paths {
        match io_json::read_manifest(path) {
            Ok(manifest) => manifests.push(manifest),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "manifest left out of collection"
                );
            }
        }
    }

    tracing::info!(
        count = manifests.len(),
        collection = %opts.collection_id(),
        "building v2 collection"
    );

    let collection = build_collection(&manifests, opts);
    // Round-trip through Value so object keys come out sorted.
    let sorted = serde_json::to_value(&collection).map_err(|source| IiifError::JsonWrite {
        path: output.to_path_buf(),
        source,
    })?;
    io_json::write_json(output, &sorted)?;
    Ok(manifests.len())
}
