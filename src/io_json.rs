//! Reading v2 documents and writing JSON output.
//!
//! Output is pretty-printed with four-space indentation and non-ASCII text
//! written literally, matching the layout of the published catalog files.
//! Files are written to a sibling temporary path and renamed into place, so
//! a failed write never leaves a partial document behind.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::convert::DocumentKind;
use crate::error::IiifError;
use crate::model::v2;

const INDENT: &[u8] = b"    ";

/// A parsed v2 document of either kind.
#[derive(Clone, Debug)]
pub enum V2Document {
    Manifest(v2::Manifest),
    Collection(v2::Collection),
}

impl V2Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            V2Document::Manifest(_) => DocumentKind::Manifest,
            V2Document::Collection(_) => DocumentKind::Collection,
        }
    }
}

/// Reads a v2 manifest from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a v2 manifest.
pub fn read_manifest(path: &Path) -> Result<v2::Manifest, IiifError> {
    read_json(path)
}

/// Reads a v2 collection from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not a v2 collection.
pub fn read_collection(path: &Path) -> Result<v2::Collection, IiifError> {
    read_json(path)
}

/// Reads a v2 document, deciding its kind from the content.
///
/// `@type` wins when present; otherwise `sequences` marks a manifest and
/// `manifests`/`collections` mark a collection.
pub fn read_document(path: &Path) -> Result<V2Document, IiifError> {
    let value: serde_json::Value = read_json(path)?;
    let kind = detect_kind(&value).ok_or_else(|| {
        IiifError::UnsupportedKind(format!(
            "{} is neither a v2 manifest nor a v2 collection",
            path.display()
        ))
    })?;
    let parse_err = |source| IiifError::JsonParse {
        path: path.to_path_buf(),
        source,
    };
    match kind {
        DocumentKind::Manifest => serde_json::from_value(value)
            .map(V2Document::Manifest)
            .map_err(parse_err),
        DocumentKind::Collection => serde_json::from_value(value)
            .map(V2Document::Collection)
            .map_err(parse_err),
    }
}

/// Guesses the document kind of a parsed v2 JSON value.
pub fn detect_kind(value: &serde_json::Value) -> Option<DocumentKind> {
    let object = value.as_object()?;
    match object.get("@type").and_then(|t| t.as_str()) {
        Some("sc:Manifest") => return Some(DocumentKind::Manifest),
        Some("sc:Collection") => return Some(DocumentKind::Collection),
        _ => {}
    }
    if object.contains_key("sequences") {
        Some(DocumentKind::Manifest)
    } else if object.contains_key("manifests") || object.contains_key("collections") {
        Some(DocumentKind::Collection)
    } else {
        None
    }
}

/// Parses a v2 manifest from bytes.
///
/// Useful for testing without file I/O.
pub fn manifest_from_slice(bytes: &[u8]) -> Result<v2::Manifest, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Parses a v2 collection from bytes.
pub fn collection_from_slice(bytes: &[u8]) -> Result<v2::Collection, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Serializes a value as four-space-indented JSON.
pub fn to_json_vec<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

/// Serializes a value as a four-space-indented JSON string.
pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    to_json_vec(value).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes a value as JSON, creating parent directories as needed.
///
/// The document is fully serialized before anything touches the disk.
///
/// # Errors
/// Returns an error if serialization, directory creation or the write fails.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IiifError> {
    let bytes = to_json_vec(value).map_err(|source| IiifError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    if let Err(err) = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(IiifError::Io(err));
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, IiifError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| IiifError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
