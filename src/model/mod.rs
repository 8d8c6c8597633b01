//! Typed IIIF Presentation documents.
//!
//! [`v2`] holds the input side: serde structs that accept the v2 documents
//! published by the catalog. [`v3`] holds the output side, whose field order
//! fixes the key order of the written JSON.
//!
//! # Example
//!
//! ```
//! use iiifconv::model::v2;
//!
//! let json = r#"{
//!     "@id": "https://example.org/iiif/item-1/manifest.json",
//!     "label": "Item 1",
//!     "sequences": [{"canvases": []}]
//! }"#;
//! let manifest: v2::Manifest = serde_json::from_str(json).unwrap();
//! assert_eq!(manifest.label, "Item 1");
//! assert_eq!(manifest.sequences.len(), 1);
//! ```

pub mod v2;
pub mod v3;

/// The IIIF Presentation 2 JSON-LD context.
pub const V2_CONTEXT: &str = "http://iiif.io/api/presentation/2/context.json";

/// The IIIF Presentation 3 JSON-LD context.
pub const V3_CONTEXT: &str = "http://iiif.io/api/presentation/3/context.json";

/// Default MIME type for images that do not declare one.
pub const DEFAULT_IMAGE_FORMAT: &str = "image/jpeg";
