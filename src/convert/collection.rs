//! Collection and member-reference conversion.

use crate::config::ConvertConfig;
use crate::error::IiifError;
use crate::ids;
use crate::model::v2;
use crate::model::v3::{self, CollectionItem, LanguageMap, Reference, ResourceType};
use crate::model::V3_CONTEXT;

use super::{
    convert_metadata, convert_summary, convert_thumbnail, ConversionCounts, ConversionIssue,
    ConversionIssueCode, ConversionReport, Converted, DocumentKind,
};

/// Converts a manifest stub listed in a v2 collection.
///
/// The v3 id comes from the manifest folder name (second-to-last segment of
/// `@id`); `license` becomes `rights`.
pub fn convert_manifest_reference(
    manifest: &v2::ManifestRef,
    config: &ConvertConfig,
) -> Result<v3::ManifestRef, IiifError> {
    let language = config.language.as_str();
    Ok(v3::ManifestRef {
        id: ids::v3_manifest_id(config, &manifest.id)?,
        kind: ResourceType::Manifest,
        label: LanguageMap::single(language, manifest.label.as_str()),
        metadata: manifest
            .metadata
            .as_deref()
            .map(|entries| convert_metadata(entries, language)),
        thumbnail: manifest
            .thumbnail
            .as_ref()
            .map(|thumb| convert_thumbnail(Some(thumb))),
        rights: manifest.license.clone(),
    })
}

/// Converts a sub-collection stub listed in a v2 collection.
///
/// The v3 id comes from the collection file name (last segment of `@id`).
pub fn convert_collection_reference(
    collection: &v2::CollectionRef,
    config: &ConvertConfig,
) -> Result<v3::CollectionRef, IiifError> {
    Ok(v3::CollectionRef {
        id: ids::v3_collection_id(config, &collection.id)?,
        kind: ResourceType::Collection,
        label: LanguageMap::single(&config.language, collection.label.as_str()),
        thumbnail: collection
            .thumbnail
            .as_ref()
            .map(|thumb| convert_thumbnail(Some(thumb))),
    })
}

/// Converts a v2 collection into a v3 collection.
///
/// `items` lists the nested collections first, then the manifests, each in
/// source order. `within` becomes a single-entry `partOf`. `vhint` is
/// accepted and dropped with an info note.
///
/// # Errors
/// Fails when any v3 id (own, parent or member) cannot be derived.
pub fn convert_collection(
    collection: &v2::Collection,
    config: &ConvertConfig,
) -> Result<Converted<v3::Collection>, IiifError> {
    let id = ids::v3_collection_id(config, &collection.id)?;

    let mut report = ConversionReport::new(DocumentKind::Collection, &collection.id);
    report.target_id = Some(id.clone());

    let sub_collections = collection.collections.as_deref().unwrap_or(&[]);
    let manifests = collection.manifests.as_deref().unwrap_or(&[]);
    report.input.members = sub_collections.len() + manifests.len();

    if !collection.extra.is_empty() {
        let keys: Vec<&str> = collection.extra.keys().map(String::as_str).collect();
        report.add(ConversionIssue::warning(
            ConversionIssueCode::DropUnmappedFields,
            format!("v2 key(s) with no v3 mapping dropped: {}", keys.join(", ")),
        ));
    }

    if let Some(vhint) = &collection.vhint {
        report.add(ConversionIssue::info(
            ConversionIssueCode::VhintIgnored,
            format!("vhint '{}' has no v3 equivalent and is not emitted", vhint),
        ));
    }

    let summary = collection
        .description
        .as_deref()
        .map(|description| convert_summary(description, config, &mut report));

    let part_of = collection
        .within
        .as_deref()
        .map(|parent| {
            ids::v3_collection_id(config, parent).map(|parent_id| {
                vec![Reference {
                    id: parent_id,
                    kind: ResourceType::Collection,
                }]
            })
        })
        .transpose()?;

    let mut items = Vec::with_capacity(report.input.members);
    for sub in sub_collections {
        items.push(CollectionItem::Collection(convert_collection_reference(
            sub, config,
        )?));
    }
    for manifest in manifests {
        items.push(CollectionItem::Manifest(convert_manifest_reference(
            manifest, config,
        )?));
    }

    report.output = ConversionCounts {
        members: items.len(),
        ..Default::default()
    };

    let document = v3::Collection {
        context: V3_CONTEXT.to_string(),
        id,
        kind: ResourceType::Collection,
        label: LanguageMap::single(&config.language, collection.label.as_str()),
        summary,
        thumbnail: collection
            .thumbnail
            .as_ref()
            .map(|thumb| convert_thumbnail(Some(thumb))),
        part_of,
        items,
    };

    Ok(Converted { document, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> v2::Collection {
        serde_json::from_value(value).expect("valid v2 collection")
    }

    fn sample_collection() -> serde_json::Value {
        json!({
            "@context": "http://iiif.io/api/presentation/2/context.json",
            "@id": "https://hi-ut.github.io/dataset/iiif/collection/nishikie_shizuoka.json",
            "@type": "sc:Collection",
            "label": "錦絵データベース",
            "description": "<p>静岡県立中央図書館</p>",
            "thumbnail": "https://img/thumb.jpg",
            "within": "https://hi-ut.github.io/dataset/iiif/collection/parent.json",
            "vhint": "use-thumb",
            "collections": [
                {"@id": "https://hi-ut.github.io/dataset/iiif/collection/sub.json", "label": "sub"}
            ],
            "manifests": [
                {
                    "@id": "https://hi-ut.github.io/dataset/iiif/nishikie_shizuoka-0001/manifest.json",
                    "@type": "sc:Manifest",
                    "label": "一",
                    "license": "https://license",
                    "metadata": [{"label": "題名", "value": "一"}],
                    "thumbnail": {"@id": "https://img/1.jpg", "format": "image/png"}
                },
                {
                    "@id": "https://hi-ut.github.io/dataset/iiif/nishikie_shizuoka-0002/manifest.json",
                    "label": "二"
                }
            ]
        })
    }

    #[test]
    fn converts_root_fields() {
        let converted = convert_collection(&parse(sample_collection()), &ConvertConfig::default())
            .unwrap();
        let value = serde_json::to_value(&converted.document).unwrap();

        assert_eq!(
            value["id"],
            "https://hi-ut.github.io/dataset/iiif/collection/3/nishikie_shizuoka.json"
        );
        assert_eq!(value["type"], "Collection");
        assert_eq!(value["summary"], json!({"ja": ["<p>静岡県立中央図書館</p>"]}));
        assert_eq!(
            value["thumbnail"],
            json!([{"id": "https://img/thumb.jpg", "type": "Image"}])
        );
        assert_eq!(
            value["partOf"],
            json!([{
                "id": "https://hi-ut.github.io/dataset/iiif/collection/3/parent.json",
                "type": "Collection"
            }])
        );
        assert!(value.get("vhint").is_none());
    }

    #[test]
    fn items_list_collections_before_manifests() {
        let converted = convert_collection(&parse(sample_collection()), &ConvertConfig::default())
            .unwrap();
        let value = serde_json::to_value(&converted.document.items).unwrap();
        let items = value.as_array().unwrap();

        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["type"], "Collection");
        assert_eq!(
            items[0]["id"],
            "https://hi-ut.github.io/dataset/iiif/collection/3/sub.json"
        );
        assert_eq!(items[1]["type"], "Manifest");
        assert_eq!(
            items[1]["id"],
            "https://hi-ut.github.io/dataset/iiif/3/nishikie_shizuoka-0001/manifest.json"
        );
        assert_eq!(items[1]["rights"], "https://license");
        assert_eq!(items[1]["metadata"][0]["value"], json!({"ja": ["一"]}));
        assert_eq!(items[1]["thumbnail"][0]["format"], "image/png");
        assert_eq!(items[2]["label"], json!({"ja": ["二"]}));
        assert!(items[2].get("rights").is_none());
    }

    #[test]
    fn vhint_is_an_info_note() {
        let report = convert_collection(&parse(sample_collection()), &ConvertConfig::default())
            .unwrap()
            .report;
        assert!(report.has(ConversionIssueCode::VhintIgnored));
        assert!(report.has(ConversionIssueCode::SummaryHtmlPassthrough));
        assert!(!report.is_lossy());
        assert_eq!(report.input.members, 3);
        assert_eq!(report.output.members, 3);
    }

    #[test]
    fn empty_collection_has_empty_items() {
        let converted = convert_collection(
            &parse(json!({"@id": "https://x/collection/empty.json", "label": "empty"})),
            &ConvertConfig::default(),
        )
        .unwrap();
        assert!(converted.document.items.is_empty());
        assert!(converted.document.part_of.is_none());
        assert!(converted.report.issues.is_empty());
    }

    #[test]
    fn bad_member_id_fails_the_document() {
        let mut value = sample_collection();
        value["manifests"] = json!([{"@id": "manifest.json", "label": "bad"}]);
        assert!(matches!(
            convert_collection(&parse(value), &ConvertConfig::default()),
            Err(IiifError::IdDerivation { .. })
        ));
    }

    #[test]
    fn bad_within_fails_the_document() {
        let mut value = sample_collection();
        value["within"] = json!("https://x/collection/");
        assert!(convert_collection(&parse(value), &ConvertConfig::default()).is_err());
    }

    #[test]
    fn collection_reference_accepts_descriptor_thumbnail() {
        let reference: v2::CollectionRef = serde_json::from_value(json!({
            "@id": "https://x/collection/a.json",
            "thumbnail": {"@id": "https://img/a.jpg", "width": 10, "height": 20}
        }))
        .unwrap();
        let out = convert_collection_reference(&reference, &ConvertConfig::default()).unwrap();
        assert_eq!(out.label.first("ja"), Some(""));
        let thumb = &out.thumbnail.unwrap()[0];
        assert_eq!(thumb.format.as_deref(), Some("image/jpeg"));
        assert_eq!(thumb.height, Some(20));
    }

    #[test]
    fn manifest_reference_accepts_bare_thumbnail() {
        let reference: v2::ManifestRef = serde_json::from_value(json!({
            "@id": "https://x/iiif/item/manifest.json",
            "thumbnail": "https://img/item.jpg"
        }))
        .unwrap();
        let out = convert_manifest_reference(&reference, &ConvertConfig::default()).unwrap();
        assert_eq!(out.thumbnail.unwrap()[0].id, "https://img/item.jpg");
    }
}
