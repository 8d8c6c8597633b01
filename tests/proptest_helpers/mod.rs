#![allow(dead_code)]

use iiifconv::model::v2;
use proptest::collection::vec;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use serde_json::{json, Value};

pub const BASE: &str = "https://hi-ut.github.io/dataset/iiif";

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Folder names as the catalog uses them (`<database>-<number>`).
pub fn folder_name() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,11}-[0-9]{4}"
}

/// Free text for labels and metadata, including non-ASCII.
pub fn text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,16}",
        "[ぁ-んァ-ン一-龯]{1,8}",
    ]
}

pub fn metadata_entries() -> impl Strategy<Value = Vec<(String, String)>> {
    vec((text(), text()), 0..8)
}

fn image_json(canvas_id: &str, index: usize, format: Option<&'static str>, on_canvas: bool) -> Value {
    let mut resource = json!({
        "@id": format!("http://img.example/{index}.jpg"),
        "@type": "dctypes:Image",
        "width": 1000 + index,
        "height": 800
    });
    if let Some(format) = format {
        resource["format"] = json!(format);
    }
    let on = if on_canvas {
        canvas_id.to_string()
    } else {
        format!("{canvas_id}#xywh=0,0,10,10")
    };
    json!({
        "@id": format!("{canvas_id}/annotation/{index}"),
        "@type": "oa:Annotation",
        "motivation": "sc:painting",
        "on": on,
        "resource": resource
    })
}

/// A v2 canvas with 0..4 images, some lacking a format or pointing at a
/// fragment of the canvas.
pub fn arb_canvas(manifest: String, index: usize) -> BoxedStrategy<Value> {
    vec(
        (
            prop_oneof![Just(None), Just(Some("image/jpeg")), Just(Some("image/png"))],
            any::<bool>(),
        ),
        0..4,
    )
    .prop_map(move |images| {
        let canvas_id = format!("{BASE}/{manifest}/canvas/p{}", index + 1);
        let images: Vec<Value> = images
            .into_iter()
            .enumerate()
            .map(|(i, (format, on_canvas))| image_json(&canvas_id, i, format, on_canvas))
            .collect();
        json!({
            "@id": canvas_id,
            "@type": "sc:Canvas",
            "label": format!("[{}]", index + 1),
            "height": 800,
            "width": 1000,
            "images": images
        })
    })
    .boxed()
}

/// A v2 manifest in the catalog layout with one or more sequences.
pub fn arb_manifest() -> BoxedStrategy<v2::Manifest> {
    (folder_name(), text(), metadata_entries(), 0usize..5, 1usize..3)
        .prop_flat_map(|(name, label, metadata, canvas_count, sequence_count)| {
            let canvases: Vec<BoxedStrategy<Value>> = (0..canvas_count)
                .map(|i| arb_canvas(name.clone(), i))
                .collect();
            (
                Just(name),
                Just(label),
                Just(metadata),
                canvases,
                Just(sequence_count),
            )
        })
        .prop_map(|(name, label, metadata, canvases, sequence_count)| {
            let metadata: Vec<Value> = metadata
                .into_iter()
                .map(|(label, value)| json!({"label": label, "value": value}))
                .collect();
            let mut sequences = vec![json!({"canvases": canvases})];
            for _ in 1..sequence_count {
                sequences.push(json!({"canvases": []}));
            }
            let value = json!({
                "@context": iiifconv::model::V2_CONTEXT,
                "@id": format!("{BASE}/{name}/manifest.json"),
                "@type": "sc:Manifest",
                "label": label,
                "metadata": metadata,
                "sequences": sequences
            });
            serde_json::from_value(value).expect("generated manifest parses")
        })
        .boxed()
}

/// A v2 collection with nested collections and manifest stubs.
pub fn arb_collection() -> BoxedStrategy<v2::Collection> {
    (
        "[a-z]{1,10}",
        vec(("[a-z]{1,10}", text()), 0..4),
        vec((folder_name(), text()), 0..6),
    )
        .prop_map(|(name, collections, manifests)| {
            let collections: Vec<Value> = collections
                .into_iter()
                .map(|(file, label)| {
                    json!({"@id": format!("{BASE}/collection/{file}.json"), "label": label})
                })
                .collect();
            let manifests: Vec<Value> = manifests
                .into_iter()
                .map(|(folder, label)| {
                    json!({"@id": format!("{BASE}/{folder}/manifest.json"), "label": label})
                })
                .collect();
            let value = json!({
                "@id": format!("{BASE}/collection/{name}.json"),
                "@type": "sc:Collection",
                "label": name,
                "collections": collections,
                "manifests": manifests
            });
            serde_json::from_value(value).expect("generated collection parses")
        })
        .boxed()
}
