//! Manifest and canvas conversion.

use crate::config::ConvertConfig;
use crate::error::IiifError;
use crate::ids;
use crate::model::v2;
use crate::model::v3::{
    self, Agent, Annotation, AnnotationPage, ImageBody, ImageDescriptor, LabelValue, LanguageMap,
    ResourceType,
};
use crate::model::{DEFAULT_IMAGE_FORMAT, V3_CONTEXT};

use super::{
    convert_metadata, convert_summary, convert_thumbnail, ConversionCounts, ConversionIssue,
    ConversionIssueCode, ConversionReport, Converted, DocumentKind,
};

const PAINTING: &str = "painting";

/// Converts a v2 manifest into a v3 manifest.
///
/// Only the canvases of the first sequence become v3 `items`. Any further
/// sequence is dropped and recorded as a lossiness warning in the report.
///
/// # Errors
/// Fails when the v3 id cannot be derived from the manifest `@id`.
pub fn convert_manifest(
    manifest: &v2::Manifest,
    config: &ConvertConfig,
) -> Result<Converted<v3::Manifest>, IiifError> {
    let language = config.language.as_str();
    let id = ids::v3_manifest_id(config, &manifest.id)?;

    let mut report = ConversionReport::new(DocumentKind::Manifest, &manifest.id);
    report.target_id = Some(id.clone());
    report.input = manifest_counts(&manifest.sequences);

    if !manifest.extra.is_empty() {
        let keys: Vec<&str> = manifest.extra.keys().map(String::as_str).collect();
        report.add(ConversionIssue::warning(
            ConversionIssueCode::DropUnmappedFields,
            format!("v2 key(s) with no v3 mapping dropped: {}", keys.join(", ")),
        ));
    }

    let summary = manifest
        .description
        .as_deref()
        .map(|description| convert_summary(description, config, &mut report));

    let required_statement = manifest.attribution.as_ref().map(|attribution| LabelValue {
        label: LanguageMap::single(language, config.attribution_label.as_str()),
        value: LanguageMap::single(language, attribution.as_str()),
    });

    let provider = manifest.logo.as_ref().map(|logo| {
        vec![Agent {
            id: config.provider.id.clone(),
            kind: ResourceType::Agent,
            label: LanguageMap::single(language, config.provider.label.as_str()),
            logo: vec![ImageDescriptor {
                id: logo.url().to_string(),
                kind: ResourceType::Image,
                format: Some(config.provider.logo_format.clone()),
                width: None,
                height: None,
            }],
        }]
    });

    if manifest.sequences.len() > 1 {
        let dropped = &manifest.sequences[1..];
        let dropped_canvases: usize = dropped.iter().map(|s| s.canvases.len()).sum();
        report.add(ConversionIssue::warning(
            ConversionIssueCode::DropExtraSequences,
            format!(
                "{} sequence(s) after the first dropped ({} canvas(es))",
                dropped.len(),
                dropped_canvases
            ),
        ));
    }

    let canvases: &[v2::Canvas] = manifest
        .sequences
        .first()
        .map(|sequence| sequence.canvases.as_slice())
        .unwrap_or(&[]);
    note_canvas_policies(canvases, &mut report);

    let items: Vec<v3::Canvas> = canvases
        .iter()
        .map(|canvas| convert_canvas(canvas, language))
        .collect();

    report.output = ConversionCounts {
        sequences: manifest.sequences.len().min(1),
        canvases: items.len(),
        annotations: items
            .iter()
            .flat_map(|canvas| &canvas.items)
            .map(|page| page.items.len())
            .sum(),
        members: 0,
    };

    let document = v3::Manifest {
        context: V3_CONTEXT.to_string(),
        id,
        kind: ResourceType::Manifest,
        label: LanguageMap::single(language, manifest.label.as_str()),
        metadata: manifest
            .metadata
            .as_deref()
            .map(|entries| convert_metadata(entries, language)),
        summary,
        required_statement,
        rights: manifest.license.clone(),
        provider,
        thumbnail: manifest
            .thumbnail
            .as_ref()
            .map(|thumb| convert_thumbnail(Some(thumb))),
        viewing_direction: manifest.viewing_direction.clone(),
        items,
    };

    Ok(Converted { document, report })
}

/// Converts a v2 canvas into a v3 canvas.
///
/// Non-empty `images` become exactly one `AnnotationPage` (`<canvas>/page`)
/// holding one painting annotation per image. Every annotation targets the
/// canvas itself, whatever its v2 `on` said.
pub fn convert_canvas(canvas: &v2::Canvas, language: &str) -> v3::Canvas {
    let items = if canvas.images.is_empty() {
        Vec::new()
    } else {
        let annotations = canvas
            .images
            .iter()
            .map(|image| Annotation {
                id: image.id.clone(),
                kind: ResourceType::Annotation,
                motivation: PAINTING.to_string(),
                body: ImageBody {
                    id: image.resource.id.clone(),
                    kind: ResourceType::Image,
                    format: image
                        .resource
                        .format
                        .clone()
                        .unwrap_or_else(|| DEFAULT_IMAGE_FORMAT.to_string()),
                    height: image.resource.height,
                    width: image.resource.width,
                },
                target: canvas.id.clone(),
            })
            .collect();

        vec![AnnotationPage {
            id: format!("{}/page", canvas.id),
            kind: ResourceType::AnnotationPage,
            items: annotations,
        }]
    };

    v3::Canvas {
        id: canvas.id.clone(),
        kind: ResourceType::Canvas,
        label: LanguageMap::single(language, canvas.label.as_str()),
        height: canvas.height,
        width: canvas.width,
        items,
        thumbnail: canvas
            .thumbnail
            .as_ref()
            .map(|thumb| convert_thumbnail(Some(thumb))),
    }
}

fn manifest_counts(sequences: &[v2::Sequence]) -> ConversionCounts {
    ConversionCounts {
        sequences: sequences.len(),
        canvases: sequences.iter().map(|s| s.canvases.len()).sum(),
        annotations: sequences
            .iter()
            .flat_map(|s| &s.canvases)
            .map(|c| c.images.len())
            .sum(),
        members: 0,
    }
}

fn note_canvas_policies(canvases: &[v2::Canvas], report: &mut ConversionReport) {
    let without_images = canvases.iter().filter(|c| c.images.is_empty()).count();
    if without_images > 0 {
        report.add(ConversionIssue::info(
            ConversionIssueCode::CanvasWithoutImages,
            format!(
                "{} canvas(es) have no images and get an empty items list",
                without_images
            ),
        ));
    }

    let retargeted = canvases
        .iter()
        .flat_map(|canvas| canvas.images.iter().map(move |image| (canvas, image)))
        .filter(|(canvas, image)| {
            image
                .on
                .as_deref()
                .is_some_and(|target| target != canvas.id)
        })
        .count();
    if retargeted > 0 {
        report.add(ConversionIssue::info(
            ConversionIssueCode::AnnotationTargetRewritten,
            format!(
                "{} image annotation(s) retargeted to their owning canvas",
                retargeted
            ),
        ));
    }
}
