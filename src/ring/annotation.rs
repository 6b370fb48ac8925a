//! Annotation and label rings from custom tab-delimited feature files.

use crate::ring::{Ring, RingReference, RingSegment, RingType};
use crate::utils::sanitize_input;

use color_eyre::eyre::{Report, Result, WrapErr};
use serde::Deserialize;
use std::fmt::Debug;
use std::path::Path;

/// One row of a custom annotation file (`start`, `end`, `text`, optional `color`).
#[derive(Debug, Deserialize)]
struct FeatureRow {
    start: u64,
    end: u64,
    text: String,
    #[serde(default)]
    color: Option<String>,
}

/// Parse a tab-delimited feature file into ring segments.
///
/// Label segments receive a generated identifier so that individual labels
/// can be restyled later. Feature text is sanitized for SVG embedding unless
/// disabled.
pub fn parse_tsv_segments<P>(
    path: &P,
    as_labels: bool,
    sanitize: bool,
) -> Result<Vec<RingSegment>, Report>
where
    P: AsRef<Path> + Debug,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .from_path(path.as_ref())
        .wrap_err(format!("Failed to open annotation file: {path:?}"))?;

    let mut segments = Vec::new();
    for row in reader.deserialize() {
        let row: FeatureRow =
            row.wrap_err(format!("Failed to parse annotation row: {path:?}"))?;

        let text = match sanitize {
            true => sanitize_input(&row.text)?,
            false => row.text,
        };

        let mut segment = match as_labels {
            true => RingSegment::label(row.start, row.end, &text),
            false => RingSegment::new(row.start, row.end, &text),
        };
        segment.color = row.color;

        segments.push(segment);
    }

    Ok(segments)
}

/// Build an annotation ring from a custom feature file.
pub fn from_tsv<P>(path: &P, reference: &RingReference) -> Result<Ring, Report>
where
    P: AsRef<Path> + Debug,
{
    let data = parse_tsv_segments(path, false, true)?;
    Ok(Ring::new(RingType::Annotation, reference).with_data(data))
}

/// Build a label ring from a custom feature file.
pub fn label_from_tsv<P>(path: &P, reference: &RingReference) -> Result<Ring, Report>
where
    P: AsRef<Path> + Debug,
{
    let data = parse_tsv_segments(path, true, true)?;
    Ok(Ring::new(RingType::Label, reference).with_data(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FEATURES: &str = "\
start\tend\ttext\tcolor
0\t1200\tdnaA\t#9c913f
4500\t5900\tgyrB\t
320000\t320000\tprophage insertion\t#8f5715
";

    fn write_features() -> Result<tempfile::NamedTempFile, Report> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(FEATURES.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn annotation_segments_have_no_label_identifier() -> Result<(), Report> {
        let file = write_features()?;
        let segments = parse_tsv_segments(&file.path(), false, true)?;

        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| s.label_identifier.is_none()));
        assert_eq!(segments[0].color.as_deref(), Some("#9c913f"));
        Ok(())
    }

    #[test]
    fn label_segments_get_unique_identifiers() -> Result<(), Report> {
        let file = write_features()?;
        let segments = parse_tsv_segments(&file.path(), true, true)?;

        let identifiers: Vec<_> = segments
            .iter()
            .filter_map(|s| s.label_identifier.clone())
            .collect();
        assert_eq!(identifiers.len(), 3);
        assert_ne!(identifiers[0], identifiers[1]);
        Ok(())
    }

    #[test]
    fn label_ring_carries_reference_context() -> Result<(), Report> {
        let file = write_features()?;
        let reference = RingReference::new("session", "ref", "chr1", 4_000_000);
        let ring = label_from_tsv(&file.path(), &reference)?;

        assert_eq!(ring.ring_type, RingType::Label);
        assert_eq!(ring.reference, reference);
        Ok(())
    }
}
