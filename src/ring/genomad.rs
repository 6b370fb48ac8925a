//! geNomad classification rings from aggregated window scores.
//!
//! geNomad is run by the compute backend on a sliced genome, so every row of
//! the aggregated classification output carries its window coordinates in the
//! sequence name (`{id}__{start}..{end}`). Windows become score segments for
//! the dedicated geNomad ring, or are collapsed into contiguous high-scoring
//! regions for annotation and label rings.

use crate::ring::{Ring, RingReference, RingSegment, RingType};

use color_eyre::eyre::{eyre, ContextCompat, Report, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;
use strum::EnumIter;

// ----------------------------------------------------------------------------
// Prediction Classes
// ----------------------------------------------------------------------------

/// geNomad prediction classes.
#[derive(Clone, Copy, Debug, Deserialize, EnumIter, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionClass {
    Chromosome,
    Plasmid,
    Virus,
}

impl Display for PredictionClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let class = match self {
            PredictionClass::Chromosome => "chromosome",
            PredictionClass::Plasmid => "plasmid",
            PredictionClass::Virus => "virus",
        };
        write!(f, "{class}")
    }
}

impl std::str::FromStr for PredictionClass {
    type Err = Report;

    fn from_str(class: &str) -> Result<Self, Report> {
        let class = match class {
            "chromosome" => PredictionClass::Chromosome,
            "plasmid" => PredictionClass::Plasmid,
            "virus" => PredictionClass::Virus,
            _ => Err(eyre!("Unknown prediction class: {class}"))?,
        };
        Ok(class)
    }
}

impl PredictionClass {
    /// Label shown on extracted segments; viral windows read as prophage.
    pub fn segment_label(&self) -> &'static str {
        match self {
            PredictionClass::Chromosome => "Chromosome",
            PredictionClass::Plasmid => "Plasmid",
            PredictionClass::Virus => "Phage",
        }
    }
}

// ----------------------------------------------------------------------------
// Aggregated Output
// ----------------------------------------------------------------------------

/// Row shape of the aggregated classification file.
#[derive(Debug, Deserialize)]
struct GenomadRow {
    seq_name: String,
    chromosome_score: f64,
    plasmid_score: f64,
    virus_score: f64,
}

/// One classified window of the sliced genome.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenomadEntry {
    pub seq_id: String,
    pub start: u64,
    pub end: u64,
    pub chromosome_score: f64,
    pub plasmid_score: f64,
    pub virus_score: f64,
}

impl GenomadEntry {
    fn score(&self, class: PredictionClass) -> f64 {
        match class {
            PredictionClass::Chromosome => self.chromosome_score,
            PredictionClass::Plasmid => self.plasmid_score,
            PredictionClass::Virus => self.virus_score,
        }
    }

    /// Convert to a score segment, keeping only requested classes at or above
    /// the window score threshold; other scores are zeroed.
    pub fn to_segment(&self, classes: &[PredictionClass], min_window_score: f64) -> RingSegment {
        let mut text = Vec::new();
        let mut scores = [0.0; 3];

        for (slot, class) in [
            PredictionClass::Chromosome,
            PredictionClass::Plasmid,
            PredictionClass::Virus,
        ]
        .iter()
        .enumerate()
        {
            let score = self.score(*class);
            if score >= min_window_score && classes.contains(class) {
                scores[slot] = score;
                text.push(format!("{} ({score:.2})", class.segment_label()));
            }
        }

        RingSegment::genomad(
            self.start,
            self.end,
            &text.join(" "),
            scores[1],
            scores[2],
            scores[0],
        )
    }
}

/// Split a sliced sequence name into its identifier and window coordinates.
///
/// ## Examples
///
/// ```rust
/// use brick::ring::genomad::parse_sliced_name;
///
/// let (id, start, end) = parse_sliced_name("chr1__30000..40000")?;
/// assert_eq!((id.as_str(), start, end), ("chr1", 30000, 40000));
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn parse_sliced_name(seq_name: &str) -> Result<(String, u64, u64), Report> {
    let (seq_id, range) = seq_name.split_once("__").wrap_err(format!(
        "Failed to extract window range from sequence name: {seq_name:?}. Was the input sliced?"
    ))?;
    let (start, end) = range.split_once("..").wrap_err(format!(
        "Failed to extract window start and end from sequence name: {seq_name:?}"
    ))?;

    let start = start
        .parse()
        .wrap_err(format!("Window start is not an integer: {start:?}"))?;
    let end = end
        .parse()
        .wrap_err(format!("Window end is not an integer: {end:?}"))?;

    Ok((seq_id.to_string(), start, end))
}

/// Parse the aggregated classification output of a sliced genome.
pub fn parse_genomad_output<P>(path: &P) -> Result<Vec<GenomadEntry>, Report>
where
    P: AsRef<Path> + Debug,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b'\t')
        .from_path(path.as_ref())
        .wrap_err(format!("Failed to open geNomad output: {path:?}"))?;

    let mut entries = Vec::new();
    for row in reader.deserialize() {
        let row: GenomadRow = row.wrap_err(format!("Failed to parse geNomad row: {path:?}"))?;
        let (seq_id, start, end) = parse_sliced_name(&row.seq_name)?;
        entries.push(GenomadEntry {
            seq_id,
            start,
            end,
            chromosome_score: row.chromosome_score,
            plasmid_score: row.plasmid_score,
            virus_score: row.virus_score,
        });
    }

    Ok(entries)
}

// ----------------------------------------------------------------------------
// Contiguous Segments
// ----------------------------------------------------------------------------

/// Thresholds for collapsing windows into contiguous prediction segments.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SegmentOptions {
    /// Minimum window score to join a contiguous segment.
    pub min_window_score: f64,
    /// Minimum mean score over the whole segment.
    pub min_segment_score: f64,
    /// Minimum segment length in bases; a multiple of the window size.
    pub min_segment_length: u64,
    /// Prediction classes to extract segments for.
    pub prediction_classes: Vec<PredictionClass>,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        SegmentOptions {
            min_window_score: 0.5,
            min_segment_score: 0.7,
            min_segment_length: 10000,
            prediction_classes: vec![PredictionClass::Virus, PredictionClass::Plasmid],
        }
    }
}

/// Collapse consecutive high-scoring windows into prediction segments.
///
/// Runs once per requested prediction class; a segment closes when a window
/// drops below the window score threshold, and survives if it is long enough
/// and its mean score passes the segment threshold. Segments are returned
/// ordered by start coordinate.
pub fn extract_contiguous_segments(
    entries: &[GenomadEntry],
    options: &SegmentOptions,
    as_labels: bool,
) -> Result<Vec<RingSegment>, Report> {
    if options.min_window_score > 1.0 || options.min_segment_score > 1.0 {
        return Err(eyre!("geNomad scores are probabilities, thresholds above 1.0 match nothing"));
    }

    let mut segments = Vec::new();

    for class in &options.prediction_classes {
        let mut current: Option<(u64, u64)> = None;
        let mut scores: Vec<f64> = Vec::new();

        // trailing sentinel score closes any open segment at the end
        let windows = entries
            .iter()
            .map(|entry| (entry.start, entry.end, entry.score(*class)))
            .chain(std::iter::once((0, 0, f64::MIN)));

        for (start, end, score) in windows {
            if score >= options.min_window_score {
                match current.as_mut() {
                    Some((_, current_end)) => {
                        *current_end = end;
                        scores.push(score);
                    }
                    None => {
                        current = Some((start, end));
                        scores = vec![score];
                    }
                }
                continue;
            }

            if let Some((segment_start, segment_end)) = current.take() {
                let mean = scores.iter().sum::<f64>() / scores.len() as f64;
                if segment_end - segment_start >= options.min_segment_length
                    && mean >= options.min_segment_score
                {
                    let text = format!("{} ({mean:.2})", class.segment_label());
                    let segment = match as_labels {
                        true => RingSegment::label(segment_start, segment_end, &text),
                        false => RingSegment::new(segment_start, segment_end, &text),
                    };
                    segments.push(segment);
                }
            }
        }
    }

    segments.sort_by_key(|segment| segment.start);
    Ok(segments)
}

// ----------------------------------------------------------------------------
// Ring Builders
// ----------------------------------------------------------------------------

/// Build a geNomad score ring with one segment per classified window.
pub fn from_output<P>(
    path: &P,
    reference: &RingReference,
    classes: &[PredictionClass],
    min_window_score: f64,
) -> Result<Ring, Report>
where
    P: AsRef<Path> + Debug,
{
    let data = parse_genomad_output(path)?
        .iter()
        .map(|entry| entry.to_segment(classes, min_window_score))
        .collect();

    Ok(Ring::new(RingType::Genomad, reference).with_data(data))
}

/// Build an annotation ring from contiguous high-scoring prediction segments.
pub fn annotation_from_output<P>(
    path: &P,
    reference: &RingReference,
    options: &SegmentOptions,
) -> Result<Ring, Report>
where
    P: AsRef<Path> + Debug,
{
    let entries = parse_genomad_output(path)?;
    let data = extract_contiguous_segments(&entries, options, false)?;
    Ok(Ring::new(RingType::Annotation, reference).with_data(data))
}

/// Build a label ring from contiguous high-scoring prediction segments.
pub fn label_from_output<P>(
    path: &P,
    reference: &RingReference,
    options: &SegmentOptions,
) -> Result<Ring, Report>
where
    P: AsRef<Path> + Debug,
{
    let entries = parse_genomad_output(path)?;
    let data = extract_contiguous_segments(&entries, options, true)?;
    Ok(Ring::new(RingType::Label, reference).with_data(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn entry(start: u64, end: u64, chromosome: f64, plasmid: f64, virus: f64) -> GenomadEntry {
        GenomadEntry {
            seq_id: "chr1".to_string(),
            start,
            end,
            chromosome_score: chromosome,
            plasmid_score: plasmid,
            virus_score: virus,
        }
    }

    #[test]
    fn window_segment_zeroes_excluded_classes() {
        let entry = entry(0, 10000, 0.9, 0.8, 0.1);
        let segment = entry.to_segment(&[PredictionClass::Plasmid], 0.5);

        assert_eq!(segment.plasmid, Some(0.8));
        assert_eq!(segment.chromosome, Some(0.0));
        assert_eq!(segment.virus, Some(0.0));
        assert_eq!(segment.text, "Plasmid (0.80)");
    }

    #[test]
    fn contiguous_segment_closes_on_low_window() -> Result<(), Report> {
        let entries = vec![
            entry(0, 10000, 0.0, 0.0, 0.9),
            entry(10000, 20000, 0.0, 0.0, 0.8),
            entry(20000, 30000, 0.0, 0.0, 0.1),
            entry(30000, 40000, 0.0, 0.0, 0.95),
        ];
        let options = SegmentOptions {
            min_window_score: 0.5,
            min_segment_score: 0.7,
            min_segment_length: 10000,
            prediction_classes: vec![PredictionClass::Virus],
        };

        let segments = extract_contiguous_segments(&entries, &options, false)?;
        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].start, segments[0].end), (0, 20000));
        assert_eq!(segments[0].text, "Phage (0.85)");
        assert_eq!((segments[1].start, segments[1].end), (30000, 40000));
        Ok(())
    }

    #[test]
    fn short_or_weak_segments_are_dropped() -> Result<(), Report> {
        let entries = vec![
            // long enough but weak mean
            entry(0, 10000, 0.0, 0.55, 0.0),
            entry(10000, 20000, 0.0, 0.6, 0.0),
            // strong but a single short window
            entry(40000, 45000, 0.0, 0.99, 0.0),
        ];
        let options = SegmentOptions {
            min_window_score: 0.5,
            min_segment_score: 0.7,
            min_segment_length: 10000,
            prediction_classes: vec![PredictionClass::Plasmid],
        };

        let segments = extract_contiguous_segments(&entries, &options, false)?;
        assert!(segments.is_empty());
        Ok(())
    }

    #[test]
    fn segments_from_multiple_classes_are_ordered_by_start() -> Result<(), Report> {
        let entries = vec![
            entry(0, 20000, 0.0, 0.9, 0.0),
            entry(50000, 70000, 0.0, 0.0, 0.9),
        ];
        let options = SegmentOptions {
            prediction_classes: vec![PredictionClass::Virus, PredictionClass::Plasmid],
            ..Default::default()
        };

        let segments = extract_contiguous_segments(&entries, &options, true)?;
        assert_eq!(segments.len(), 2);
        assert!(segments[0].start < segments[1].start);
        assert!(segments.iter().all(|s| s.label_identifier.is_some()));
        Ok(())
    }

    #[test]
    fn parse_aggregated_output_file() -> Result<(), Report> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(
            "seq_name\tchromosome_score\tplasmid_score\tvirus_score\n\
             chr1__0..10000\t0.91\t0.05\t0.04\n\
             chr1__10000..20000\t0.11\t0.85\t0.04\n"
                .as_bytes(),
        )?;

        let entries = parse_genomad_output(&file.path())?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].seq_id, "chr1");
        assert_eq!((entries[1].start, entries[1].end), (10000, 20000));
        assert_eq!(entries[1].plasmid_score, 0.85);
        Ok(())
    }

    #[test]
    fn malformed_sliced_name_is_an_error() {
        assert!(parse_sliced_name("chr1").is_err());
        assert!(parse_sliced_name("chr1__10..x").is_err());
    }
}
