//! BLAST comparison rings from BLASTN tabular output (`-outfmt 6`).

use crate::ring::{Ring, RingReference, RingSegment, RingType};

use color_eyre::eyre::{Report, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;

// ----------------------------------------------------------------------------
// BLASTN Entries
// ----------------------------------------------------------------------------

/// One alignment row of BLASTN tabular output, in column order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BlastnEntry {
    pub query_id: String,
    pub subject_id: String,
    pub perc_identity: f64,
    pub alignment_length: u64,
    pub mismatches: u64,
    pub gap_opens: u64,
    pub query_start: u64,
    pub query_end: u64,
    pub subject_start: u64,
    pub subject_end: u64,
    pub e_value: f64,
    pub bit_score: f64,
}

impl BlastnEntry {
    /// Convert to a ring segment on the subject (reference) coordinates.
    ///
    /// Subject coordinates are reported in alignment orientation and may run
    /// backwards for reverse-strand hits; segments are always forward.
    pub fn to_segment(&self) -> RingSegment {
        let (start, end) = match self.subject_start <= self.subject_end {
            true => (self.subject_start, self.subject_end),
            false => (self.subject_end, self.subject_start),
        };
        RingSegment::new(
            start,
            end,
            &format!("{:.2}% nucleotide identity", self.perc_identity),
        )
    }
}

/// Filters applied to BLASTN alignments before they become segments.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BlastFilter {
    /// Minimum percent nucleotide identity.
    pub min_identity: f64,
    /// Minimum alignment length in bases.
    pub min_alignment: u64,
    /// Optional maximum e-value.
    pub max_evalue: Option<f64>,
}

impl Default for BlastFilter {
    fn default() -> Self {
        BlastFilter {
            min_identity: 0.0,
            min_alignment: 0,
            max_evalue: None,
        }
    }
}

// ----------------------------------------------------------------------------
// Parsing
// ----------------------------------------------------------------------------

/// Parse a BLASTN `-outfmt 6` file into filtered entries.
///
/// When a reference is given, alignments against other subject sequences are
/// dropped so that multi-sequence databases only contribute hits on the
/// plotted sequence.
pub fn parse_blastn_output<P>(
    path: &P,
    reference: Option<&RingReference>,
    filter: &BlastFilter,
) -> Result<Vec<BlastnEntry>, Report>
where
    P: AsRef<Path> + Debug,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_path(path.as_ref())
        .wrap_err(format!("Failed to open BLAST output: {path:?}"))?;

    let mut entries = Vec::new();
    for row in reader.deserialize() {
        let entry: BlastnEntry =
            row.wrap_err(format!("Failed to parse BLAST output row: {path:?}"))?;

        if entry.perc_identity < filter.min_identity {
            continue;
        }
        if entry.alignment_length < filter.min_alignment {
            continue;
        }
        if let Some(max_evalue) = filter.max_evalue {
            if entry.e_value > max_evalue {
                continue;
            }
        }
        if let Some(reference) = reference {
            if entry.subject_id != reference.sequence.id {
                continue;
            }
        }

        entries.push(entry);
    }

    Ok(entries)
}

/// Build a BLAST ring from a BLASTN tabular output file.
pub fn from_output<P>(
    path: &P,
    reference: &RingReference,
    filter: &BlastFilter,
) -> Result<Ring, Report>
where
    P: AsRef<Path> + Debug,
{
    let data = parse_blastn_output(path, Some(reference), filter)?
        .iter()
        .map(BlastnEntry::to_segment)
        .collect();

    Ok(Ring::new(RingType::Blast, reference).with_data(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const OUTPUT: &str = "\
genome_a\tchr1\t99.98\t40210\t6\t2\t1\t40210\t1\t40207\t0.0\t74180
genome_a\tchr1\t85.20\t80\t10\t2\t500\t580\t90400\t90321\t1e-20\t95
genome_a\tchr2\t99.10\t5000\t40\t5\t100\t5100\t200\t5200\t0.0\t9000
";

    fn write_output() -> Result<tempfile::NamedTempFile, Report> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(OUTPUT.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn parse_all_rows_without_filters() -> Result<(), Report> {
        let file = write_output()?;
        let entries = parse_blastn_output(&file.path(), None, &BlastFilter::default())?;
        assert_eq!(entries.len(), 3);
        Ok(())
    }

    #[test]
    fn filter_on_identity_and_alignment_length() -> Result<(), Report> {
        let file = write_output()?;
        let filter = BlastFilter {
            min_identity: 90.0,
            min_alignment: 10000,
            max_evalue: None,
        };
        let entries = parse_blastn_output(&file.path(), None, &filter)?;
        assert_eq!(entries.len(), 2);
        Ok(())
    }

    #[test]
    fn restrict_to_reference_sequence() -> Result<(), Report> {
        let file = write_output()?;
        let reference = RingReference::new("session", "ref", "chr1", 4_000_000);
        let entries = parse_blastn_output(&file.path(), Some(&reference), &BlastFilter::default())?;
        assert!(entries.iter().all(|entry| entry.subject_id == "chr1"));
        assert_eq!(entries.len(), 2);
        Ok(())
    }

    #[test]
    fn reverse_strand_hit_becomes_forward_segment() -> Result<(), Report> {
        let file = write_output()?;
        let reference = RingReference::new("session", "ref", "chr1", 4_000_000);
        let ring = from_output(&file.path(), &reference, &BlastFilter::default())?;

        assert_eq!(ring.ring_type, RingType::Blast);
        let reverse = &ring.data[1];
        assert!(reverse.start < reverse.end);
        assert_eq!((reverse.start, reverse.end), (90321, 90400));
        Ok(())
    }
}
