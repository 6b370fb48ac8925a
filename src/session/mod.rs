//! Session state shared with the BRICK API: uploaded files and computed rings.

use crate::ring::Ring;

use chrono::{DateTime, Duration, Utc};
use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use log::warn;
use noodles::fasta;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use std::str::FromStr;
use strum::EnumIter;

// ----------------------------------------------------------------------------
// File Attributes
// ----------------------------------------------------------------------------

/// Upload file formats accepted by the API.
#[derive(Clone, Copy, Debug, Deserialize, EnumIter, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Fasta,
    Genbank,
    Tsv,
}

impl Display for FileFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let format = match self {
            FileFormat::Fasta => "fasta",
            FileFormat::Genbank => "genbank",
            FileFormat::Tsv => "tsv",
        };
        write!(f, "{format}")
    }
}

impl FromStr for FileFormat {
    type Err = Report;

    fn from_str(format: &str) -> Result<Self, Report> {
        let format = match format {
            "fasta" => FileFormat::Fasta,
            "genbank" => FileFormat::Genbank,
            "tsv" => FileFormat::Tsv,
            _ => Err(eyre!("Unknown file format: {format}"))?,
        };
        Ok(format)
    }
}

/// The role an uploaded file plays in the session.
#[derive(Clone, Copy, Debug, Deserialize, EnumIter, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Reference,
    Genome,
    AnnotationGenbank,
    AnnotationCustom,
}

impl Display for FileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let file_type = match self {
            FileType::Reference => "reference",
            FileType::Genome => "genome",
            FileType::AnnotationGenbank => "annotation_genbank",
            FileType::AnnotationCustom => "annotation_custom",
        };
        write!(f, "{file_type}")
    }
}

impl FromStr for FileType {
    type Err = Report;

    fn from_str(file_type: &str) -> Result<Self, Report> {
        let file_type = match file_type {
            "reference" => FileType::Reference,
            "genome" => FileType::Genome,
            "annotation_genbank" => FileType::AnnotationGenbank,
            "annotation_custom" => FileType::AnnotationCustom,
            _ => Err(eyre!("Unknown file type: {file_type}"))?,
        };
        Ok(file_type)
    }
}

/// Upload configuration submitted alongside the file content.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FileConfig {
    pub session_id: String,
    pub file_format: FileFormat,
    pub file_type: FileType,
    pub original_filename: String,
}

/// A processed file registered with a session.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SessionFile {
    pub session_id: String,
    pub id: String,
    pub name: String,
    pub name_original: String,
    #[serde(rename = "type")]
    pub file_type: FileType,
    pub format: FileFormat,
    pub records: u64,
    pub length: u64,
}

// ----------------------------------------------------------------------------
// Session
// ----------------------------------------------------------------------------

/// A visualization session: its uploaded files and computed rings.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Session {
    pub id: String,
    /// CLI semantic version that wrote this session.
    #[serde(default = "default_version")]
    pub version: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub files: Vec<SessionFile>,
    #[serde(default)]
    pub rings: Vec<Ring>,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Session {
    /// Returns a new empty session with the current version and timestamp.
    pub fn new(id: &str) -> Self {
        Session {
            id: id.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            date: Utc::now(),
            files: Vec::new(),
            rings: Vec::new(),
        }
    }

    /// Read a [`Session`] from a JSON file.
    ///
    /// Version incompatibility is logged but not fatal, stale sessions should
    /// still open for inspection and export.
    pub fn read<P>(path: &P) -> Result<Session, Report>
    where
        P: AsRef<Path> + Debug,
    {
        let file =
            File::open(path.as_ref()).wrap_err(eyre!("Failed to open session file: {path:?}"))?;
        let reader = BufReader::new(file);
        let session: Session = serde_json::from_reader(reader)
            .wrap_err(eyre!("Failed to deserialize session file: {path:?}"))?;

        if !session.is_compatible()? {
            warn!(
                "Session {} was written by version {} which is newer than this CLI",
                session.id, session.version
            );
        }

        Ok(session)
    }

    /// Write the [`Session`] to a JSON file, pretty-printed.
    pub fn write<P>(&self, path: &P) -> Result<(), Report>
    where
        P: AsRef<Path> + Debug,
    {
        let mut file = File::create(path.as_ref())
            .wrap_err(eyre!("Failed to create session file: {path:?}"))?;
        let output = serde_json::to_string_pretty(self)
            .wrap_err(eyre!("Failed to serialize session: {}", self.id))?;
        file.write_all(format!("{}\n", output).as_bytes())
            .wrap_err(eyre!("Failed to write session file: {path:?}"))?;
        Ok(())
    }

    /// Returns false when the session was written by a newer CLI version.
    pub fn is_compatible(&self) -> Result<bool, Report> {
        let current = Version::parse(env!("CARGO_PKG_VERSION"))?;
        let written = Version::parse(&self.version)
            .wrap_err(eyre!("Session version is not semantic: {}", self.version))?;
        Ok(written <= current)
    }

    /// Returns true when the session is older than the expiry window.
    pub fn is_expired(&self, expire_days: i64) -> bool {
        self.date < Utc::now() - Duration::days(expire_days)
    }
}

// ----------------------------------------------------------------------------
// Upload Preflight
// ----------------------------------------------------------------------------

/// Record and base counts of a sequence file.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct FastaSummary {
    pub records: u64,
    pub length: u64,
}

/// Inspect a FASTA file before upload.
///
/// Counts records and total bases, and rejects multi-contig files submitted
/// as reference genomes, so that malformed uploads fail locally instead of
/// inside the compute backend.
pub fn inspect_fasta<P>(path: &P, file_type: &FileType) -> Result<FastaSummary, Report>
where
    P: AsRef<Path> + Debug,
{
    let mut reader = File::open(path.as_ref())
        .map(BufReader::new)
        .map(fasta::Reader::new)
        .wrap_err(eyre!("Failed to open sequence file: {path:?}"))?;

    let mut summary = FastaSummary::default();
    for record in reader.records() {
        let record = record.wrap_err(eyre!("Failed to parse sequence file: {path:?}"))?;
        summary.records += 1;
        summary.length += record.sequence().len() as u64;
    }

    if summary.records == 0 {
        return Err(eyre!("No sequence records found: {path:?}"));
    }
    if *file_type == FileType::Reference && summary.records > 1 {
        return Err(eyre!(
            "Reference genome files must have a single contig, found {} records: {path:?}",
            summary.records
        ));
    }

    Ok(summary)
}
