//! Subcommands building rings from local tool outputs.

use crate::ring::blast::BlastFilter;
use crate::ring::genomad::{PredictionClass, SegmentOptions};
use crate::ring::{annotation, blast, genomad, Ring, RingCollection, RingReference};
use crate::session::Session;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Report, Result};
use color_eyre::Help;
use log::info;
use std::path::PathBuf;

/// Ring building arguments.
#[derive(Debug, Parser)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

/// Ring building subcommands, one per supported tool output.
#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(about = "BLAST identity ring from BLASTN tabular output (-outfmt 6).")]
    Blast(BlastArgs),
    #[clap(about = "Annotation ring from a custom feature file (TSV).")]
    Annotation(AnnotationArgs),
    #[clap(about = "Label ring from a custom feature file (TSV).")]
    Label(LabelArgs),
    #[clap(about = "geNomad ring from aggregated classification output.")]
    Genomad(GenomadArgs),
}

/// Arguments shared by every ring builder.
#[derive(Debug, Parser)]
pub struct SharedArgs {
    /// Session JSON file to add the ring to.
    ///
    /// Created with a reference ring when it does not exist yet.
    #[clap(short = 's', long, required = true)]
    pub session: PathBuf,

    /// Ring title shown in the legend.
    #[clap(short = 't', long)]
    pub title: Option<String>,

    /// Ring color as a hex value.
    #[clap(short = 'c', long)]
    pub color: Option<String>,

    /// Reference sequence identifier, required for a new session file.
    #[clap(long)]
    pub sequence_id: Option<String>,

    /// Reference sequence length, required for a new session file.
    #[clap(long)]
    pub sequence_length: Option<u64>,
}

#[derive(Debug, Parser)]
pub struct BlastArgs {
    #[clap(flatten)]
    pub shared: SharedArgs,

    /// BLASTN comparison output (-outfmt 6).
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    /// Minimum percent nucleotide identity.
    #[clap(long, default_value_t = 70.0)]
    pub min_identity: f64,

    /// Minimum alignment length in bases.
    #[clap(long, default_value_t = 100)]
    pub min_alignment: u64,

    /// Maximum e-value.
    #[clap(long)]
    pub max_evalue: Option<f64>,
}

#[derive(Debug, Parser)]
pub struct AnnotationArgs {
    #[clap(flatten)]
    pub shared: SharedArgs,

    /// Feature file with start, end, text and optional color columns.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,
}

#[derive(Debug, Parser)]
pub struct LabelArgs {
    #[clap(flatten)]
    pub shared: SharedArgs,

    /// Feature file with start, end, text and optional color columns.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,
}

/// How geNomad windows are turned into a ring.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum GenomadMode {
    /// One score segment per classified window.
    #[default]
    Windows,
    /// Contiguous high-scoring regions as an annotation ring.
    Segments,
    /// Contiguous high-scoring regions as a label ring.
    Labels,
}

#[derive(Debug, Parser)]
pub struct GenomadArgs {
    #[clap(flatten)]
    pub shared: SharedArgs,

    /// Aggregated classification output of the sliced genome.
    #[clap(short = 'i', long, required = true)]
    pub input: PathBuf,

    #[clap(long, value_enum, default_value_t = GenomadMode::default())]
    pub mode: GenomadMode,

    /// Minimum window score to include or join a segment.
    #[clap(long, default_value_t = 0.5)]
    pub min_window_score: f64,

    /// Minimum mean score over a contiguous segment.
    #[clap(long, default_value_t = 0.7)]
    pub min_segment_score: f64,

    /// Minimum contiguous segment length in bases.
    #[clap(long, default_value_t = 10000)]
    pub min_segment_length: u64,

    /// Prediction classes to include.
    #[clap(long, value_delimiter = ',', default_values_t = vec![PredictionClass::Virus, PredictionClass::Plasmid])]
    pub prediction_classes: Vec<PredictionClass>,
}

/// Build the requested ring and add it to the session file.
pub fn build(args: &Args) -> Result<(), Report> {
    match &args.command {
        Command::Blast(args) => {
            let filter = BlastFilter {
                min_identity: args.min_identity,
                min_alignment: args.min_alignment,
                max_evalue: args.max_evalue,
            };
            add_ring(&args.shared, |reference| {
                blast::from_output(&args.input, reference, &filter)
            })
        }
        Command::Annotation(args) => add_ring(&args.shared, |reference| {
            annotation::from_tsv(&args.input, reference)
        }),
        Command::Label(args) => add_ring(&args.shared, |reference| {
            annotation::label_from_tsv(&args.input, reference)
        }),
        Command::Genomad(args) => {
            let options = SegmentOptions {
                min_window_score: args.min_window_score,
                min_segment_score: args.min_segment_score,
                min_segment_length: args.min_segment_length,
                prediction_classes: args.prediction_classes.clone(),
            };
            add_ring(&args.shared, |reference| match args.mode {
                GenomadMode::Windows => genomad::from_output(
                    &args.input,
                    reference,
                    &options.prediction_classes,
                    options.min_window_score,
                ),
                GenomadMode::Segments => {
                    genomad::annotation_from_output(&args.input, reference, &options)
                }
                GenomadMode::Labels => {
                    genomad::label_from_output(&args.input, reference, &options)
                }
            })
        }
    }
}

/// Load or create the session, build the ring against its reference, insert
/// it with the collection ordering rules, and write the session back.
fn add_ring<F>(shared: &SharedArgs, builder: F) -> Result<(), Report>
where
    F: FnOnce(&RingReference) -> Result<Ring, Report>,
{
    let mut session = match shared.session.exists() {
        true => Session::read(&shared.session)?,
        false => {
            info!("Creating session file: {:?}", shared.session);
            Session::new(&crate::utils::create_uuid(false))
        }
    };

    let reference = resolve_reference(&session, shared)?;
    let mut rings = RingCollection::from(std::mem::take(&mut session.rings));

    if rings.is_empty() {
        info!("Adding reference ring: {}", reference.sequence.id);
        rings.insert(Ring::from_reference(&reference));
    }

    let mut ring = builder(&reference)?;
    if let Some(title) = &shared.title {
        ring = ring.with_title(title);
    }
    if let Some(color) = &shared.color {
        ring = ring.with_color(color);
    }

    info!("Adding {} ring with {} segments", ring.ring_type, ring.data.len());
    rings.insert(ring);

    session.rings = rings.into_rings();
    session.write(&shared.session)?;
    info!("Session written: {:?}", shared.session);

    Ok(())
}

/// Reference context for the new ring, from the session or the CLI arguments.
fn resolve_reference(session: &Session, shared: &SharedArgs) -> Result<RingReference, Report> {
    if let Some(ring) = session.rings.first() {
        return Ok(ring.reference.clone());
    }
    match (&shared.sequence_id, &shared.sequence_length) {
        (Some(id), Some(length)) => Ok(RingReference::new(&session.id, id, id, *length)),
        _ => Err(eyre!("Session has no rings to derive a reference from"))
            .suggestion("Provide --sequence-id and --sequence-length for a new session file"),
    }
}
