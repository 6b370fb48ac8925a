//! Command-line interface of the main binary.

pub mod export;
pub mod ring;
pub mod session;
pub mod upload;

use crate::palette::PaletteCollection;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Report, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

// ----------------------------------------------------------------------------
// CLI Entry Point
// ----------------------------------------------------------------------------

/// The command-line interface (CLI).
///
/// Parses user input from the command-line in the main function:
///
/// ```no_run
/// use clap::Parser;
/// let args = brick::Cli::parse();
/// ```
#[derive(Debug, Parser)]
#[clap(name = "brick", author, version)]
#[clap(about = "brick builds BRIG-like comparative visualizations of bacterial genomes.")]
pub struct Cli {
    /// Pass CLI arguments to a particular [Command].
    #[clap(subcommand)]
    pub command: Command,

    /// Set the output verbosity level.
    #[clap(short = 'v', long)]
    #[clap(value_enum, default_value_t = Verbosity::default())]
    #[clap(global = true)]
    pub verbosity: Verbosity,
}

/// CLI commands. Used to decide which runtime operation the arguments are passed to.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a file to a session for validation and processing.
    #[clap(about = "Upload a session file for validation and processing.")]
    Upload(upload::Args),
    /// Build rings locally from comparison and annotation outputs.
    #[clap(about = "Build rings from local tool outputs.")]
    Ring(ring::Args),
    /// Inspect, fetch, and clean up sessions on the API.
    #[clap(about = "Manage visualization sessions on the API.")]
    Session(session::Args),
    /// List the built-in color palettes.
    #[clap(about = "List built-in color palettes.")]
    Palette(PaletteArgs),
    /// Export ring data and render layouts as JSON.
    #[clap(about = "Export ring data and render layouts as JSON.")]
    Export(export::Args),
}

// ----------------------------------------------------------------------------
// Palettes
// ----------------------------------------------------------------------------

/// List palette arguments.
#[derive(Debug, Parser)]
pub struct PaletteArgs {}

/// Print the palettes offered for ring coloring.
pub fn list_palettes(_args: &PaletteArgs) -> Result<(), Report> {
    let palettes = PaletteCollection::default();

    let mut builder = tabled::builder::Builder::default();
    builder.push_record(vec!["Name", "Colors"]);
    for palette in palettes.palettes() {
        builder.push_record(vec![palette.name.clone(), palette.colors.join(" ")]);
    }

    println!("{}", builder.build());
    Ok(())
}

// -----------------------------------------------------------------------------
// Verbosity
// -----------------------------------------------------------------------------

/// The output verbosity level.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ValueEnum)]
pub enum Verbosity {
    #[default]
    Info,
    Warn,
    Debug,
    Error,
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // Convert to lowercase for RUST_LOG env var compatibility
        let lowercase = format!("{:?}", self).to_lowercase();
        write!(f, "{lowercase}")
    }
}
