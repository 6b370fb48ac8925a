//! Subcommands exporting ring data and render layouts.

use crate::export::{radial_layout, write_json, write_rings, LayoutOptions};
use crate::ring::RingCollection;
use crate::session::Session;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result};
use log::info;
use std::path::PathBuf;

/// Export arguments.
#[derive(Debug, Parser)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

/// Export subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(about = "Export the radial arc layout for a renderer.")]
    Layout(LayoutArgs),
    #[clap(about = "Export the ring array of a session.")]
    Rings(RingsArgs),
}

#[derive(Debug, Parser)]
pub struct LayoutArgs {
    /// Session JSON file to lay out.
    #[clap(short = 's', long, required = true)]
    pub session: PathBuf,

    /// Output JSON file.
    #[clap(short = 'o', long, required = true)]
    pub output: PathBuf,

    /// Base radius of the innermost ring in pixels.
    #[clap(short = 'r', long, default_value_t = 200.0)]
    pub radius: f64,

    /// Gap between rings in pixels.
    #[clap(short = 'g', long, default_value_t = 5.0)]
    pub gap: f64,
}

#[derive(Debug, Parser)]
pub struct RingsArgs {
    /// Session JSON file to export from.
    #[clap(short = 's', long, required = true)]
    pub session: PathBuf,

    /// Output JSON file.
    #[clap(short = 'o', long, required = true)]
    pub output: PathBuf,
}

/// Dispatch an export subcommand.
pub fn run(args: &Args) -> Result<(), Report> {
    match &args.command {
        Command::Layout(args) => {
            let session = Session::read(&args.session)?;
            let reference = session.rings.first().map(|ring| ring.reference.clone());

            let rings = RingCollection::from(session.rings);
            let view = rings.filtered(reference.as_ref());

            let options = LayoutOptions {
                radius: args.radius,
                gap: args.gap,
            };
            let arcs = radial_layout(&view, &options);
            info!("Laying out {} arcs from {} rings", arcs.len(), view.len());

            write_json(&arcs, &args.output)?;
            info!("Layout written: {:?}", args.output);
        }
        Command::Rings(args) => {
            let session = Session::read(&args.session)?;
            write_rings(&session, &args.output)?;
            info!("Rings written: {:?}", args.output);
        }
    }

    Ok(())
}
