//! `brick` builds BRIG-like comparative visualizations of bacterial genomes.
//!
//! A visualization is a stack of concentric data rings drawn against a
//! reference sequence: BLAST identity rings of related genomes, annotation
//! and free-text label rings, and geNomad plasmid/virus classification rings.
//!
//! The crate provides:
//!
//! 1. The [ring data model and ordered collection](ring) behind the plot,
//!    with the insertion, merge, and reordering rules of the interface.
//! 1. [Local ring builders](ring) for BLASTN tabular output, custom feature
//!    files, and geNomad aggregated classification output.
//! 1. An [asynchronous client](api) for the BRICK compute API, awaiting task
//!    results with bounded, jittered exponential backoff.
//! 1. [Session state](session), [palettes](palette), and [JSON
//!    exports](export) including the radial arc layout for renderers.

pub mod api;
pub mod cli;
pub mod export;
pub mod palette;
pub mod ring;
pub mod session;
pub mod utils;

#[doc(inline)]
pub use crate::api::ApiClient;
#[doc(inline)]
pub use crate::cli::Cli;
#[doc(inline)]
pub use crate::ring::{Ring, RingCollection};
#[doc(inline)]
pub use crate::session::Session;
