use brick::{cli, Cli};
use clap::Parser;
use color_eyre::eyre::{Report, Result};

#[tokio::main]
async fn main() -> Result<(), Report> {
    // ------------------------------------------------------------------------
    // CLI Setup

    // Parse CLI parameters
    let args = Cli::parse();

    // initialize color_eyre crate for colorized logs
    color_eyre::install()?;

    // Set logging/verbosity level via RUST_LOG
    std::env::set_var("RUST_LOG", args.verbosity.to_string());

    // initialize env_logger crate for logging/verbosity level
    env_logger::init();

    // check which CLI command we're running (upload, ring, session, ...)
    match args.command {
        // Upload a session file and await processing
        cli::Command::Upload(args) => cli::upload::upload(&args).await?,
        // Build rings from local tool outputs
        cli::Command::Ring(args) => cli::ring::build(&args)?,
        // Manage sessions on the API
        cli::Command::Session(args) => cli::session::run(&args).await?,
        // List built-in color palettes
        cli::Command::Palette(args) => cli::list_palettes(&args)?,
        // Export ring data and layouts
        cli::Command::Export(args) => cli::export::run(&args)?,
    }

    Ok(())
}
