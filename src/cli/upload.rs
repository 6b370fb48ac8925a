//! Upload a session file and await its processing result.

use crate::api::{ApiClient, ApiSettings};
use crate::session::{inspect_fasta, FileConfig, FileFormat, FileType};

use clap::Parser;
use color_eyre::eyre::{eyre, ContextCompat, Report, Result};
use log::info;
use std::path::PathBuf;

/// Upload arguments.
#[derive(Debug, Parser)]
pub struct Args {
    /// Session identifier to register the file with.
    #[clap(short = 's', long, required = true)]
    pub session_id: String,

    /// File to upload.
    #[clap(short = 'f', long, required = true)]
    pub file: PathBuf,

    /// File format.
    #[clap(long, required = true)]
    pub format: FileFormat,

    /// Role of the file in the session.
    #[clap(short = 't', long = "type", required = true)]
    pub file_type: FileType,
}

/// Upload the file and print the processed session file record.
pub async fn upload(args: &Args) -> Result<(), Report> {
    // Sequence files are inspected locally so malformed uploads fail before
    // they reach the compute backend.
    if args.format == FileFormat::Fasta {
        let summary = inspect_fasta(&args.file, &args.file_type)?;
        info!(
            "Sequence file has {} records and {} bases",
            summary.records, summary.length
        );
    }

    let original_filename = args
        .file
        .file_name()
        .wrap_err(eyre!("Failed to extract file name: {:?}", args.file))?
        .to_string_lossy()
        .to_string();

    let config = FileConfig {
        session_id: args.session_id.clone(),
        file_format: args.format,
        file_type: args.file_type,
        original_filename,
    };

    info!("Uploading file: {:?}", args.file);
    let client = ApiClient::new(ApiSettings::from_env());
    let file = client.upload_file(&args.file, &config).await?;

    let mut builder = tabled::builder::Builder::default();
    builder.push_record(vec!["Session", "File", "Name", "Type", "Format", "Records", "Length"]);
    builder.push_record(vec![
        file.session_id,
        file.id,
        file.name_original,
        file.file_type.to_string(),
        file.format.to_string(),
        file.records.to_string(),
        file.length.to_string(),
    ]);
    println!("{}", builder.build());

    Ok(())
}
