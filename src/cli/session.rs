//! Subcommands managing sessions on the BRICK API.

use crate::api::{ApiClient, ApiSettings};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result};
use log::{info, warn};
use std::path::PathBuf;

/// Session management arguments.
#[derive(Debug, Parser)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

/// Session management subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    #[clap(about = "Fetch a session with its files and rings.")]
    Get(GetArgs),
    #[clap(about = "List known session identifiers.")]
    List(ListArgs),
    #[clap(about = "Delete a session.")]
    Delete(DeleteArgs),
    #[clap(about = "Delete sessions older than the expiry window.")]
    Clean(CleanArgs),
}

#[derive(Debug, Parser)]
pub struct GetArgs {
    /// Session identifier.
    #[clap(short = 's', long, required = true)]
    pub session_id: String,

    /// Write the session JSON to this file instead of stdout.
    #[clap(short = 'o', long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct ListArgs {}

#[derive(Debug, Parser)]
pub struct DeleteArgs {
    /// Session identifier.
    #[clap(short = 's', long, required = true)]
    pub session_id: String,

    /// Keep the session working data on disk.
    #[clap(long)]
    pub keep_data: bool,
}

#[derive(Debug, Parser)]
pub struct CleanArgs {
    /// Delete sessions older than this many days.
    #[clap(short = 'e', long, default_value_t = 7)]
    pub expire_days: i64,
}

/// Dispatch a session subcommand against the configured API.
pub async fn run(args: &Args) -> Result<(), Report> {
    let client = ApiClient::new(ApiSettings::from_env());

    match &args.command {
        Command::Get(args) => {
            let session = client.get_session(&args.session_id).await?;
            match &args.output {
                Some(path) => {
                    session.write(path)?;
                    info!("Session written: {path:?}");
                }
                None => println!("{}", serde_json::to_string_pretty(&session)?),
            }
        }
        Command::List(_) => {
            let ids = client.session_ids().await?;
            info!("Obtained {} session identifiers from API", ids.len());

            let mut builder = tabled::builder::Builder::default();
            builder.push_record(vec!["Session"]);
            for id in ids {
                builder.push_record(vec![id]);
            }
            println!("{}", builder.build());
        }
        Command::Delete(args) => {
            client
                .delete_session(&args.session_id, !args.keep_data)
                .await?;
            info!("Session deleted: {}", args.session_id);
        }
        Command::Clean(args) => {
            for id in client.session_ids().await? {
                let session = match client.get_session(&id).await {
                    Ok(session) => session,
                    Err(error) => {
                        warn!("Failed to fetch session {id}: {error}");
                        continue;
                    }
                };
                if session.is_expired(args.expire_days) {
                    info!("Session {id} is expired and will be deleted");
                    client.delete_session(&id, true).await?;
                } else {
                    info!("Session {id} has not yet expired");
                }
            }
        }
    }

    Ok(())
}
