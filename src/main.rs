//! drive_list CLI - Print the first page of files in a Google Drive account.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use drive_list::config::DRIVE_METADATA_READONLY_SCOPE;
use drive_list::{
    load_config, write_listing, ConsolePrompt, DriveClient, ListRequest, TokenCache, TokenManager,
};

/// CLI tool for listing files in Google Drive.
#[derive(Parser)]
#[command(name = "drive_list")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the OAuth2 client secret JSON file.
    #[arg(
        long,
        env = "DRIVE_CREDENTIALS",
        default_value = "./credentials/credentials.json"
    )]
    credentials: PathBuf,

    /// Path of the cached token file.
    #[arg(long, env = "DRIVE_TOKEN_FILE", default_value = "token.json")]
    token_file: PathBuf,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,{}=info", env!("CARGO_CRATE_NAME"))));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = load_config(&cli.credentials, &[DRIVE_METADATA_READONLY_SCOPE])
        .with_context(|| format!("Failed to load credentials from {:?}", cli.credentials))?;

    let manager = TokenManager::new(TokenCache::new(cli.token_file));
    let auth = manager
        .get_authorized_client(&config, &mut ConsolePrompt::stdio())
        .await
        .context("Failed to authorize")?;

    let client = DriveClient::new(auth).context("Unable to retrieve Drive client")?;

    let response = client
        .list_files(&ListRequest::default())
        .await
        .context("Unable to retrieve files")?;

    write_listing(&mut io::stdout().lock(), &response.files)?;

    Ok(())
}
