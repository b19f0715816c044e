//! Bunny CLI: command-line client for the Bunny Babies back office.
//!
//! Set BUNNY_API_URL plus BUNNY_API_TOKEN (bearer) or BUNNY_API_KEY (X-API-Key).

use std::sync::Arc;

use anyhow::Context;
use bunny_api_client::ApiClient;
use bunny_cli::cli::{Cli, Commands};
use bunny_cli::{build_selection, init_tracing, validate_paths};
use bunny_core::{ClientConfig, ErrorMetadata};
use bunny_uploader::{NoopProgress, ProgressReporter, TracingProgress, UploadCoordinator};
use clap::Parser;
use serde::Serialize;

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    init_tracing(config.is_production());

    match cli.command {
        Commands::Validate { paths } => {
            let report = validate_paths(&config.media_rules, &paths).await;
            print_json(&report)?;
        }
        Commands::Categories => {
            let client = api_client(&config)?;
            let categories = client.list_event_categories().await?;
            print_json(&categories)?;
        }
        Commands::Login { email, password } => {
            let client = api_client(&config)?;
            let (_, token) = client.login(&email, &password).await?;
            println!("{}", token);
        }
        Commands::CreateEvent(args) => {
            let details = args.details();
            let selection = build_selection(
                config.media_rules.clone(),
                args.cover.as_deref(),
                &args.media,
                &args.featured_media,
            )
            .await?;

            let progress: Arc<dyn ProgressReporter> = if args.quiet {
                Arc::new(NoopProgress)
            } else {
                Arc::new(TracingProgress)
            };
            let client = api_client(&config)?;
            let coordinator = UploadCoordinator::from_client(client, &config, progress);
            match coordinator.submit_event(&details, &selection).await {
                Ok(event) => print_json(&event)?,
                Err(err) => {
                    tracing::error!(
                        error_code = err.error_code(),
                        recoverable = err.is_recoverable(),
                        "Event submission failed"
                    );
                    anyhow::bail!(err.client_message());
                }
            }
        }
    }

    Ok(())
}

fn api_client(config: &ClientConfig) -> anyhow::Result<ApiClient> {
    ApiClient::from_config(config).context(
        "Failed to create API client. Set BUNNY_API_URL and BUNNY_API_TOKEN or BUNNY_API_KEY",
    )
}
