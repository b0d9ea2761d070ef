//! `apiver` CLI entry point.
//!
//! This binary is the composition root. Responsibilities:
//!
//! 1. **Parse configuration**: load `.apiver/config.toml` (or `--config`),
//!    then apply `APIVER_*` environment variables and flags on top.
//! 2. **Wire observability**: install a `tracing-subscriber` with an
//!    `EnvFilter` and a pretty or JSON formatter. Every `tracing` event
//!    emitted by the workspace crates flows through it.
//! 3. **Construct the pipeline**: default-query overrides and the
//!    `api-version` override per call, logging per retry, then a transport.
//! 4. **Run the command**:
//!    - `rewrite`: drive the chain into a dry-run transport and print the
//!      URI that would be sent.
//!    - `send`: drive the chain into the HTTP transport and print a JSON
//!      summary of the response.

mod app;
mod config;
mod observability;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pipeline::{ApiVersion, Method};

use crate::config::{AppConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(name = "apiver", version, about = "Send requests with an enforced api-version query parameter")]
struct Cli {
    /// Configuration file (default: .apiver/config.toml, if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// api-version to enforce on every request.
    #[arg(long, global = true, env = "APIVER_API_VERSION")]
    api_version: Option<String>,

    /// Base URI for relative targets.
    #[arg(long, global = true, env = "APIVER_ENDPOINT")]
    endpoint: Option<String>,

    /// Log event format.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the URI the pipeline would send, without sending it.
    Rewrite {
        /// Absolute URI, or a path relative to the endpoint.
        target: String,
    },
    /// Send a request through the pipeline and print a JSON summary.
    Send {
        /// Absolute URI, or a path relative to the endpoint.
        target: String,

        /// HTTP method.
        #[arg(long, short = 'X', default_value = "GET")]
        method: Method,

        /// Extra header as `name: value`; may be repeated.
        #[arg(long = "header", short = 'H', value_parser = app::parse_header)]
        headers: Vec<(String, String)>,

        /// Request body.
        #[arg(long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(api_version) = cli.api_version {
        config.client.api_version = ApiVersion::new(api_version);
    }
    if let Some(endpoint) = cli.endpoint {
        config.client.endpoint = Some(endpoint);
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    observability::init_tracing(&config.logging)?;
    tracing::debug!(
        api_version = %config.client.api_version,
        endpoint = config.client.endpoint.as_deref().unwrap_or("-"),
        "Configuration loaded"
    );

    match cli.command {
        Command::Rewrite { target } => {
            let uri = app::rewrite(&config.client, &target).await?;
            println!("{uri}");
        }
        Command::Send {
            target,
            method,
            headers,
            body,
        } => {
            let summary = app::send(
                &config.client,
                app::SendOptions {
                    target,
                    method,
                    headers,
                    body,
                },
            )
            .await?;
            let rendered =
                serde_json::to_string_pretty(&summary).context("failed to render summary")?;
            println!("{rendered}");
            if !(200..300).contains(&summary.status) {
                anyhow::bail!("server answered with status {}", summary.status);
            }
        }
    }
    Ok(())
}
