//! Tag Service CLI - Command-line client for the HTTP/JSON gateway

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_URL: &str = "http://127.0.0.1:8004";

#[derive(Parser)]
#[command(name = "tagsvc")]
#[command(about = "Tag Service CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server URL (HTTP gateway)
    #[arg(long, env = "TAGSVC_URL", default_value = DEFAULT_URL)]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the server is alive
    Ping,

    /// Show one tag
    Get {
        /// Tag ID
        id: i64,
    },

    /// List tags
    List {
        /// Exact tag name
        #[arg(long)]
        name: Option<String>,

        /// State filter (0 = disabled, 1 = enabled)
        #[arg(long)]
        state: Option<u32>,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Page size (max 100)
        #[arg(long, default_value = "10")]
        page_size: u32,
    },

    /// Create a tag
    Create {
        /// Tag name
        #[arg(short, long)]
        name: String,

        /// State (0 = disabled, 1 = enabled)
        #[arg(short, long, default_value = "1")]
        state: u32,
    },
}

/// HTTP Error Envelope as written by the gateway
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize, Serialize, Tabled)]
struct TagRow {
    id: i64,
    name: String,
    #[tabled(display_with = "display_state")]
    state: u32,
}

fn display_state(state: &u32) -> String {
    match state {
        0 => "disabled".to_string(),
        1 => "enabled".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct Pager {
    page: u32,
    page_size: u32,
    total_rows: i64,
}

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    list: Vec<TagRow>,
    pager: Option<Pager>,
}

/// Send a request; non-2xx responses are decoded as the error envelope
async fn send<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T> {
    let response = request.send().await.context("Failed to connect to server")?;
    let status = response.status();

    if !status.is_success() {
        let envelope: ErrorEnvelope = response.json().await.unwrap_or_default();
        anyhow::bail!(
            "{} (code {}): {}",
            status,
            envelope.code,
            if envelope.message.is_empty() {
                status.canonical_reason().unwrap_or("request failed")
            } else {
                envelope.message.as_str()
            }
        );
    }

    response.json().await.context("Failed to parse response")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Ping => {
            let body = client
                .get(format!("{}/ping", base))
                .send()
                .await
                .context("Failed to connect to server")?
                .text()
                .await?;
            println!("{}", format!("✓ {}", body).green().bold());
        }

        Commands::Get { id } => {
            let tag: TagRow = send(client.get(format!("{}/api/v1/tags/{}", base, id))).await?;
            println!("{}", Table::new(vec![tag]));
        }

        Commands::List {
            name,
            state,
            page,
            page_size,
        } => {
            let mut query: Vec<(&str, String)> = vec![
                ("page", page.to_string()),
                ("page_size", page_size.to_string()),
            ];
            if let Some(name) = name {
                query.push(("name", name));
            }
            if let Some(state) = state {
                query.push(("state", state.to_string()));
            }

            let result: TagList =
                send(client.get(format!("{}/api/v1/tags", base)).query(&query)).await?;

            if result.list.is_empty() {
                println!("{}", "No tags found".yellow());
            } else {
                println!("{}", Table::new(&result.list));
            }
            if let Some(pager) = result.pager {
                println!(
                    "{}",
                    format!(
                        "page {} (size {}), {} total",
                        pager.page, pager.page_size, pager.total_rows
                    )
                    .dimmed()
                );
            }
        }

        Commands::Create { name, state } => {
            let tag: TagRow = send(
                client
                    .post(format!("{}/api/v1/tags", base))
                    .json(&json!({ "name": name, "state": state })),
            )
            .await?;

            println!("{}", "✓ Tag created".green().bold());
            println!();
            println!("{}", Table::new(vec![tag]));
        }
    }

    Ok(())
}
