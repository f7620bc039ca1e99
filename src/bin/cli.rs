//! Sensor Tree CLI
//!
//! Command-line client for a running sensor tree server:
//! - Browse roots and children
//! - Search names and metadata
//! - Reveal the path to a node or sensor
//! - Check status

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::PathBuf;

use sensor_tree::tree::{PathEntry, RevealedPath, SearchResult};

#[derive(Parser)]
#[command(name = "sensor-tree-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse and search a sensor tree server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8080", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List top-level nodes
    Roots,

    /// List folders and sensors under a node
    Children {
        /// Node ID
        id: String,
    },

    /// Search node and sensor names and metadata
    Search {
        /// Substring to look for (1-100 characters)
        query: String,
    },

    /// Show the path to a node or sensor with every ancestor expanded
    Reveal {
        /// Node or sensor ID
        id: String,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let json = cli.format == "json";

    match cli.command {
        Commands::Roots => {
            let entries: Vec<PathEntry> =
                fetch(client.get(format!("{}/api/nodes/root", cli.api_url))).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_entries(&entries);
            }
        }

        Commands::Children { id } => {
            let entries: Vec<PathEntry> =
                fetch(client.get(format!("{}/api/nodes/{}/children", cli.api_url, id))).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No children under {}", id);
            } else {
                print_entries(&entries);
            }
        }

        Commands::Search { query } => {
            let body = serde_json::json!({ "query": query });
            let results: Vec<SearchResult> =
                fetch(client.post(format!("{}/api/search", cli.api_url)).json(&body)).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No matches for '{}'", query);
            } else {
                println!("{:<20} {:<8} {:<28} {}", "ID", "Type", "Name", "Path");
                println!("{}", "-".repeat(90));

                for result in &results {
                    println!(
                        "{:<20} {:<8} {:<28} {}",
                        result.id,
                        result.kind,
                        result.name,
                        breadcrumb(&result.path)
                    );
                }
            }
        }

        Commands::Reveal { id } => {
            let revealed: RevealedPath =
                fetch(client.get(format!("{}/api/reveal-path/{}", cli.api_url, id))).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&revealed)?);
            } else if revealed.path.is_empty() {
                println!("Unknown id: {}", id);
            } else {
                print_revealed(&revealed);
            }
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", cli.api_url))
                .send()
                .await
                .with_context(|| format!("Cannot connect to sensor tree API at {}", cli.api_url))?;

            if !response.status().is_success() {
                bail!("API returned error: {}", response.status());
            }

            let health: serde_json::Value = response.json().await?;

            println!("Sensor Tree v{}", health["version"].as_str().unwrap_or("?"));
            println!();
            println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));

            if let Some(records) = health.get("records") {
                println!();
                println!("Store:");
                println!("  Nodes: {}", records["nodes"].as_u64().unwrap_or(0));
                println!("  Sensors: {}", records["sensors"].as_u64().unwrap_or(0));
            }

            let broadcaster = &health["broadcaster"];
            println!();
            println!("Live updates:");
            println!(
                "  Subscribers: {}",
                broadcaster["subscribers"].as_u64().unwrap_or(0)
            );
            println!(
                "  Broadcasting: {}",
                broadcaster["broadcasting"].as_bool().unwrap_or(false)
            );

            if let Some(uptime) = health["uptimeSeconds"].as_u64() {
                println!();
                println!("Uptime: {}", format_duration(uptime));
            }
        }

        Commands::Config { output } => {
            let config = sensor_tree::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Send a request and decode a JSON body, turning error envelopes into errors
async fn fetch<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> anyhow::Result<T> {
    let response = request.send().await.context("request failed")?;

    if !response.status().is_success() {
        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body["message"].as_str().unwrap_or("request failed");

        match body.get("details") {
            Some(details) => bail!("{} ({}): {}", message, status, details),
            None => bail!("{} ({})", message, status),
        }
    }

    Ok(response.json().await?)
}

fn print_entries(entries: &[PathEntry]) {
    println!("{:<20} {:<8} {:<28} {}", "ID", "Type", "Name", "Children");
    println!("{}", "-".repeat(66));

    for entry in entries {
        let children = if entry.has_children { "yes" } else { "-" };
        println!(
            "{:<20} {:<8} {:<28} {}",
            entry.id, entry.kind, entry.name, children
        );
    }
}

fn print_revealed(revealed: &RevealedPath) {
    println!("{}", breadcrumb(&revealed.path));
    println!();

    for (depth, entry) in revealed.path.iter().enumerate() {
        let indent = "  ".repeat(depth);
        println!("{}{} [{}]", indent, entry.name, entry.id);

        if let Some(children) = revealed.children_map.get(&entry.id) {
            for child in children {
                println!("{}  - {} [{}] ({})", indent, child.name, child.id, child.kind);
            }
        }
    }
}

fn breadcrumb(path: &[PathEntry]) -> String {
    path.iter()
        .map(|entry| entry.name.as_str())
        .collect::<Vec<_>>()
        .join(" > ")
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
