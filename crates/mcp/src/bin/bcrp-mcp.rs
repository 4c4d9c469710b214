// Standalone MCP server binary

use anyhow::{Context, Result};
use bcrp_core::BcrpClient;
use bcrp_mcp::config::{LoggingConfig, McpConfig};
use bcrp_mcp::prompts::PromptRegistry;
use bcrp_mcp::server::McpServer;
use bcrp_mcp::tools::{bcrp_tools, ToolRegistry};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "bcrp-mcp")]
#[command(about = "MCP server for BCRP (Banco Central de Reserva del Perú) time series", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "BCRP_MCP_CONFIG", default_value = "bcrp-mcp.toml")]
    config: PathBuf,

    /// Override the statistics service base URL
    #[arg(long, env = "BCRP_BASE_URL")]
    base_url: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server on stdio (default)
    Serve,
    /// Search time series groups by keyword
    Groups {
        #[arg(required = true)]
        keywords: Vec<String>,
    },
    /// List the series of a group
    Series { group: String },
    /// Fetch observations of a series
    Data {
        code: String,
        start: String,
        end: String,
    },
}

/// Logs go to stderr; stdout carries protocol messages only.
fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.as_str().into());

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Run one tool outside the server and print its JSON result.
async fn run_once(tools: &ToolRegistry, name: &str, arguments: serde_json::Value) -> Result<()> {
    let tool = tools
        .get(name)
        .with_context(|| format!("Tool not registered: {}", name))?;
    let result = tool.execute(arguments).await?;
    println!("{}", result.joined_text());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = McpConfig::load(&args.config)?;
    if let Some(base_url) = args.base_url {
        config.bcrp.base_url = base_url;
    }
    if args.log_json {
        config.logging.json = true;
    }

    init_tracing(&config.logging);

    match &config.source {
        Some(path) => tracing::info!("Loaded configuration from {}", path.display()),
        None => tracing::info!("Configuration file not found, using defaults"),
    }
    tracing::info!("Statistics service: {}", config.bcrp.base_url);

    let client = Arc::new(BcrpClient::new(config.bcrp).context("Failed to create BCRP client")?);
    let tools = bcrp_tools(client);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!("BCRP MCP server starting...");
            let server = McpServer::new(tools, PromptRegistry::bcrp_prompts());
            server.start().await?;
        }
        Command::Groups { keywords } => {
            run_once(
                &tools,
                "search_time_series_groups",
                serde_json::json!({ "keywords": keywords }),
            )
            .await?;
        }
        Command::Series { group } => {
            run_once(
                &tools,
                "search_time_series_by_group",
                serde_json::json!({ "time_series_group": group }),
            )
            .await?;
        }
        Command::Data { code, start, end } => {
            run_once(
                &tools,
                "get_time_series_data",
                serde_json::json!({ "time_series_code": code, "start": start, "end": end }),
            )
            .await?;
        }
    }

    Ok(())
}
