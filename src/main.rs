mod app;
mod client;
mod config;
mod events;
mod format;
mod ui;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use client::AskClient;
use config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "askr")]
#[command(version)]
#[command(about = "Terminal chat client for a question-answering endpoint", long_about = None)]
struct Cli {
    /// Base URL of the answering endpoint; overrides the config file and
    /// the ASKR_ENDPOINT environment variable
    #[arg(long, global = true, value_name = "URL")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the answer
    Ask { question: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    match cli.command {
        Some(Commands::Ask { question }) => {
            tracing_subscriber::fmt()
                .with_env_filter(log_filter())
                .with_writer(std::io::stderr)
                .init();
            ask_once(&config, &question).await
        }
        None => {
            init_file_logging()?;
            app::run(config).await
        }
    }
}

async fn ask_once(config: &Config, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        bail!("question is empty");
    }

    let client = AskClient::new(&config.endpoint);
    let answer = client.ask(question).await?;
    println!("{answer}");
    Ok(())
}

/// Interactive sessions own the terminal, so their logs go to
/// `~/.askr/askr.log` instead.
fn init_file_logging() -> Result<()> {
    let path = Config::log_path()?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file at {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_env("ASKR_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_flag_beats_loaded_config() {
        let cli = Cli::try_parse_from(["askr", "--endpoint", "http://flag.example:7777"]).unwrap();

        let mut config = Config::default();
        if let Some(endpoint) = cli.endpoint {
            config.endpoint = endpoint;
        }

        assert_eq!(config.endpoint, "http://flag.example:7777");
    }

    #[test]
    fn endpoint_flag_is_global_to_subcommands() {
        let cli =
            Cli::try_parse_from(["askr", "ask", "hello", "--endpoint", "http://flag.example:7777"])
                .unwrap();

        assert_eq!(cli.endpoint.as_deref(), Some("http://flag.example:7777"));
        assert!(matches!(cli.command, Some(Commands::Ask { question }) if question == "hello"));
    }

    #[test]
    fn bare_invocation_has_no_subcommand() {
        let cli = Cli::try_parse_from(["askr"]).unwrap();
        assert!(cli.endpoint.is_none());
        assert!(cli.command.is_none());
    }
}
