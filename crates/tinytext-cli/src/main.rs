//! TinyText CLI - Summarize photos of small print
//!
//! Sends an image to a TinyText server and prints the templated summary.

mod api;
mod config;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use api::{CategoryResponse, SummarizeRequest, SummarizeResponse, TinyTextClient};
use config::Config;

#[derive(Parser)]
#[command(name = "tinytext")]
#[command(about = "TinyText CLI - Summarize photos of small print", long_about = None)]
#[command(version)]
struct Cli {
    /// Log requests to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize an image file
    Summarize {
        /// Path to a JPEG/PNG/WebP image
        image: PathBuf,
        /// Output language (defaults to the configured one)
        #[arg(short, long)]
        lang: Option<String>,
        /// Run only this model tier
        #[arg(short, long)]
        model: Option<String>,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Check that the server is reachable
    Health,

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the server URL
    SetUrl {
        url: String,
    },
    /// Set the default output language
    SetLang {
        lang: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "tinytext_cli=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Summarize { image, lang, model, json } => {
            cmd_summarize(image, lang, model, json).await
        }
        Commands::Health => cmd_health().await,
        Commands::Config { action } => cmd_config(action.unwrap_or(ConfigAction::Show)),
    }
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_summarize(
    image: PathBuf,
    lang: Option<String>,
    model: Option<String>,
    json: bool,
) -> Result<()> {
    let config = Config::load()?;
    let client = TinyTextClient::new(&config.base_url);

    let request = SummarizeRequest {
        image_base64: api::encode_image(&image)?,
        lang: Some(lang.unwrap_or_else(|| config.lang.clone())),
        force_model: model,
    };

    if !json {
        eprintln!("{} {}", "Reading".dimmed(), image.display());
    }

    let (raw, response) = client.summarize(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&raw)?);
    } else {
        print_summary(&response);
    }

    Ok(())
}

fn print_summary(response: &SummarizeResponse) {
    let payload = &response.payload;

    println!("{} {}", "Domain:".bold(), payload.domain.cyan());
    println!();
    println!("{}", payload.core_summary);

    for category in &payload.categories {
        println!();
        println!("{}", category_heading(category));
        println!("{}", category.summary);
    }

    if let Some(guess) = &payload.guess_summary {
        println!();
        println!("{}", "Best guess (text was hard to read):".yellow());
        println!("{}", guess);
    }

    if let Some(query) = &payload.coupang_query {
        println!();
        println!("{} {}", "Search:".dimmed(), query);
    }

    let meta = &response.meta;
    let fallback = if meta.fallback_used {
        " (fallback)".yellow().to_string()
    } else {
        String::new()
    };
    eprintln!(
        "\n{} {}{} · {} tokens · {} ms",
        "Model:".dimmed(),
        meta.model_used.green(),
        fallback,
        meta.total_tokens,
        meta.elapsed_ms
    );
}

/// Localized title followed by the stable category key
fn category_heading(category: &CategoryResponse) -> String {
    format!("{} {}", category.title.bold(), format!("[{}]", category.key).dimmed())
}

async fn cmd_health() -> Result<()> {
    let config = Config::load()?;
    let client = TinyTextClient::new(&config.base_url);

    print!("Checking {}... ", config.base_url);
    match client.health().await {
        Ok(true) => {
            println!("{}", "OK".green());
            Ok(())
        }
        _ => {
            println!("{}", "Failed".red());
            bail!("Could not reach TinyText API at {}", config.base_url);
        }
    }
}

fn cmd_config(action: ConfigAction) -> Result<()> {
    let mut config = Config::load_stored()?;

    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold());
            println!("  Path: {:?}", Config::config_path()?);
            println!("  Base URL: {}", config.base_url.cyan());
            println!("  Language: {}", config.lang.cyan());
        }
        ConfigAction::SetUrl { url } => {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("URL must start with http:// or https://");
            }
            config.set_base_url(&url);
            config.save()?;
            println!("{} Base URL set to {}", "✓".green(), config.base_url);
        }
        ConfigAction::SetLang { lang } => {
            if lang.trim().is_empty() {
                bail!("Language must not be empty");
            }
            config.set_lang(&lang);
            config.save()?;
            println!("{} Language set to {}", "✓".green(), config.lang);
        }
    }

    Ok(())
}
