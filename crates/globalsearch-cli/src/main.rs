//! GlobalSearch CLI - cross-wiki full-text and regex search

use std::time::Instant;

use clap::{Parser, Subcommand};
use globalsearch_core::cache::{CacheStore, FileStore};
use globalsearch_core::config::Config;
use globalsearch_core::query::parse_namespaces;
use globalsearch_core::search::{ResultSet, SearchParams, SearchService};
use tracing::debug;

#[derive(Parser)]
#[command(name = "globalsearch")]
#[command(author, version, about = "Search the source text of every wiki at once", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search
    Search {
        /// Search text; wrap in double quotes for an exact, case-sensitive match
        query: String,
        /// Treat the query as a regular expression
        #[arg(short, long)]
        regex: bool,
        /// Case-insensitive regex matching
        #[arg(short, long)]
        ignore_case: bool,
        /// Comma-separated namespace ids, e.g. 0,2,4
        #[arg(short, long)]
        namespaces: Option<String>,
        /// Regular expression the page title must match
        #[arg(short, long)]
        title: Option<String>,
        /// Bypass and refresh the result cache
        #[arg(long)]
        purge: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Cache management
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
    /// Reset to defaults
    Reset,
    /// Show config file path
    Path,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cached result set and the site lookup table
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so JSON output stays parseable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("globalsearch=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Search {
            query,
            regex,
            ignore_case,
            namespaces,
            title,
            purge,
        } => {
            let namespaces = match namespaces.as_deref() {
                Some(list) => parse_namespaces(list),
                None => Ok(Vec::new()),
            };
            match namespaces {
                Ok(namespaces) => {
                    let params = SearchParams {
                        query,
                        regex,
                        ignore_case,
                        namespaces,
                        title,
                        purge,
                    };
                    cmd_search(params, cli.format, cli.quiet).await
                }
                Err(e) => Err(e.into()),
            }
        }

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Cache { action } => cmd_cache(action, cli.quiet),
    };

    if let Err(e) = &outcome {
        if let Some(core) = e.downcast_ref::<globalsearch_core::Error>() {
            eprintln!("Error [{}]: {}", core.code(), core);
            if let Some(hint) = core.suggestion() {
                eprintln!("  Try: {}", hint);
            }
            std::process::exit(1);
        }
    }
    outcome
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_search(params: SearchParams, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let service = SearchService::from_config(&config)?;
    debug!(?params, "Dispatching search");

    let started = Instant::now();
    let set = service.search(params).await?;
    let elapsed_ms = started.elapsed().as_millis();

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "result": set,
                "elapsed_ms": elapsed_ms,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => print_results(&set, elapsed_ms, quiet),
    }
    Ok(())
}

fn print_results(set: &ResultSet, elapsed_ms: u128, quiet: bool) {
    if !quiet {
        println!(
            "{} matches, {} shown ({}, {} ms)",
            set.total,
            set.hits.len(),
            if set.from_cache { "cached" } else { "fresh" },
            elapsed_ms
        );
        if set.is_truncated() {
            println!(
                "Results are capped at {}; narrow the query to see the rest.",
                set.max_results
            );
        }
        println!();
    }

    for hit in &set.hits {
        if quiet {
            println!("{}", hit.url);
            continue;
        }
        println!("{}  {}", hit.wiki, hit.title);
        println!("  {}", hit.url);
        if !hit.source_text.is_empty() {
            println!("  {}", hit.source_text);
        }
    }
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn cmd_cache(action: CacheAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        CacheAction::Clear => {
            let store = FileStore::new(Config::cache_dir()?);
            store.clear()?;
            if !quiet {
                println!("Cleared cache at {}", store.root().display());
            }
        }
    }
    Ok(())
}
