//! NaviLink CLI
//!
//! Loads a page from disk or over HTTP and prints its navigation links as JSON
//! or as an indented text listing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use navilink::{
    HtmlDocument, SiblingNavi, UpperNavi,
    error::{AppError, Result},
    models::{Config, Direction, LinkLists, SiblingResult},
    utils::http,
};

const USER_AGENT: &str = concat!("navilink/", env!("CARGO_PKG_VERSION"));

/// NaviLink - Navigation Link Finder
#[derive(Parser, Debug)]
#[command(
    name = "navilink",
    version,
    about = "Finds navigation, sibling and upper links of web pages"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// URL of the page (fetched unless --file is given)
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Read the page from a local HTML file instead of fetching it
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify the relation links, metas and scripts of the page
    Links,

    /// Find the previous or next page
    Sibling {
        /// `prev` or `next`
        direction: Direction,
    },

    /// List the parent and top pages of the URL
    Upper,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Config {
    path.map(Config::load_or_default).unwrap_or_default()
}

fn require_url(cli: &Cli) -> Result<&str> {
    cli.url
        .as_deref()
        .ok_or_else(|| AppError::config("--url is required for this command"))
}

/// Load the page given on the command line.
async fn load_document(cli: &Cli) -> Result<HtmlDocument> {
    let url = require_url(cli)?;

    match &cli.file {
        Some(path) => {
            log::debug!("Reading {} as {}", path.display(), url);
            let source = tokio::fs::read_to_string(path).await?;
            HtmlDocument::parse(url, &source)
        }
        None => {
            log::debug!("Fetching {}", url);
            let client = http::create_async_client(USER_AGENT, cli.timeout)?;
            http::fetch_document(&client, url).await
        }
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lists_text(lists: &LinkLists) {
    let groups = [
        ("Navigation", &lists.navi),
        ("Other relations", &lists.sub_navi),
        ("Page info", &lists.info),
    ];

    for (heading, buckets) in groups {
        if buckets.is_empty() {
            continue;
        }
        println!("{heading}");
        for bucket in buckets {
            let trimmed = if bucket.trimmed { " (trimmed)" } else { "" };
            println!("  {}{}", bucket.label(), trimmed);
            for entry in &bucket.list {
                match entry.url() {
                    Some(url) => println!("    {}  <{}>", entry.format(), url),
                    None => println!("    {}", entry.format()),
                }
            }
        }
    }
}

fn print_sibling_text(direction: Direction, result: Option<&SiblingResult>) {
    let Some(result) = result else {
        println!("No {direction} page found");
        return;
    };

    println!("{} ({})", direction, result.scan_type.as_str());
    for entry in &result.list {
        match entry.url() {
            Some(url) => println!("  {}  <{}>", entry.format(), url),
            None => println!("  {}", entry.format()),
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_ref());

    match &cli.command {
        Command::Links => {
            let doc = load_document(&cli).await?;
            let mut navi = SiblingNavi::new(&config)?;
            let lists = navi.classifier().lists(&doc);
            match cli.format {
                OutputFormat::Json => print_json(lists)?,
                OutputFormat::Text => print_lists_text(lists),
            }
        }

        Command::Sibling { direction } => {
            let doc = load_document(&cli).await?;
            let mut navi = SiblingNavi::new(&config)?;
            let result = navi.get_result(&doc, *direction);

            match &result {
                Some(result) => log::info!(
                    "{} page found by {}: {}",
                    direction,
                    result.scan_type.as_str(),
                    result.first_url().unwrap_or("(form submit)")
                ),
                None => log::info!("No {} page found", direction),
            }
            match cli.format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Text => print_sibling_text(*direction, result.as_ref()),
            }
        }

        Command::Upper => {
            let url = require_url(&cli)?;
            let upper = UpperNavi::new(&config);
            let (parent, top, list) = (upper.get_parent(url), upper.get_top(url), upper.get_list(url));
            match cli.format {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "parent": parent,
                    "top": top,
                    "list": list,
                }))?,
                OutputFormat::Text => {
                    println!("Parent: {}", parent.as_deref().unwrap_or("-"));
                    println!("Top: {}", top.as_deref().unwrap_or("-"));
                    for upper_url in &list {
                        println!("  {upper_url}");
                    }
                }
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            // Load strictly so parse errors are reported instead of defaulted.
            let config = match &cli.config {
                Some(path) => Config::load(path)?,
                None => config,
            };
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            println!(
                "Config OK ({} presets, {} base domain overrides)",
                config.presets.len(),
                config.base_domain.overrides.len()
            );
        }
    }

    Ok(())
}
