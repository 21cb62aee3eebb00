use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;

use emojifeed::config::Config;
use emojifeed::emoji::EmojiRecord;
use emojifeed::feed::{DirSource, FeedSource, HttpSource, Provider, FEED_NAMES};
use emojifeed::output::{self, Format};

/// Get the default config file path (~/.config/emojifeed/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("emojifeed")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "emojifeed",
    about = "Download the Unicode emoji data feeds and print them as emoji records"
)]
struct Args {
    /// Config file (defaults to ~/.config/emojifeed/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the base URL feeds are downloaded from
    #[arg(long, value_name = "URL", conflicts_with = "dir")]
    base_url: Option<String>,

    /// Read <DIR>/<feed>.txt from disk instead of downloading
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Feed to load; repeat for several (defaults to all known feeds, in order)
    #[arg(long = "feed", value_name = "NAME")]
    feeds: Vec<String>,

    /// Only print records whose group matches (case-insensitive)
    #[arg(long, value_name = "GROUP")]
    group: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

async fn load<S: FeedSource>(source: S, feeds: &[String]) -> Result<Vec<EmojiRecord>> {
    let provider = Provider::new(source);
    let records = if feeds.is_empty() {
        provider.all_emojis().await?
    } else {
        provider.emojis_from(feeds).await?
    };
    Ok(records)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never mix with records on stdout
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }

    if args.feeds.is_empty() {
        tracing::debug!(feeds = ?FEED_NAMES, "Loading all emoji feeds");
    } else {
        tracing::debug!(feeds = ?args.feeds, "Loading selected emoji feeds");
    }

    let mut records = match &args.dir {
        Some(dir) => load(DirSource::new(dir), &args.feeds).await,
        None => {
            let client = reqwest::Client::builder()
                .user_agent(concat!("emojifeed/", env!("CARGO_PKG_VERSION")))
                .build()
                .context("Failed to build HTTP client")?;
            let source = HttpSource::new(client, &config).context("Invalid feed source")?;
            load(source, &args.feeds).await
        }
    }
    .context("Failed to load emoji feeds")?;

    if let Some(group) = &args.group {
        records.retain(|r| r.in_group(group));
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    output::render(&records, args.format, &mut out).context("Failed to write output")?;
    out.flush()?;

    tracing::info!(records = records.len(), "Done");
    Ok(())
}
