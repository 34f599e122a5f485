use anyhow::{Context, Result};
use brief::feed::{FeedController, FeedEvent};
use brief::remote::HttpArticleService;
use brief::Config;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long to wait for the event pump to go quiet before giving up.
const PUMP_TIMEOUT: Duration = Duration::from_secs(60);

/// Get the config file path (~/.config/brief/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("brief")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(name = "brief", about = "Reading-list client for summarized news")]
struct Args {
    /// Base URL of the collection service (overrides config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Category to list (omit for all categories)
    #[arg(long, conflicts_with = "search")]
    category: Option<String>,

    /// Search term instead of a category listing
    #[arg(long)]
    search: Option<String>,

    /// Number of pages to fetch
    #[arg(long, default_value_t = 1)]
    pages: u32,

    /// Show only saved articles from the loaded pages
    #[arg(long)]
    saved: bool,

    /// Also print the category counts
    #[arg(long)]
    categories: bool,

    /// Path to config file (defaults to ~/.config/brief/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let mut config = Config::load(&config_path).context("Failed to load config")?;
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }

    let service = HttpArticleService::new(
        &config.base_url,
        config.effective_api_key().as_deref(),
        config.request_timeout(),
    )
    .context("Failed to create article service")?;

    let (mut controller, mut events) =
        FeedController::new(Arc::new(service), config.feed_options());

    if args.categories {
        controller.refresh_categories();
    }

    match &args.search {
        Some(text) => controller.search(text),
        None => controller.select_category(args.category.as_deref()),
    }

    pump_until_idle(&mut controller, &mut events, args.pages, args.categories).await?;

    if let Some(error) = controller.error() {
        anyhow::bail!("{}", error);
    }

    if args.categories {
        for category in controller.categories() {
            println!("{:>6}  {}", category.count, category.name);
        }
        if !controller.categories().is_empty() {
            println!();
        }
    }

    let articles = if args.saved {
        controller.saved_view()
    } else {
        controller.articles().to_vec()
    };

    for article in &articles {
        let marker = if article.saved { "*" } else { " " };
        println!(
            "{} {}  [{:>10}]  {}  ({})",
            marker,
            article.published_at.format("%Y-%m-%d %H:%M"),
            article.category,
            article.title,
            article.source
        );
    }
    println!(
        "\n{} of {} articles loaded",
        articles.len(),
        controller.total_count()
    );

    Ok(())
}

/// Drain events until the requested number of pages has loaded (or no more
/// pages exist) and any outstanding category refresh has completed.
async fn pump_until_idle(
    controller: &mut FeedController,
    events: &mut mpsc::Receiver<FeedEvent>,
    pages: u32,
    mut categories_pending: bool,
) -> Result<()> {
    let mut pages_requested = 1u32;

    loop {
        let event = tokio::time::timeout(PUMP_TIMEOUT, events.recv())
            .await
            .context("Timed out waiting for the collection service")?
            .context("Event channel closed unexpectedly")?;
        if matches!(event, FeedEvent::CategoriesLoaded { .. }) {
            categories_pending = false;
        }
        controller.handle_event(event);

        if controller.is_loading() || categories_pending {
            continue;
        }
        if controller.error().is_some() {
            return Ok(());
        }
        if pages_requested < pages && controller.has_more() {
            pages_requested += 1;
            controller.load_more();
            continue;
        }
        return Ok(());
    }
}
