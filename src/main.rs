use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rentals_discover::facets::{self, SortKey, Tab};
use rentals_discover::store::{ListingStore, MemoryStore, Page, PostgrestStore};
use rentals_discover::{format, query, Config, CountClient, CountState};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rentals-discover",
    version,
    about = "Faceted search over the rentals discover feed"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Serve queries from a JSON array of listings instead of the backend
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a query string and show what it filters by
    Describe { query: String },
    /// Count matching listings
    Count { query: String },
    /// Fetch one page of matching listings
    Fetch {
        query: String,
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Clear all facets, keeping the feed
    Reset { query: String },
    /// Pick an explicit sort (switches to the current-search tab)
    Sort { query: String, key: String },
    /// Switch tabs
    Tab { query: String, tab: String },
    /// Read query strings from stdin and print debounced counts
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Describe { query } => describe(&query),
        Command::Reset { query } => {
            println!("{}", facets::reset_query(&query));
            Ok(())
        }
        Command::Sort { query, key } => {
            let Some(sort) = SortKey::from_param(&key) else {
                bail!("Unknown sort key: {key}");
            };
            println!("{}", facets::select_sort(&query, sort));
            Ok(())
        }
        Command::Tab { query, tab } => {
            let Some(tab) = Tab::from_param(&tab) else {
                bail!("Unknown tab: {tab}");
            };
            println!("{}", facets::select_tab(&query, tab));
            Ok(())
        }
        Command::Count { query } => {
            let store = open_store(cli.fixtures.as_deref(), &config).await?;
            let client = CountClient::new(store, &config.count);
            let count = client
                .count_now(&facets::decode(&query))
                .await
                .context("Count request failed")?;
            println!("{}", format::format_count(count));
            Ok(())
        }
        Command::Fetch { query, page } => {
            let store = open_store(cli.fixtures.as_deref(), &config).await?;
            fetch(store.as_ref(), &query, Page::new(page, config.feed.page_size)).await
        }
        Command::Watch => {
            let store = open_store(cli.fixtures.as_deref(), &config).await?;
            watch(CountClient::new(store, &config.count), &config).await
        }
    }
}

async fn open_store(fixtures: Option<&Path>, config: &Config) -> Result<Arc<dyn ListingStore>> {
    if let Some(path) = fixtures {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read fixtures from {}", path.display()))?;
        let store = MemoryStore::from_json(&json).context("Failed to parse fixtures")?;
        info!("📂 Loaded {} fixture listings", store.len());
        return Ok(Arc::new(store));
    }

    let store =
        PostgrestStore::from_config(&config.backend).context("Failed to create backend client")?;
    Ok(Arc::new(store))
}

fn describe(raw: &str) -> Result<()> {
    let facets = facets::decode(raw);
    let predicate = query::build(&facets);

    println!("Query:     {}", facets::encode(&facets, raw));
    println!("Title:     {}", format::title(&facets));
    let pills: Vec<String> = format::pills(&facets).iter().map(ToString::to_string).collect();
    println!("Pills:     {}", pills.join(" | "));
    println!("Sort:      {}", query::resolve(&facets).as_str());
    println!("Predicate: {}", predicate);
    println!("{}", serde_json::to_string_pretty(&predicate)?);
    Ok(())
}

async fn fetch(store: &dyn ListingStore, raw: &str, page: Page) -> Result<()> {
    let facets = facets::decode(raw);
    let predicate = query::build(&facets);
    let sort = query::resolve(&facets);

    info!("🏠 {} (page {}, via {})", format::title(&facets), page.index, store.backend_name());

    let listings = store
        .fetch(&predicate, sort, page)
        .await
        .context("Fetch request failed")?;

    for (i, listing) in listings.iter().enumerate() {
        println!(
            "{}. {} ({} BD/month)",
            page.offset() + i as u64 + 1,
            listing.title,
            listing.price
        );
        println!("   {} beds, {} baths", listing.beds, listing.baths);
        if let Some(area) = &listing.location.area {
            println!("   Area: {}", area);
        }
        if let Some(sqm) = listing.area_sqm {
            println!("   Size: {} m²", sqm);
        }
        println!("   ID: {}", listing.id);
        if !listing.amenities.is_empty() {
            println!("   Amenities: {}", listing.amenities.join(", "));
        }
        println!();
    }

    info!("✅ Showing {} listings", listings.len());
    Ok(())
}

async fn watch(client: CountClient, config: &Config) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let Some(first) = lines.next_line().await? else {
        return Ok(());
    };

    let subscription = client.subscribe(facets::decode(&first), |state| match state {
        CountState::Pending => println!("…"),
        settled => println!("{} ({})", settled.button_label(), settled.count()),
    });

    while let Some(line) = lines.next_line().await? {
        subscription.update(facets::decode(&line));
    }

    // Let the last edit settle before tearing down.
    tokio::time::sleep(config.count.debounce() + config.count.timeout()).await;
    subscription.close();
    Ok(())
}
