use anyhow::Context;
use clap::Parser;
use parish_feed::core::search;
use parish_feed::domain::model::Church;
use parish_feed::utils::error::FeedError;
use parish_feed::utils::logger;
use parish_feed::LocalStorage;

#[derive(Debug, Parser)]
#[command(name = "church-search")]
#[command(about = "Search the church directory")]
struct SearchCli {
    #[arg(long, default_value = "http://localhost:3000/api")]
    api_endpoint: String,

    #[arg(long, default_value = "./parish-data")]
    storage_path: String,

    #[arg(long, help = "Filter churches by name, city, or state")]
    query: Option<String>,

    #[arg(long, help = "Record a church id into recent searches")]
    select: Option<i64>,

    #[arg(long, help = "Show recent searches")]
    recent: bool,

    #[arg(long, help = "Clear recent searches")]
    clear_recent: bool,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

async fn fetch_churches(api_endpoint: &str) -> Result<Vec<Church>, FeedError> {
    let endpoint = format!("{}/churches", api_endpoint);
    tracing::debug!("Fetching churches from {}", endpoint);

    let response = reqwest::get(&endpoint).await?;
    if !response.status().is_success() {
        return Err(FeedError::ApiStatusError {
            endpoint,
            status: response.status().as_u16(),
        });
    }
    let churches = response.json().await?;
    Ok(churches)
}

fn print_church(church: &Church) {
    println!(
        "  [{}] {} — {}, {}",
        church.id, church.name, church.city, church.state
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = SearchCli::parse();
    logger::init_cli_logger(cli.verbose);

    let storage = LocalStorage::new(cli.storage_path.clone());

    if cli.clear_recent {
        search::clear_recent_searches(&storage).await?;
        println!("✅ Recent searches cleared");
        return Ok(());
    }

    if cli.recent || (cli.query.is_none() && cli.select.is_none()) {
        let recent = search::load_recent_searches(&storage).await;
        if recent.is_empty() {
            println!("No recent searches");
        } else {
            println!("Recent searches:");
            for church in &recent {
                print_church(church);
            }
        }
        return Ok(());
    }

    let churches = fetch_churches(&cli.api_endpoint)
        .await
        .context("could not load the church directory")?;

    if let Some(query) = &cli.query {
        let matches = search::filter_churches(&churches, query);
        println!("{} churches match \"{}\":", matches.len(), query);
        for church in &matches {
            print_church(church);
        }
    }

    if let Some(id) = cli.select {
        let Some(church) = churches.iter().find(|c| c.id == id) else {
            eprintln!("❌ No church with id {}", id);
            std::process::exit(1);
        };
        let recent = search::record_search(&storage, church).await?;
        println!(
            "✅ Saved {} to recent searches ({} remembered)",
            church.name,
            recent.len()
        );
    }

    Ok(())
}
