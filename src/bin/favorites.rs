use anyhow::Context;
use clap::Parser;
use parish_feed::core::favorites::FavoritesClient;
use parish_feed::core::pipeline::FOLLOWED_CHURCHES_KEY;
use parish_feed::domain::ports::Storage;
use parish_feed::utils::{logger, validation};
use parish_feed::LocalStorage;

#[derive(Debug, Parser)]
#[command(name = "favorites")]
#[command(about = "Manage followed churches and liked events")]
struct FavoritesCli {
    #[arg(long, default_value = "http://localhost:3000/api")]
    api_endpoint: String,

    #[arg(long, default_value = "./parish-data")]
    storage_path: String,

    #[arg(long, help = "Bearer token for the favorites API")]
    token: String,

    #[arg(long, help = "Follow a church by id")]
    follow_church: Option<i64>,

    #[arg(long, help = "Unfollow a church by id")]
    unfollow_church: Option<i64>,

    #[arg(long, help = "Like an event by id")]
    like_event: Option<i64>,

    #[arg(long, help = "Unlike an event by id")]
    unlike_event: Option<i64>,

    #[arg(long, help = "Check whether a church is followed")]
    church_status: Option<i64>,

    #[arg(long, help = "Check whether an event is liked")]
    event_status: Option<i64>,

    #[arg(long, help = "Print the follow/like summary")]
    list: bool,

    #[arg(long, help = "Refresh the local followed-church cache used by the feed")]
    sync: bool,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

impl FavoritesCli {
    fn mutates_follows(&self) -> bool {
        self.follow_church.is_some() || self.unfollow_church.is_some()
    }

    fn has_work(&self) -> bool {
        self.mutates_follows()
            || self.like_event.is_some()
            || self.unlike_event.is_some()
            || self.church_status.is_some()
            || self.event_status.is_some()
            || self.list
            || self.sync
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = FavoritesCli::parse();
    logger::init_cli_logger(cli.verbose);

    if let Err(e) = validation::validate_non_empty_string("token", &cli.token) {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if !cli.has_work() {
        eprintln!(
            "Nothing to do; pass --follow-church, --like-event, --list, or --sync (see --help)"
        );
        std::process::exit(1);
    }

    let client = FavoritesClient::new(cli.api_endpoint.as_str(), cli.token.as_str());

    if let Some(id) = cli.follow_church {
        client.follow_church(id).await.context("follow failed")?;
        println!("✅ Following church {}", id);
    }
    if let Some(id) = cli.unfollow_church {
        client.unfollow_church(id).await.context("unfollow failed")?;
        println!("✅ Unfollowed church {}", id);
    }
    if let Some(id) = cli.like_event {
        client.like_event(id).await.context("like failed")?;
        println!("✅ Liked event {}", id);
    }
    if let Some(id) = cli.unlike_event {
        client.unlike_event(id).await.context("unlike failed")?;
        println!("✅ Unliked event {}", id);
    }
    if let Some(id) = cli.church_status {
        let following = client.follow_status(id).await?;
        println!(
            "Church {} is {}",
            id,
            if following { "followed" } else { "not followed" }
        );
    }
    if let Some(id) = cli.event_status {
        let liked = client.like_status(id).await?;
        println!(
            "Event {} is {}",
            id,
            if liked { "liked" } else { "not liked" }
        );
    }

    // Follow changes invalidate the feed's local cache, so any mutation
    // triggers the same refresh --sync does.
    if cli.list || cli.sync || cli.mutates_follows() {
        let summary = client.fetch_all().await.context("could not fetch favorites")?;

        if cli.list {
            println!(
                "Following {} churches • {} liked events",
                summary.counts.followed_churches, summary.counts.liked_events
            );
            for church in &summary.followed_churches {
                println!("  ⛪ {} ({}, {})", church.name, church.city, church.state);
            }
            for event in &summary.liked_events {
                println!(
                    "  ❤️ {} on {}",
                    event.title,
                    event.start_datetime.format("%Y-%m-%d %H:%M")
                );
            }
        }

        let ids: Vec<i64> = summary.followed_churches.iter().map(|c| c.id).collect();
        let storage = LocalStorage::new(cli.storage_path.clone());
        storage
            .write_file(FOLLOWED_CHURCHES_KEY, &serde_json::to_vec(&ids)?)
            .await?;
        tracing::info!("Synced {} followed churches to the local cache", ids.len());
    }

    Ok(())
}
