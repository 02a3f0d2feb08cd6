use crate::core::favorites::FavoritesClient;
use crate::core::ranker::{Ranker, ScoringWeights};
use crate::domain::model::{Event, FeedInputs, RankedFeed, ResolvedLocation};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::{FeedError, Result};
use chrono::Utc;
use reqwest::Client;
use std::collections::HashSet;

pub const USER_LOCATION_KEY: &str = "user_location";
pub const FOLLOWED_CHURCHES_KEY: &str = "followed_churches";
pub const FEED_OUTPUT_KEY: &str = "personalized_feed.json";

/// The personalized-feed pipeline: pull the event list and the user's saved
/// state, rank, and persist the result.
pub struct ChurchFeedPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
    ranker: Ranker,
}

impl<S: Storage, C: ConfigProvider> ChurchFeedPipeline<S, C> {
    pub fn new(storage: S, config: C, weights: ScoringWeights) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
            ranker: Ranker::new(weights),
        }
    }

    async fn fetch_events(&self) -> Result<Vec<Event>> {
        let endpoint = format!("{}/events", self.config.api_endpoint());
        tracing::debug!("Fetching events from {}", endpoint);

        let response = self.client.get(&endpoint).send().await?;
        tracing::debug!("Events response status: {}", response.status());
        if !response.status().is_success() {
            return Err(FeedError::ApiStatusError {
                endpoint,
                status: response.status().as_u16(),
            });
        }

        let events: Vec<Event> = response.json().await?;
        Ok(events)
    }

    async fn load_saved_location(&self) -> Option<ResolvedLocation> {
        let bytes = self.storage.read_file(USER_LOCATION_KEY).await.ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(location) => Some(location),
            Err(e) => {
                tracing::warn!("Ignoring corrupt saved location: {}", e);
                None
            }
        }
    }

    /// The followed-church cache feeds affinity scoring. When the cache is
    /// missing and a token is available, it is refreshed from the favorites
    /// API; any failure degrades to an empty set rather than aborting the
    /// feed build.
    async fn load_followed_churches(&self) -> HashSet<i64> {
        if let Ok(bytes) = self.storage.read_file(FOLLOWED_CHURCHES_KEY).await {
            match serde_json::from_slice::<Vec<i64>>(&bytes) {
                Ok(ids) => return ids.into_iter().collect(),
                Err(e) => tracing::warn!("Ignoring corrupt followed-church cache: {}", e),
            }
        }

        let Some(token) = self.config.auth_token() else {
            tracing::info!("No followed-church cache and no token; affinity scoring is off");
            return HashSet::new();
        };

        let favorites = FavoritesClient::new(self.config.api_endpoint(), token);
        match favorites.fetch_all().await {
            Ok(summary) => {
                let ids: Vec<i64> = summary.followed_churches.iter().map(|c| c.id).collect();
                if let Ok(payload) = serde_json::to_vec(&ids) {
                    if let Err(e) = self.storage.write_file(FOLLOWED_CHURCHES_KEY, &payload).await
                    {
                        tracing::warn!("Could not cache followed churches: {}", e);
                    }
                }
                tracing::info!("Refreshed followed-church cache ({} churches)", ids.len());
                ids.into_iter().collect()
            }
            Err(e) => {
                tracing::warn!("Could not fetch favorites: {}; affinity scoring is off", e);
                HashSet::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ChurchFeedPipeline<S, C> {
    async fn extract(&self) -> Result<FeedInputs> {
        let (events, user_location, followed_church_ids) = tokio::join!(
            self.fetch_events(),
            self.load_saved_location(),
            self.load_followed_churches(),
        );
        let events = events?;

        if user_location.is_none() {
            tracing::info!("No saved location; events will rank without proximity");
        }

        Ok(FeedInputs {
            events,
            user_location,
            followed_church_ids,
        })
    }

    async fn transform(&self, inputs: FeedInputs) -> Result<RankedFeed> {
        let now = Utc::now();
        let FeedInputs {
            events,
            user_location,
            followed_church_ids,
        } = inputs;

        let ranked = self
            .ranker
            .rank(events, user_location.as_ref(), &followed_church_ids, now);

        Ok(RankedFeed {
            generated_at: now,
            location: user_location,
            event_count: ranked.len(),
            events: ranked,
        })
    }

    async fn load(&self, feed: RankedFeed) -> Result<String> {
        let payload = serde_json::to_vec_pretty(&feed)?;
        tracing::debug!("Writing feed ({} bytes) to storage", payload.len());
        self.storage.write_file(FEED_OUTPUT_KEY, &payload).await?;
        Ok(format!(
            "{}/{}",
            self.config.storage_path(),
            FEED_OUTPUT_KEY
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, key: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(key).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, key: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(key).cloned().ok_or_else(|| {
                FeedError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("No blob for key: {}", key),
                ))
            })
        }

        async fn write_file(&self, key: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(key.to_string(), data.to_vec());
            Ok(())
        }

        async fn remove_file(&self, key: &str) -> Result<()> {
            let mut files = self.files.lock().await;
            files.remove(key);
            Ok(())
        }
    }

    struct MockConfig {
        api_endpoint: String,
        storage_path: String,
        token: Option<String>,
    }

    impl MockConfig {
        fn new(api_endpoint: String) -> Self {
            Self {
                api_endpoint,
                storage_path: "test_output".to_string(),
                token: None,
            }
        }

        fn with_token(api_endpoint: String, token: &str) -> Self {
            Self {
                token: Some(token.to_string()),
                ..Self::new(api_endpoint)
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn api_endpoint(&self) -> &str {
            &self.api_endpoint
        }

        fn storage_path(&self) -> &str {
            &self.storage_path
        }

        fn auth_token(&self) -> Option<&str> {
            self.token.as_deref()
        }
    }

    fn event_json(id: i64, church_id: i64, lat: Option<f64>, likes: u32) -> serde_json::Value {
        let mut event = serde_json::json!({
            "id": id,
            "church_id": church_id,
            "title": format!("Event {}", id),
            "start_datetime": "2030-01-01T18:00:00Z",
            "like_count": likes
        });
        if let Some(lat) = lat {
            event["latitude"] = serde_json::json!(lat);
            event["longitude"] = serde_json::json!(-84.3880);
        }
        event
    }

    fn atlanta_location_json() -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "latitude": 33.7490,
            "longitude": -84.3880,
            "city": "Atlanta",
            "state": "GA",
            "display_address": "Atlanta, GA"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_extract_without_saved_state() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    event_json(1, 10, None, 5),
                    event_json(2, 11, None, 0)
                ]));
        });

        let storage = MockStorage::default();
        let config = MockConfig::new(server.base_url());
        let pipeline = ChurchFeedPipeline::new(storage, config, ScoringWeights::default());

        let inputs = pipeline.extract().await.unwrap();

        api_mock.assert();
        assert_eq!(inputs.events.len(), 2);
        assert!(inputs.user_location.is_none());
        assert!(inputs.followed_church_ids.is_empty());
    }

    #[tokio::test]
    async fn test_extract_reads_saved_location_and_follow_cache() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(200).json_body(serde_json::json!([]));
        });

        let storage = MockStorage::default();
        storage
            .write_file(USER_LOCATION_KEY, &atlanta_location_json())
            .await
            .unwrap();
        storage
            .write_file(FOLLOWED_CHURCHES_KEY, b"[10, 11]")
            .await
            .unwrap();

        let config = MockConfig::new(server.base_url());
        let pipeline = ChurchFeedPipeline::new(storage, config, ScoringWeights::default());

        let inputs = pipeline.extract().await.unwrap();
        assert_eq!(inputs.user_location.unwrap().city, "Atlanta");
        assert_eq!(
            inputs.followed_church_ids,
            HashSet::from([10, 11])
        );
    }

    #[tokio::test]
    async fn test_extract_refreshes_follow_cache_from_api() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(200).json_body(serde_json::json!([]));
        });
        let favorites_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/favorites/all")
                .header("Authorization", "Bearer secret-token");
            then.status(200).json_body(serde_json::json!({
                "followedChurches": [{
                    "id": 42,
                    "name": "Grace Fellowship",
                    "senior_pastor": "Jane Doe",
                    "address": "1 Main St",
                    "city": "Atlanta",
                    "state": "GA",
                    "zip": "30303",
                    "contact_email": "hello@example.org",
                    "contact_phone": "555-0100"
                }],
                "likedEvents": [],
                "counts": {"followedChurches": 1, "likedEvents": 0}
            }));
        });

        let storage = MockStorage::default();
        let config = MockConfig::with_token(server.base_url(), "secret-token");
        let pipeline =
            ChurchFeedPipeline::new(storage.clone(), config, ScoringWeights::default());

        let inputs = pipeline.extract().await.unwrap();

        favorites_mock.assert();
        assert_eq!(inputs.followed_church_ids, HashSet::from([42]));
        // The refreshed set is cached for the next run.
        let cached = storage.get_file(FOLLOWED_CHURCHES_KEY).await.unwrap();
        let cached_ids: Vec<i64> = serde_json::from_slice(&cached).unwrap();
        assert_eq!(cached_ids, vec![42]);
    }

    #[tokio::test]
    async fn test_extract_degrades_when_favorites_api_fails() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(200).json_body(serde_json::json!([]));
        });
        server.mock(|when, then| {
            when.method(GET).path("/favorites/all");
            then.status(500);
        });

        let storage = MockStorage::default();
        let config = MockConfig::with_token(server.base_url(), "secret-token");
        let pipeline = ChurchFeedPipeline::new(storage, config, ScoringWeights::default());

        let inputs = pipeline.extract().await.unwrap();
        assert!(inputs.followed_church_ids.is_empty());
    }

    #[tokio::test]
    async fn test_extract_fails_on_events_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/events");
            then.status(502);
        });

        let storage = MockStorage::default();
        let config = MockConfig::new(server.base_url());
        let pipeline = ChurchFeedPipeline::new(storage, config, ScoringWeights::default());

        match pipeline.extract().await {
            Err(FeedError::ApiStatusError { status, .. }) => assert_eq!(status, 502),
            other => panic!("expected ApiStatusError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transform_orders_by_priority() {
        let storage = MockStorage::default();
        let config = MockConfig::new("http://unused.test".to_string());
        let pipeline = ChurchFeedPipeline::new(storage, config, ScoringWeights::default());

        let events: Vec<Event> = serde_json::from_value(serde_json::json!([
            event_json(1, 10, None, 0),
            event_json(2, 11, Some(33.7490), 0), // at the user's location
            event_json(3, 12, None, 30)
        ]))
        .unwrap();
        let location: ResolvedLocation =
            serde_json::from_slice(&atlanta_location_json()).unwrap();

        let inputs = FeedInputs {
            events,
            user_location: Some(location),
            followed_church_ids: HashSet::new(),
        };

        let feed = pipeline.transform(inputs).await.unwrap();
        assert_eq!(feed.event_count, 3);
        let ids: Vec<i64> = feed.events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_load_persists_feed_and_returns_path() {
        let storage = MockStorage::default();
        let config = MockConfig::new("http://unused.test".to_string());
        let pipeline =
            ChurchFeedPipeline::new(storage.clone(), config, ScoringWeights::default());

        let feed = RankedFeed {
            generated_at: Utc::now(),
            location: None,
            event_count: 0,
            events: Vec::new(),
        };

        let output_path = pipeline.load(feed).await.unwrap();
        assert_eq!(output_path, "test_output/personalized_feed.json");

        let written = storage.get_file(FEED_OUTPUT_KEY).await.unwrap();
        let reloaded: RankedFeed = serde_json::from_slice(&written).unwrap();
        assert_eq!(reloaded.event_count, 0);
    }
}
