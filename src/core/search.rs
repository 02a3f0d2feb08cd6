//! Church directory search and the recent-search cache.

use crate::domain::model::Church;
use crate::domain::ports::Storage;
use crate::utils::error::Result;

pub const RECENT_SEARCHES_KEY: &str = "recent_church_searches";
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Case-insensitive substring match over name, city, and state. A blank
/// query matches everything.
pub fn filter_churches<'a>(churches: &'a [Church], query: &str) -> Vec<&'a Church> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return churches.iter().collect();
    }

    churches
        .iter()
        .filter(|church| {
            church.name.to_lowercase().contains(&query)
                || church.city.to_lowercase().contains(&query)
                || church.state.to_lowercase().contains(&query)
        })
        .collect()
}

/// Loads the cached recent searches, most recent first. A missing or corrupt
/// cache reads as empty rather than failing.
pub async fn load_recent_searches<S: Storage>(storage: &S) -> Vec<Church> {
    let Ok(bytes) = storage.read_file(RECENT_SEARCHES_KEY).await else {
        return Vec::new();
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        tracing::warn!("Discarding corrupt recent-search cache: {}", e);
        Vec::new()
    })
}

/// Records a selected church at the front of the recent list, dropping any
/// older entry for the same church and capping the list at
/// [`MAX_RECENT_SEARCHES`]. Returns the updated list.
pub async fn record_search<S: Storage>(storage: &S, church: &Church) -> Result<Vec<Church>> {
    let mut recent = load_recent_searches(storage).await;
    recent.retain(|entry| entry.id != church.id);
    recent.insert(0, church.clone());
    recent.truncate(MAX_RECENT_SEARCHES);

    storage
        .write_file(RECENT_SEARCHES_KEY, &serde_json::to_vec(&recent)?)
        .await?;
    Ok(recent)
}

pub async fn clear_recent_searches<S: Storage>(storage: &S) -> Result<()> {
    storage.remove_file(RECENT_SEARCHES_KEY).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::FeedError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
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

    fn make_church(id: i64, name: &str, city: &str, state: &str) -> Church {
        Church {
            id,
            name: name.to_string(),
            senior_pastor: "Pastor Example".to_string(),
            address: "1 Main St".to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip: "30303".to_string(),
            contact_email: "hello@example.org".to_string(),
            contact_phone: "555-0100".to_string(),
            website: None,
            logo_url: None,
            description: None,
            follower_count: None,
        }
    }

    fn sample_churches() -> Vec<Church> {
        vec![
            make_church(1, "Grace Fellowship", "Atlanta", "GA"),
            make_church(2, "New Hope Chapel", "Decatur", "GA"),
            make_church(3, "Riverside Church", "New York", "NY"),
        ]
    }

    #[test]
    fn test_filter_matches_name_city_and_state() {
        let churches = sample_churches();

        let by_name = filter_churches(&churches, "grace");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, 1);

        let by_city = filter_churches(&churches, "decatur");
        assert_eq!(by_city.len(), 1);
        assert_eq!(by_city[0].id, 2);

        let by_state = filter_churches(&churches, "GA");
        assert_eq!(by_state.len(), 2);
    }

    #[test]
    fn test_blank_query_returns_everything() {
        let churches = sample_churches();
        assert_eq!(filter_churches(&churches, "   ").len(), 3);
    }

    #[tokio::test]
    async fn test_recent_searches_start_empty() {
        let storage = MockStorage::default();
        assert!(load_recent_searches(&storage).await.is_empty());
    }

    #[tokio::test]
    async fn test_record_search_deduplicates_and_fronts() {
        let storage = MockStorage::default();
        let churches = sample_churches();

        record_search(&storage, &churches[0]).await.unwrap();
        record_search(&storage, &churches[1]).await.unwrap();
        let recent = record_search(&storage, &churches[0]).await.unwrap();

        let recent_ids: Vec<i64> = recent.iter().map(|c| c.id).collect();
        assert_eq!(recent_ids, vec![1, 2]);

        let reloaded = load_recent_searches(&storage).await;
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded[0].id, 1);
    }

    #[tokio::test]
    async fn test_record_search_caps_the_list() {
        let storage = MockStorage::default();
        for id in 0..8 {
            let church = make_church(id, &format!("Church {}", id), "Atlanta", "GA");
            record_search(&storage, &church).await.unwrap();
        }

        let recent = load_recent_searches(&storage).await;
        assert_eq!(recent.len(), MAX_RECENT_SEARCHES);
        assert_eq!(recent[0].id, 7); // most recent first
    }

    #[tokio::test]
    async fn test_clear_recent_searches() {
        let storage = MockStorage::default();
        record_search(&storage, &sample_churches()[0]).await.unwrap();
        clear_recent_searches(&storage).await.unwrap();
        assert!(load_recent_searches(&storage).await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_cache_reads_as_empty() {
        let storage = MockStorage::default();
        storage
            .write_file(RECENT_SEARCHES_KEY, b"not json at all")
            .await
            .unwrap();
        assert!(load_recent_searches(&storage).await.is_empty());
    }
}
