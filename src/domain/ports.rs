use crate::domain::model::{Coordinates, FeedInputs, GeocodedAddress, RankedFeed};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Key/value blob store for cached device state (location, follows, recent
/// searches) and the feed output.
pub trait Storage: Send + Sync {
    fn read_file(&self, key: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        key: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Injected reverse-geocoding capability. A lookup that knows nothing about
/// the coordinates returns an empty address rather than failing.
pub trait ReverseGeocoder: Send + Sync {
    fn reverse_geocode(&self, coordinates: Coordinates) -> GeocodedAddress;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn storage_path(&self) -> &str;
    fn auth_token(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<FeedInputs>;
    async fn transform(&self, inputs: FeedInputs) -> Result<RankedFeed>;
    async fn load(&self, feed: RankedFeed) -> Result<String>;
}
