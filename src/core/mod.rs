pub mod engine;
pub mod favorites;
pub mod gazetteer;
pub mod location;
pub mod pipeline;
pub mod ranker;
pub mod search;

pub use crate::domain::model::{FeedInputs, RankedFeed};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
