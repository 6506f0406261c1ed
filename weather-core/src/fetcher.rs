use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::FetchError, model::WeatherRecord};

pub mod openweather;

pub use openweather::OpenWeatherFetcher;

/// Fetches the current weather for a single location.
///
/// Implementations hold configuration only, so one instance can be shared by
/// any number of concurrent callers.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(&self, location: &str) -> Result<WeatherRecord, FetchError>;
}

/// Maximum identifier length accepted by the provider's `zip` parameter.
pub const LOCATION_ID_LEN: usize = 5;

/// Normalize a caller-supplied identifier into the provider's format: trimmed,
/// non-empty, and cut to its first [`LOCATION_ID_LEN`] characters.
pub fn provider_location(location: &str) -> Result<&str, FetchError> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidLocation);
    }

    let end = trimmed
        .char_indices()
        .nth(LOCATION_ID_LEN)
        .map(|(idx, _)| idx)
        .unwrap_or(trimmed.len());

    Ok(&trimmed[..end])
}
