use async_trait::async_trait;
use reqwest::{Client, Url};

use crate::{
    config::FetchSettings,
    error::{ConfigError, FetchError, truncate_body},
    model::WeatherRecord,
};

use super::{WeatherFetcher, provider_location};

/// Current-weather fetcher for the OpenWeather `zip` endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherFetcher {
    endpoint: Url,
    api_key: String,
    http: Client,
}

impl OpenWeatherFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            http,
        })
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherFetcher {
    async fn fetch(&self, location: &str) -> Result<WeatherRecord, FetchError> {
        let zip = provider_location(location)?;
        log::debug!("Requesting current weather for zip={zip}");

        let res = self
            .http
            .get(self.endpoint.clone())
            .query(&[("zip", zip), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(FetchError::Transport)?;

        if !status.is_success() {
            log::debug!("Provider returned {status} for zip={zip}");
            return Err(FetchError::Provider {
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        WeatherRecord::from_json(&body).map_err(|e| {
            log::debug!("Undecodable response for zip={zip}: {e}");
            FetchError::Decode(e)
        })
    }
}
