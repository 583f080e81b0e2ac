//! Weather lookup via OpenWeatherMap current conditions

use crate::upstream::{fetch_json, UpstreamError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Current conditions for a city
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherObservation {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity, percent
    pub humidity: f64,
}

#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn current(&self, city: &str) -> Result<WeatherObservation, UpstreamError>;
}

pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl OpenWeatherClient {
    pub fn new(client: Client, api_key: String, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn request(&self, city: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[("q", city), ("appid", &self.api_key), ("units", "metric")])
    }
}

#[async_trait]
impl WeatherLookup for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<WeatherObservation, UpstreamError> {
        let body: CurrentWeather = fetch_json(self.request(city), self.timeout).await?;
        body.into_observation(city)
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: Option<MainReadings>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: f64,
}

impl CurrentWeather {
    fn into_observation(self, city: &str) -> Result<WeatherObservation, UpstreamError> {
        let main = self
            .main
            .ok_or_else(|| UpstreamError::Malformed(format!("no readings for {city}")))?;
        Ok(WeatherObservation {
            temperature: main.temp,
            humidity: main.humidity,
        })
    }
}
