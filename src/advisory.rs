//! Advisory pipeline behind `/predict`
//!
//! Weather → features → crop → market price → advice. Stages run strictly in
//! order. Only a weather failure aborts the request; price and advice
//! failures degrade to fixed texts inside an otherwise successful result.

use crate::classifier::{ClassifierError, CropClassifier, FeatureVector};
use crate::llm::{LlmRequest, LlmService};
use crate::market::MarketPrices;
use crate::upstream::UpstreamError;
use crate::weather::{WeatherLookup, WeatherObservation};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

pub const NO_PRICE_FOUND: &str = "No recent price found for this crop.";
pub const MARKET_DATA_ERROR: &str = "Market data error. Please try again later.";
pub const ADVICE_UNAVAILABLE: &str = "Advice is currently unavailable. Please try again later.";

/// One advisory request
#[derive(Debug, Clone, PartialEq)]
pub struct FarmInput {
    pub n: i64,
    pub p: i64,
    pub k: i64,
    pub ph: f64,
    pub rainfall: f64,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisoryResult {
    pub crop: String,
    pub price: String,
    pub advice: String,
}

#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("weather unavailable for {city}: {source}")]
    WeatherUnavailable {
        city: String,
        #[source]
        source: UpstreamError,
    },
    #[error("crop classification failed: {0}")]
    Classifier(#[from] ClassifierError),
}

/// Feature vector in the order the classifier was trained on
#[allow(clippy::cast_precision_loss)] // nutrient levels are small integers
pub fn assemble_features(input: &FarmInput, weather: &WeatherObservation) -> FeatureVector {
    FeatureVector::new([
        input.n as f64,
        input.p as f64,
        input.k as f64,
        weather.temperature,
        weather.humidity,
        input.ph,
        input.rainfall,
    ])
}

pub fn advice_prompt(city: &str, crop: &str, weather: &WeatherObservation, price: &str) -> String {
    format!(
        "Farmer in {city}, Crop: {crop}, Temp: {}C, Market price: {price}. Give a 3-point strategy.",
        weather.temperature
    )
}

pub struct AdvisoryPipeline {
    weather: Arc<dyn WeatherLookup>,
    classifier: Arc<dyn CropClassifier>,
    market: Arc<dyn MarketPrices>,
    llm: Arc<dyn LlmService>,
    upstream_timeout: Duration,
}

impl AdvisoryPipeline {
    pub fn new(
        weather: Arc<dyn WeatherLookup>,
        classifier: Arc<dyn CropClassifier>,
        market: Arc<dyn MarketPrices>,
        llm: Arc<dyn LlmService>,
        upstream_timeout: Duration,
    ) -> Self {
        Self {
            weather,
            classifier,
            market,
            llm,
            upstream_timeout,
        }
    }

    pub async fn advise(&self, input: &FarmInput) -> Result<AdvisoryResult, AdvisoryError> {
        let weather = self
            .bounded(self.weather.current(&input.city))
            .await
            .map_err(|source| AdvisoryError::WeatherUnavailable {
                city: input.city.clone(),
                source,
            })?;

        let features = assemble_features(input, &weather);
        let crop = self.classifier.classify(&features)?;
        tracing::debug!(city = %input.city, crop = %crop, ?features, "Crop classified");

        let price = self.price_for(&crop).await;
        let advice = self.advice_for(input, &crop, &weather, &price).await;

        Ok(AdvisoryResult {
            crop,
            price,
            advice,
        })
    }

    async fn price_for(&self, crop: &str) -> String {
        match self.bounded(self.market.latest_price(crop)).await {
            Ok(Some(record)) => record.to_string(),
            Ok(None) => NO_PRICE_FOUND.to_string(),
            Err(e) => {
                tracing::warn!(crop = %crop, error = %e, "Market price lookup failed");
                MARKET_DATA_ERROR.to_string()
            }
        }
    }

    async fn advice_for(
        &self,
        input: &FarmInput,
        crop: &str,
        weather: &WeatherObservation,
        price: &str,
    ) -> String {
        let request = LlmRequest::prompt(advice_prompt(&input.city, crop, weather, price));

        match timeout(self.upstream_timeout, self.llm.complete(&request)).await {
            Ok(Ok(response)) => match response.non_empty_text() {
                Some(text) => text.to_string(),
                None => {
                    tracing::warn!(crop = %crop, "Advice generator returned empty text");
                    ADVICE_UNAVAILABLE.to_string()
                }
            },
            Ok(Err(e)) => {
                tracing::warn!(crop = %crop, error = %e, "Advice generation failed");
                ADVICE_UNAVAILABLE.to_string()
            }
            Err(_) => {
                tracing::warn!(crop = %crop, "Advice generation timed out");
                ADVICE_UNAVAILABLE.to_string()
            }
        }
    }

    /// Apply the upstream timeout to a provider call
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, UpstreamError>>,
    ) -> Result<T, UpstreamError> {
        timeout(self.upstream_timeout, call)
            .await
            .unwrap_or(Err(UpstreamError::Timeout(self.upstream_timeout)))
    }
}
