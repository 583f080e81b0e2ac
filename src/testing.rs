//! Mock implementations for testing
//!
//! Deterministic stand-ins for every external collaborator, recording what
//! they were asked.

use crate::classifier::{ClassifierError, CropClassifier, FeatureVector};
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use crate::market::{MarketPrices, PriceRecord};
use crate::upstream::UpstreamError;
use crate::weather::{WeatherLookup, WeatherObservation};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock LLM
// ============================================================================

/// Mock generator that returns queued responses
pub struct MockLlm {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    delay: Option<Duration>,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering, to exercise timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn queue_text(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::text(text)));
    }

    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmService for MockLlm {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

// ============================================================================
// Mock weather
// ============================================================================

/// Weather provider that knows a fixed reading, or fails
pub struct MockWeather {
    reading: Option<WeatherObservation>,
    delay: Option<Duration>,
    pub cities: Mutex<Vec<String>>,
}

impl MockWeather {
    pub fn reading(temperature: f64, humidity: f64) -> Self {
        Self {
            reading: Some(WeatherObservation {
                temperature,
                humidity,
            }),
            delay: None,
            cities: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            reading: None,
            delay: None,
            cities: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl WeatherLookup for MockWeather {
    async fn current(&self, city: &str) -> Result<WeatherObservation, UpstreamError> {
        self.cities.lock().unwrap().push(city.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reading
            .ok_or_else(|| UpstreamError::NotFound(format!("city {city}")))
    }
}

// ============================================================================
// Mock market
// ============================================================================

pub enum MarketBehavior {
    Price(PriceRecord),
    NoRecords,
    Fail,
}

pub struct MockMarket {
    behavior: MarketBehavior,
    pub commodities: Mutex<Vec<String>>,
}

impl MockMarket {
    pub fn new(behavior: MarketBehavior) -> Self {
        Self {
            behavior,
            commodities: Mutex::new(Vec::new()),
        }
    }

    pub fn price(modal_price: &str, market: &str, state: &str) -> Self {
        Self::new(MarketBehavior::Price(PriceRecord {
            modal_price: modal_price.to_string(),
            market: market.to_string(),
            state: state.to_string(),
        }))
    }
}

#[async_trait]
impl MarketPrices for MockMarket {
    async fn latest_price(&self, commodity: &str) -> Result<Option<PriceRecord>, UpstreamError> {
        self.commodities.lock().unwrap().push(commodity.to_string());
        match &self.behavior {
            MarketBehavior::Price(record) => Ok(Some(record.clone())),
            MarketBehavior::NoRecords => Ok(None),
            MarketBehavior::Fail => Err(UpstreamError::Status {
                status: 500,
                message: "internal error".to_string(),
            }),
        }
    }
}

// ============================================================================
// Mock classifier
// ============================================================================

/// Classifier returning a fixed label and recording its inputs
pub struct MockClassifier {
    label: Option<String>,
    pub calls: Mutex<Vec<FeatureVector>>,
}

impl MockClassifier {
    pub fn always(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            label: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CropClassifier for MockClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<String, ClassifierError> {
        self.calls.lock().unwrap().push(*features);
        self.label
            .clone()
            .ok_or_else(|| ClassifierError::InvalidArtifact("mock failure".to_string()))
    }
}
