//! Mandi (market) prices from the data.gov.in Agmarknet feed

use crate::upstream::{fetch_json, UpstreamError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.data.gov.in";

/// "Current Daily Price of Various Commodities from Various Markets (Mandi)"
const RESOURCE_ID: &str = "9ef84268-d588-465a-a308-a864a43d0070";

/// Latest observed price for a commodity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRecord {
    pub modal_price: String,
    pub market: String,
    pub state: String,
}

impl fmt::Display for PriceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {}, {})", self.modal_price, self.market, self.state)
    }
}

#[async_trait]
pub trait MarketPrices: Send + Sync {
    /// Most recent record for `commodity`, `None` when the feed has none
    async fn latest_price(&self, commodity: &str) -> Result<Option<PriceRecord>, UpstreamError>;
}

pub struct AgmarknetClient {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl AgmarknetClient {
    pub fn new(client: Client, api_key: String, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn request(&self, commodity: &str) -> RequestBuilder {
        self.client
            .get(format!("{}/resource/{RESOURCE_ID}", self.base_url))
            .query(&[
                ("api-key", self.api_key.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("filters[commodity]", commodity_name(commodity).as_str()),
            ])
    }
}

#[async_trait]
impl MarketPrices for AgmarknetClient {
    async fn latest_price(&self, commodity: &str) -> Result<Option<PriceRecord>, UpstreamError> {
        let body: RecordsPage = fetch_json(self.request(commodity), self.timeout).await?;
        Ok(body.records.into_iter().next().map(RawRecord::into_price))
    }
}

/// Agmarknet commodity names are capitalized ("Rice", "Maize")
fn commodity_name(label: &str) -> String {
    let label = label.trim();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Deserialize)]
struct RecordsPage {
    #[serde(default)]
    records: Vec<RawRecord>,
}

/// Prices arrive as strings or numbers depending on the dataset revision
#[derive(Debug, Deserialize)]
struct RawRecord {
    modal_price: Option<Value>,
    market: Option<String>,
    state: Option<String>,
}

impl RawRecord {
    fn into_price(self) -> PriceRecord {
        PriceRecord {
            modal_price: self
                .modal_price
                .map_or_else(|| "unknown".to_string(), |v| scalar_text(&v)),
            market: self.market.unwrap_or_else(|| "unknown market".to_string()),
            state: self.state.unwrap_or_else(|| "unknown state".to_string()),
        }
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
