//! API request and response types

use crate::advisory::FarmInput;
use serde::{Deserialize, Serialize};

/// Soil and location readings for a crop recommendation
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub n: i64,
    pub p: i64,
    pub k: i64,
    pub ph: f64,
    pub rainfall: f64,
    pub city: String,
}

impl From<PredictRequest> for FarmInput {
    fn from(req: PredictRequest) -> Self {
        FarmInput {
            n: req.n,
            p: req.p,
            k: req.k,
            ph: req.ph,
            rainfall: req.rainfall,
            city: req.city,
        }
    }
}

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
}

/// Response for chat action
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Liveness message
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub message: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
