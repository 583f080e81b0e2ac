//! HTTP API for the advisory backend

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::advisory::AdvisoryPipeline;
use crate::chat::ChatRuntime;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub advisory: Arc<AdvisoryPipeline>,
    pub chat: Arc<ChatRuntime>,
}

impl AppState {
    pub fn new(advisory: AdvisoryPipeline, chat: ChatRuntime) -> Self {
        Self {
            advisory: Arc::new(advisory),
            chat: Arc::new(chat),
        }
    }
}
