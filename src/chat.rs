//! Chat runtime: runs the state machine against stored sessions
//!
//! Holds the user's session lease for the whole message, including the
//! generator call, so a reset cannot interleave with a reply in flight.

use crate::llm::LlmService;
use crate::persona;
use crate::session::SessionStore;
use crate::state_machine::{transition, ChatState, Effect, Event, Language, Reply};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Reply to one chat message plus the state it left the session in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    pub reply: String,
    pub state: ChatState,
}

pub struct ChatRuntime {
    sessions: Arc<SessionStore>,
    llm: Arc<dyn LlmService>,
    llm_timeout: Duration,
}

impl ChatRuntime {
    pub fn new(sessions: Arc<SessionStore>, llm: Arc<dyn LlmService>, llm_timeout: Duration) -> Self {
        Self {
            sessions,
            llm,
            llm_timeout,
        }
    }

    pub async fn handle_message(&self, user_id: &str, message: &str) -> ChatOutcome {
        let mut lease = self.sessions.get_or_create(user_id).await;
        let event = Event::from_message(message, lease.created());
        let result = transition(&lease.state, event);

        let mut reply = None;
        for effect in result.effects {
            match effect {
                Effect::DiscardSession => lease.reset(),
                Effect::Reply(canned) => reply = Some(canned.text().to_string()),
                Effect::Generate { language, message } => {
                    reply = Some(self.generate(user_id, language, &message).await);
                }
            }
        }

        lease.state = result.new_state;
        lease.touch();

        tracing::info!(
            user_id = %user_id,
            step = ?lease.state.step(),
            language = ?lease.state.language(),
            turns = lease.turns,
            session_started = %lease.created_at,
            "Chat message handled"
        );

        ChatOutcome {
            reply: reply.unwrap_or_else(|| {
                tracing::error!(user_id = %user_id, "Transition produced no reply");
                String::new()
            }),
            state: lease.state,
        }
    }

    /// Generated answer, or the localized apology if the generator fails
    async fn generate(&self, user_id: &str, language: Language, message: &str) -> String {
        let request = persona::chat_request(language, message);

        match timeout(self.llm_timeout, self.llm.complete(&request)).await {
            Ok(Ok(response)) => {
                if let Some(text) = response.non_empty_text() {
                    return text.to_string();
                }
                tracing::warn!(user_id = %user_id, "Generator returned empty text");
            }
            Ok(Err(e)) => {
                tracing::warn!(user_id = %user_id, error = %e, "Chat generation failed");
            }
            Err(_) => {
                tracing::warn!(
                    user_id = %user_id,
                    timeout_ms = %self.llm_timeout.as_millis(),
                    "Chat generation timed out"
                );
            }
        }

        Reply::GenerationFailed(language).text().to_string()
    }
}
