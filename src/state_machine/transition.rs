//! Pure state transition function
//!
//! Given the same state and event this always produces the same result and
//! performs no I/O. Every (state, event) pair has a transition.

use super::event::language_choice;
use super::{ChatState, Effect, Event, Reply};

/// Result of a state transition
#[derive(Debug, PartialEq, Eq)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

pub fn transition(state: &ChatState, event: Event) -> TransitionResult {
    match (state, event) {
        // Reset is accepted everywhere
        (_, Event::Reset) => TransitionResult::new(ChatState::AwaitingLanguage)
            .with_effect(Effect::DiscardSession)
            .with_effect(Effect::reply(Reply::WelcomeBackMenu)),

        // A brand-new session always starts with the menu, whatever was said
        (_, Event::FirstContact) => TransitionResult::new(ChatState::AwaitingLanguage)
            .with_effect(Effect::reply(Reply::LanguageMenu)),

        (ChatState::AwaitingLanguage, Event::Message { normalized, .. }) => {
            match language_choice(&normalized) {
                Some(language) => TransitionResult::new(ChatState::Chatting { language })
                    .with_effect(Effect::reply(Reply::LanguageSelected(language))),
                None => TransitionResult::new(ChatState::AwaitingLanguage)
                    .with_effect(Effect::reply(Reply::InvalidChoice)),
            }
        }

        (ChatState::Chatting { language }, Event::Message { text, .. }) => {
            TransitionResult::new(*state).with_effect(Effect::generate(*language, text))
        }
    }
}
