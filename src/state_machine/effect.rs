//! Effects produced by state transitions

use super::Language;
use crate::persona;

/// Canned replies the state machine can send without the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    LanguageMenu,
    WelcomeBackMenu,
    LanguageSelected(Language),
    InvalidChoice,
    GenerationFailed(Language),
}

impl Reply {
    pub fn text(self) -> &'static str {
        match self {
            Reply::LanguageMenu => persona::LANGUAGE_MENU,
            Reply::WelcomeBackMenu => persona::WELCOME_BACK_MENU,
            Reply::LanguageSelected(language) => persona::language_selected(language),
            Reply::InvalidChoice => persona::INVALID_CHOICE,
            Reply::GenerationFailed(language) => persona::generation_failed(language),
        }
    }
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Drop the stored session and start over with a fresh one
    DiscardSession,

    /// Answer with a fixed text
    Reply(Reply),

    /// Answer with generated text under the persona for `language`
    Generate { language: Language, message: String },
}

impl Effect {
    pub fn reply(reply: Reply) -> Self {
        Effect::Reply(reply)
    }

    pub fn generate(language: Language, message: impl Into<String>) -> Self {
        Effect::Generate {
            language,
            message: message.into(),
        }
    }
}
