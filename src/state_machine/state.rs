//! Conversation state types

use std::fmt;

/// Reply language, locked for the rest of the conversation once chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Hindi,
}

impl Language {
    /// Name used inside the persona instruction
    pub fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which input handler applies to the next message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    AwaitingLanguage,
    Chatting,
}

/// Conversation state.
///
/// A language exists exactly when the conversation is chatting, so the
/// pairing of step and language cannot go out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    #[default]
    AwaitingLanguage,
    Chatting {
        language: Language,
    },
}

impl ChatState {
    pub fn step(&self) -> Step {
        match self {
            ChatState::AwaitingLanguage => Step::AwaitingLanguage,
            ChatState::Chatting { .. } => Step::Chatting,
        }
    }

    /// `None` while no language has been chosen
    pub fn language(&self) -> Option<Language> {
        match self {
            ChatState::AwaitingLanguage => None,
            ChatState::Chatting { language } => Some(*language),
        }
    }
}
