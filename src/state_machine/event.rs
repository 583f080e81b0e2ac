//! Events that drive the conversation, and the grammar that recognizes them

use super::Language;

/// Messages that restart the conversation from the language menu
const RESET_COMMANDS: &[&str] = &["reset", "init"];

/// Tokens selecting each language. English is checked first, so a message
/// naming both picks English.
const ENGLISH_TOKENS: &[&str] = &["1", "english"];
const HINDI_TOKENS: &[&str] = &["2", "hindi", "हिंदी", "हिन्दी"];

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Explicit restart command, accepted in every state
    Reset,
    /// First message from a user without a session
    FirstContact,
    /// Any other message
    Message {
        /// Trimmed and lower-cased, used for matching
        normalized: String,
        /// Trimmed original, forwarded to the generator
        text: String,
    },
}

impl Event {
    /// Classify an incoming chat message.
    ///
    /// `first_contact` is true when the session was created for this message.
    /// A reset command wins over first contact.
    pub fn from_message(raw: &str, first_contact: bool) -> Self {
        let text = raw.trim();
        let normalized = text.to_lowercase();

        if is_reset_command(&normalized) {
            Event::Reset
        } else if first_contact {
            Event::FirstContact
        } else {
            Event::Message {
                normalized,
                text: text.to_string(),
            }
        }
    }
}

pub fn is_reset_command(normalized: &str) -> bool {
    RESET_COMMANDS.contains(&normalized)
}

/// Language picked by a menu answer, if any
pub fn language_choice(normalized: &str) -> Option<Language> {
    let mentions = |tokens: &[&str]| tokens.iter().any(|t| normalized.contains(t));

    if mentions(ENGLISH_TOKENS) {
        Some(Language::English)
    } else if mentions(HINDI_TOKENS) {
        Some(Language::Hindi)
    } else {
        None
    }
}
