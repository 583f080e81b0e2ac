//! Assistant persona and the fixed texts of the chat flow
//!
//! Off-topic refusal is requested from the model through the persona
//! instruction; nothing here filters the generated text.

use crate::llm::LlmRequest;
use crate::state_machine::Language;

pub const ASSISTANT_NAME: &str = "AgroSmart Virtual Assistant";

pub const LANGUAGE_MENU: &str = "Please select your language: 1. English or 2. Hindi.";

pub const WELCOME_BACK_MENU: &str =
    "Welcome back! Please select your language: \n1. English \n2. Hindi (हिंदी)";

pub const INVALID_CHOICE: &str = "Choose 1 or 2.";

const ENGLISH_SELECTED: &str =
    "English set. I can help with soil, crops, weather, and Mandi prices. What is your question?";

const HINDI_SELECTED: &str =
    "हिंदी सेट की गई है। मैं मिट्टी, फसल और मंडी भाव में मदद कर सकता हूँ। आपका प्रश्न क्या है?";

const ENGLISH_GENERATION_FAILED: &str = "Error connecting to AI. Please try again.";

const HINDI_GENERATION_FAILED: &str = "AI से कनेक्ट करने में त्रुटि हुई। कृपया पुनः प्रयास करें।";

/// Confirmation sent once the language is locked in
pub fn language_selected(language: Language) -> &'static str {
    match language {
        Language::English => ENGLISH_SELECTED,
        Language::Hindi => HINDI_SELECTED,
    }
}

/// Apology sent when the generator cannot answer
pub fn generation_failed(language: Language) -> &'static str {
    match language {
        Language::English => ENGLISH_GENERATION_FAILED,
        Language::Hindi => HINDI_GENERATION_FAILED,
    }
}

/// System instruction for free-form chat, fixed to one language
pub fn chat_instruction(language: Language) -> String {
    format!(
        "You are the {ASSISTANT_NAME}. Respond strictly in {}. \
         IMPORTANT: Only answer questions related to agriculture, soil (NPK, pH), \
         weather, and crop market prices as featured on the AgroSmart website. \
         If a user asks about unrelated topics (movies, sports, etc.), politely \
         decline and ask them to stick to farming queries.",
        language.display_name()
    )
}

pub fn chat_request(language: Language, message: &str) -> LlmRequest {
    LlmRequest::prompt(format!("User: {message}")).with_system(chat_instruction(language))
}
