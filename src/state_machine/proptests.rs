//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::event::{is_reset_command, language_choice};
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_language() -> impl Strategy<Value = Language> {
    prop_oneof![Just(Language::English), Just(Language::Hindi)]
}

fn arb_state() -> impl Strategy<Value = ChatState> {
    prop_oneof![
        Just(ChatState::AwaitingLanguage),
        arb_language().prop_map(|language| ChatState::Chatting { language }),
    ]
}

/// Free text, menu answers, reset commands with noise, Devanagari
fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ?!.]{0,40}",
        Just("1".to_string()),
        Just("2".to_string()),
        Just(" English ".to_string()),
        Just("HINDI".to_string()),
        Just("हिंदी".to_string()),
        Just("reset".to_string()),
        Just("  Init\n".to_string()),
        "[\\p{Devanagari} ]{0,20}",
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    (arb_text(), any::<bool>()).prop_map(|(text, first)| Event::from_message(&text, first))
}

/// What a menu answer with no recognizable token looks like
fn arb_unrecognized() -> impl Strategy<Value = String> {
    "[a-zA-Z ]{0,30}".prop_filter("must not name a language or reset", |s| {
        let normalized = s.trim().to_lowercase();
        language_choice(&normalized).is_none() && !is_reset_command(&normalized)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Every transition emits exactly one reply-producing effect
    #[test]
    fn prop_exactly_one_answer(state in arb_state(), event in arb_event()) {
        let result = transition(&state, event);
        let answers = result
            .effects
            .iter()
            .filter(|e| matches!(e, Effect::Reply(_) | Effect::Generate { .. }))
            .count();
        prop_assert_eq!(answers, 1);
    }

    /// Reset always lands on a fresh, language-less state
    #[test]
    fn prop_reset_from_any_state(state in arb_state()) {
        let result = transition(&state, Event::Reset);
        prop_assert_eq!(result.new_state, ChatState::AwaitingLanguage);
        prop_assert_eq!(result.new_state.language(), None);
        prop_assert_eq!(result.effects.first(), Some(&Effect::DiscardSession));
    }

    /// First contact always shows the plain menu and waits for a language
    #[test]
    fn prop_first_contact_shows_menu(state in arb_state()) {
        let result = transition(&state, Event::FirstContact);
        prop_assert_eq!(result.new_state, ChatState::AwaitingLanguage);
        prop_assert_eq!(result.effects, vec![Effect::Reply(Reply::LanguageMenu)]);
    }

    /// Once chatting, messages never change the language or step
    #[test]
    fn prop_chatting_is_stable(language in arb_language(), text in "[a-zA-Z0-9 ]{1,40}") {
        let state = ChatState::Chatting { language };
        let event = Event::from_message(&text, false);
        prop_assume!(event != Event::Reset);

        let result = transition(&state, event);
        prop_assert_eq!(result.new_state, state);
        let is_generate_in_language = matches!(
            result.effects.as_slice(),
            [Effect::Generate { language: l, .. }] if *l == language
        );
        prop_assert!(is_generate_in_language);
    }

    /// Unrecognized menu answers never leave the language menu
    #[test]
    fn prop_unrecognized_choice_stays(text in arb_unrecognized()) {
        let result = transition(&ChatState::AwaitingLanguage, Event::from_message(&text, false));
        prop_assert_eq!(result.new_state, ChatState::AwaitingLanguage);
        prop_assert_eq!(result.effects, vec![Effect::Reply(Reply::InvalidChoice)]);
    }

    /// Step and language always agree, whatever sequence of events arrives
    #[test]
    fn prop_step_language_agree(events in prop::collection::vec(arb_event(), 0..20)) {
        let mut state = ChatState::AwaitingLanguage;
        for event in events {
            state = transition(&state, event).new_state;
            prop_assert_eq!(state.language().is_some(), state.step() == Step::Chatting);
        }
    }
}

#[test]
fn test_worked_example() {
    // "hi" from an unseen user, then "2", then "reset"
    let first = transition(&ChatState::default(), Event::from_message("hi", true));
    assert_eq!(first.new_state.step(), Step::AwaitingLanguage);
    assert_eq!(first.effects, vec![Effect::Reply(Reply::LanguageMenu)]);

    let second = transition(&first.new_state, Event::from_message("2", false));
    assert_eq!(second.new_state.step(), Step::Chatting);
    assert_eq!(second.new_state.language(), Some(Language::Hindi));
    assert_eq!(
        second.effects,
        vec![Effect::Reply(Reply::LanguageSelected(Language::Hindi))]
    );

    let third = transition(&second.new_state, Event::from_message("reset", false));
    assert_eq!(third.new_state.step(), Step::AwaitingLanguage);
    assert_eq!(third.new_state.language(), None);
}
