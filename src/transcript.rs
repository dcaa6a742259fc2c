use std::str::Lines;

use crate::models::ConversationPair;

/// Marks a user turn
const USER_PREFIX: &str = "You: ";
/// Marks raw assistant output captured from the inference subprocess
const RAW_RESPONSE_PREFIX: &str = "[llama.cpp-stdout] ";
/// Marks a cleaned assistant line
const CLEAN_RESPONSE_PREFIX: &str = "AI: ";

/// Responses this short or shorter are discarded (but still consume the turn)
const MIN_RESPONSE_CHARS: usize = 3;

/// Lazy iterator over the conversation pairs of one transcript.
///
/// One pending user turn is tracked at a time. The first response line
/// that arrives while a turn is pending resolves it: the pair is emitted
/// when the response is long enough, silently dropped otherwise. Response
/// lines with no pending turn are ignored, so a second response channel
/// logging the same answer never produces a duplicate pair.
pub struct Pairs<'a> {
    lines: Lines<'a>,
    pending_user: Option<&'a str>,
}

impl<'a> Pairs<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            pending_user: None,
        }
    }

    /// Resolve a response payload against the pending turn. The turn is
    /// consumed even when the response is too short to keep; an empty
    /// payload leaves it open.
    fn resolve(&mut self, payload: &str) -> Option<ConversationPair> {
        let response = payload.trim();
        if response.is_empty() {
            return None;
        }
        let user_input = self.pending_user.take()?;
        if response.chars().count() > MIN_RESPONSE_CHARS {
            Some(ConversationPair {
                user_input: user_input.to_string(),
                ai_response: response.to_string(),
            })
        } else {
            None
        }
    }
}

impl Iterator for Pairs<'_> {
    type Item = ConversationPair;

    fn next(&mut self) -> Option<ConversationPair> {
        while let Some(raw) = self.lines.next() {
            let line = raw.trim();
            if let Some(rest) = line.strip_prefix(USER_PREFIX) {
                // A new turn replaces any unresolved one
                let user = rest.trim();
                self.pending_user = (!user.is_empty()).then_some(user);
            } else if let Some(rest) = line.strip_prefix(RAW_RESPONSE_PREFIX) {
                if let Some(pair) = self.resolve(rest) {
                    return Some(pair);
                }
            } else if let Some(rest) = line.strip_prefix(CLEAN_RESPONSE_PREFIX) {
                if let Some(pair) = self.resolve(rest) {
                    return Some(pair);
                }
            }
        }
        None
    }
}

/// Iterate the pairs of one transcript without collecting them
pub fn pairs(text: &str) -> Pairs<'_> {
    Pairs::new(text)
}

/// Collect every conversation pair of one transcript, in order
pub fn extract_pairs(text: &str) -> Vec<ConversationPair> {
    pairs(text).collect()
}
