//! Token estimation for assembled prompts.
//!
//! Heuristic: 1 token ≈ 4 characters, rounded up per message.

use contextforge_core::{ContextMessage, estimate_tokens};

/// Estimate the token count of one message.
pub fn estimate_message_tokens(message: &ContextMessage) -> u64 {
    estimate_tokens(&message.content)
}

/// Estimate tokens for a slice of messages.
///
/// Each message is rounded up on its own, so the sum can exceed the
/// estimate of the concatenated text.
pub fn estimate_messages_tokens(messages: &[ContextMessage]) -> u64 {
    messages.iter().map(estimate_message_tokens).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixteen_chars_is_four_tokens() {
        let msgs = vec![ContextMessage::user("1234567890123456")];
        assert_eq!(estimate_messages_tokens(&msgs), 4);
    }

    #[test]
    fn five_chars_rounds_up() {
        let msgs = vec![ContextMessage::user("12345")];
        assert_eq!(estimate_messages_tokens(&msgs), 2);
    }

    #[test]
    fn rounding_is_per_message() {
        let msgs = vec![ContextMessage::system("a"), ContextMessage::user("b")];
        assert_eq!(estimate_messages_tokens(&msgs), 2);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(estimate_messages_tokens(&[]), 0);
        assert_eq!(estimate_message_tokens(&ContextMessage::user("")), 0);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 4 characters, 8 bytes
        assert_eq!(estimate_message_tokens(&ContextMessage::user("éééé")), 1);
    }
}
