//! Guess evaluation: comparing a guess with the secret word.

/// What to do with a submitted guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The guess names the secret word.
    Correct,
    /// Not a match (or no turn is running): echo it as chat.
    Chat,
    /// Whitespace only; drop it.
    Ignored,
}

/// Canonical form used for comparison: trimmed, Unicode lowercase.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whether `guess` names `secret` after normalizing both.
pub fn matches(guess: &str, secret: &str) -> bool {
    normalize(guess) == normalize(secret)
}

/// Classifies a guess. `secret` is `None` outside a running turn, in which
/// case every non-empty guess is chat.
pub fn evaluate(guess: &str, secret: Option<&str>) -> Verdict {
    if guess.trim().is_empty() {
        return Verdict::Ignored;
    }
    match secret {
        Some(secret) if matches(guess, secret) => Verdict::Correct,
        _ => Verdict::Chat,
    }
}
