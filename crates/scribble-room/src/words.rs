//! The word bank: candidate secret words, one drawn per turn.

use rand::Rng;

use crate::RoomError;

/// Everyday nouns that are reasonable to draw in a minute.
const BUILTIN_WORDS: &[&str] = &[
    "apple", "banana", "bicycle", "bridge", "butterfly", "cactus", "camera", "candle", "castle",
    "cat", "chair", "clock", "cloud", "cookie", "crown", "diamond", "dog", "dragon", "drum",
    "elephant", "envelope", "feather", "fish", "flower", "giraffe", "guitar", "hammer", "hat",
    "helicopter", "house", "iceberg", "island", "kangaroo", "key", "kite", "ladder", "lamp",
    "lighthouse", "moon", "mountain", "mushroom", "octopus", "owl", "penguin", "piano", "pizza",
    "rainbow", "robot", "rocket", "sailboat", "scissors", "snail", "snowman", "spider", "star",
    "sun", "sword", "tent", "tornado", "train", "tree", "umbrella", "volcano", "whale", "window",
];

/// An immutable, non-empty list of candidate words.
///
/// Words are stored trimmed and lowercased. Draws are uniform and may
/// repeat, even on consecutive turns.
#[derive(Debug, Clone)]
pub struct WordBank {
    words: Vec<String>,
}

impl WordBank {
    /// Builds a bank from any list of words.
    ///
    /// # Errors
    /// [`RoomError::EmptyWordBank`] if no non-blank word remains after
    /// trimming.
    pub fn new<I, S>(words: I) -> Result<Self, RoomError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            return Err(RoomError::EmptyWordBank);
        }
        Ok(Self { words })
    }

    /// Parses a word list file: one word per line, blank lines and lines
    /// starting with `#` ignored.
    pub fn from_text(text: &str) -> Result<Self, RoomError> {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
        )
    }

    /// Picks a word uniformly at random.
    pub fn draw(&self) -> &str {
        let index = rand::rng().random_range(0..self.words.len());
        &self.words[index]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always `false`: an empty bank can't be constructed.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        self.words.iter().any(|w| *w == word)
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self {
            words: BUILTIN_WORDS.iter().map(|w| (*w).to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_and_drops_blanks() {
        let bank = WordBank::new(["  Cat ", "", "   ", "DOG"]).unwrap();
        assert_eq!(bank.len(), 2);
        assert!(bank.contains("cat"));
        assert!(bank.contains("dog"));
    }

    #[test]
    fn test_new_all_blank_returns_empty_word_bank() {
        let result = WordBank::new(["", "  "]);
        assert!(matches!(result, Err(RoomError::EmptyWordBank)));
    }

    #[test]
    fn test_from_text_skips_comments() {
        let bank = WordBank::from_text("# animals\ncat\n\n  # more\nowl\n").unwrap();
        assert_eq!(bank.len(), 2);
        assert!(!bank.contains("# animals"));
    }

    #[test]
    fn test_draw_single_word_is_deterministic() {
        let bank = WordBank::new(["cat"]).unwrap();
        for _ in 0..10 {
            assert_eq!(bank.draw(), "cat");
        }
    }

    #[test]
    fn test_draw_returns_member_of_bank() {
        let bank = WordBank::default();
        for _ in 0..100 {
            assert!(bank.contains(bank.draw()));
        }
    }

    #[test]
    fn test_default_bank_is_lowercase_and_trimmed() {
        let bank = WordBank::default();
        assert!(!bank.is_empty());
        assert!(bank.words.iter().all(|w| *w == w.trim().to_lowercase()));
    }
}
