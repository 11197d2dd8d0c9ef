use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Longest word the pattern encoding supports: 3^10 codes still fit a `u16`.
pub const MAX_WORD_LEN: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LetterStatus {
    Absent = 0,
    Present = 1,
    Correct = 2,
}

impl LetterStatus {
    pub(crate) fn from_digit(digit: u16) -> LetterStatus {
        match digit {
            0 => LetterStatus::Absent,
            1 => LetterStatus::Present,
            _ => LetterStatus::Correct,
        }
    }
}

/// A lowercase ascii word of at most [`MAX_WORD_LEN`] letters.
///
/// Words are `Copy` and ordered lexicographically, which is the last
/// tie-break when ranking guesses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Word {
    chars: [u8; MAX_WORD_LEN],
    len: u8,
}

impl Word {
    /// Parse a word, normalising it to lowercase.
    ///
    /// # Example
    ///
    /// ```
    /// use entropybot::Word;
    /// let word = Word::parse("Crane").unwrap();
    /// assert_eq!(word.len(), 5);
    /// assert_eq!(word.to_string(), "CRANE");
    /// assert!(Word::parse("cr4ne").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Word> {
        let text = text.trim();
        if text.is_empty() || text.len() > MAX_WORD_LEN {
            return Err(Error::InvalidWord(text.to_string()));
        }

        let mut chars = [0u8; MAX_WORD_LEN];
        for (slot, byte) in chars.iter_mut().zip(text.bytes()) {
            if !byte.is_ascii_alphabetic() {
                return Err(Error::InvalidWord(text.to_string()));
            }
            *slot = byte.to_ascii_lowercase();
        }

        Ok(Word {
            chars,
            len: text.len() as u8,
        })
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.chars[..self.len()]
    }

    pub fn as_str(&self) -> &str {
        // Only ascii letters are ever stored.
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    /// Counts the occurrences of a letter in the word
    ///
    /// # Example
    ///
    /// ```
    /// use entropybot::Word;
    ///
    /// let word = Word::parse("goose").unwrap();
    /// assert_eq!(word.count_char(b'g'), 1);
    /// assert_eq!(word.count_char(b't'), 0);
    /// assert_eq!(word.count_char(b'o'), 2);
    /// ```
    pub fn count_char(&self, letter: u8) -> usize {
        self.as_bytes().iter().filter(|&&c| c == letter).count()
    }

    pub fn has_letter_at_position(&self, letter: u8, position: usize) -> bool {
        self.as_bytes().get(position) == Some(&letter)
    }
}

impl FromStr for Word {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Word::parse(s)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &c in self.as_bytes() {
            write!(f, "{}", c.to_ascii_uppercase() as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:?})", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Word {
        Word::parse(text).unwrap()
    }

    #[test]
    fn parse_normalises_case() {
        assert_eq!(word("SLATE"), word("slate"));
        assert_eq!(word(" slate\n").as_str(), "slate");
    }

    #[test]
    fn parse_rejects_bad_words() {
        assert_eq!(Word::parse(""), Err(Error::InvalidWord(String::new())));
        assert!(Word::parse("sl8te").is_err());
        assert!(Word::parse("zzzzzzzzzzz").is_err());
        assert!(Word::parse("héllo").is_err());
    }

    #[test]
    fn has_letter_at_position() {
        let word = word("slate");
        assert!(word.has_letter_at_position(b'l', 1));
        assert!(!word.has_letter_at_position(b'l', 2));
        assert!(!word.has_letter_at_position(b'l', 7));
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(word("crane") < word("crate"));
        assert!(word("ab") < word("abc"));
        assert!(word("b") > word("abc"));
    }
}
