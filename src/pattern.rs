//! Feedback patterns and the encoder that produces them.
//!
//! A pattern is stored as one base-3 number: position `i` contributes
//! `3^i * status` with `Absent = 0`, `Present = 1` and `Correct = 2`.

use std::fmt;
use std::str::FromStr;

use colored::Colorize;

use crate::error::{Error, Result};
use crate::wordle::{LetterStatus, Word, MAX_WORD_LEN};

/// Number of distinct patterns for words of `len` letters.
pub const fn num_patterns(len: usize) -> usize {
    3usize.pow(len as u32)
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Pattern {
    code: u16,
    len: u8,
}

impl Pattern {
    /// Build a pattern from per-position statuses.
    ///
    /// # Example
    ///
    /// ```
    /// use entropybot::{LetterStatus::*, Pattern};
    /// let pattern = Pattern::from_statuses(&[Present, Absent, Present, Absent, Absent]).unwrap();
    /// assert_eq!(pattern.code(), 10);
    /// ```
    pub fn from_statuses(statuses: &[LetterStatus]) -> Result<Pattern> {
        if statuses.is_empty() || statuses.len() > MAX_WORD_LEN {
            let text: String = statuses.iter().map(|&s| symbol(s)).collect();
            return Err(Error::InvalidPattern(text));
        }
        Ok(Pattern::from_code(encode_status(statuses), statuses.len()))
    }

    pub(crate) fn from_code(code: u16, len: usize) -> Pattern {
        Pattern {
            code,
            len: len as u8,
        }
    }

    pub fn all_correct(len: usize) -> Pattern {
        let code = (num_patterns(len) - 1) as u16;
        Pattern::from_code(code, len)
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn statuses(&self) -> Vec<LetterStatus> {
        decode_status(self.code, self.len())
    }

    pub fn status(&self, position: usize) -> LetterStatus {
        LetterStatus::from_digit(self.code / 3u16.pow(position as u32) % 3)
    }

    pub fn count(&self, status: LetterStatus) -> usize {
        (0..self.len()).filter(|&i| self.status(i) == status).count()
    }

    pub fn is_win(&self) -> bool {
        *self == Pattern::all_correct(self.len())
    }

    /// Parse a pattern like `"gybbb"` or `"21000"`.
    ///
    /// # Example
    ///
    /// ```
    /// use entropybot::{LetterStatus::*, Pattern};
    /// let pattern = Pattern::parse("gy.bb").unwrap();
    /// assert_eq!(pattern.statuses(), vec![Correct, Present, Absent, Absent, Absent]);
    /// assert_eq!(pattern.to_string(), "gybbb");
    /// ```
    pub fn parse(text: &str) -> Result<Pattern> {
        let statuses = text
            .trim()
            .chars()
            .map(|c| match c.to_ascii_lowercase() {
                'g' | '2' => Ok(LetterStatus::Correct),
                'y' | '1' => Ok(LetterStatus::Present),
                'b' | 'x' | '.' | '0' => Ok(LetterStatus::Absent),
                _ => Err(Error::InvalidPattern(text.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;
        Pattern::from_statuses(&statuses).map_err(|_| Error::InvalidPattern(text.to_string()))
    }
}

impl FromStr for Pattern {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Pattern::parse(s)
    }
}

fn symbol(status: LetterStatus) -> char {
    match status {
        LetterStatus::Absent => 'b',
        LetterStatus::Present => 'y',
        LetterStatus::Correct => 'g',
    }
}

/// Plain `g`/`y`/`b` text, the same form [`Pattern::parse`] reads. Use
/// [`paint`] for coloured tiles.
impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for status in self.statuses() {
            write!(f, "{}", symbol(status))?;
        }
        Ok(())
    }
}

pub fn encode_status(status: &[LetterStatus]) -> u16 {
    status
        .iter()
        .enumerate()
        .map(|(i, x)| 3_u16.pow(i as u32) * *x as u16)
        .sum()
}

pub fn decode_status(encoded: u16, len: usize) -> Vec<LetterStatus> {
    (0..len)
        .map(|i| LetterStatus::from_digit(encoded / 3_u16.pow(i as u32) % 3))
        .collect()
}

/// Compare a guess against a secret.
///
/// Exact matches are marked first and consume their secret letters; the
/// remaining guess letters then consume the leftover secret letters from
/// left to right.
///
/// # Example
///
/// ```
/// use entropybot::{encode, LetterStatus::*, Word};
/// let secret = Word::parse("tarse").unwrap();
/// let guess = Word::parse("slate").unwrap();
/// let expected = [Present, Absent, Present, Present, Correct];
/// assert_eq!(encode(&guess, &secret).unwrap().statuses(), expected);
/// ```
pub fn encode(guess: &Word, secret: &Word) -> Result<Pattern> {
    if guess.len() != secret.len() {
        return Err(Error::LengthMismatch {
            expected: secret.len(),
            found: guess.len(),
        });
    }
    Ok(Pattern::from_code(
        encode_code(guess.as_bytes(), secret.as_bytes()),
        guess.len(),
    ))
}

/// Hot-path encoder on raw letters. Both slices have the same length.
pub(crate) fn encode_code(guess: &[u8], secret: &[u8]) -> u16 {
    let mut result = [LetterStatus::Absent; MAX_WORD_LEN];
    let mut unconsumed = [0u8; 26];

    // Find all correct letters
    for (i, (g, s)) in guess.iter().zip(secret).enumerate() {
        if g == s {
            result[i] = LetterStatus::Correct;
        } else {
            unconsumed[(s - b'a') as usize] += 1;
        }
    }

    for (i, g) in guess.iter().enumerate() {
        if result[i] == LetterStatus::Correct {
            continue;
        }
        let left = &mut unconsumed[(g - b'a') as usize];
        if *left > 0 {
            result[i] = LetterStatus::Present;
            *left -= 1;
        }
    }

    encode_status(&result[..guess.len()])
}

/// Check that some secret word could produce `pattern` for `guess`.
///
/// Two things make a pattern impossible: a letter marked absent before the
/// same letter is marked present (presence is handed out left to right), or
/// present letters that cannot each be placed on a distinct non-correct
/// position holding a different guess letter.
///
/// # Example
///
/// ```
/// use entropybot::{check_realizable, Pattern, Word};
/// let guess = Word::parse("speed").unwrap();
/// assert!(check_realizable(&guess, Pattern::parse("bbyyb").unwrap()).is_ok());
/// assert!(check_realizable(&guess, Pattern::parse("bbbyb").unwrap()).is_err());
/// ```
pub fn check_realizable(guess: &Word, pattern: Pattern) -> Result<()> {
    let inconsistent = |reason: String| Error::InconsistentFeedback {
        guess: guess.to_string(),
        pattern: pattern.to_string(),
        reason,
    };

    if pattern.len() != guess.len() {
        return Err(inconsistent(format!(
            "{} symbols for a {}-letter guess",
            pattern.len(),
            guess.len()
        )));
    }

    let letters = guess.as_bytes();
    let statuses = pattern.statuses();
    let open: Vec<usize> = (0..letters.len())
        .filter(|&i| statuses[i] != LetterStatus::Correct)
        .collect();

    for (n, &i) in open.iter().enumerate() {
        if statuses[i] != LetterStatus::Absent {
            continue;
        }
        if let Some(&j) = open[n + 1..]
            .iter()
            .find(|&&j| letters[j] == letters[i] && statuses[j] == LetterStatus::Present)
        {
            return Err(inconsistent(format!(
                "{} is absent at position {} but present at position {}",
                letters[i].to_ascii_uppercase() as char,
                i + 1,
                j + 1
            )));
        }
    }

    let present: Vec<u8> = open
        .iter()
        .filter(|&&i| statuses[i] == LetterStatus::Present)
        .map(|&i| letters[i])
        .collect();
    let mut owner: Vec<Option<usize>> = vec![None; open.len()];
    for p in 0..present.len() {
        let mut seen = vec![false; open.len()];
        if !assign(p, &present, &open, letters, &mut owner, &mut seen) {
            return Err(inconsistent(format!(
                "no room left in the word for a misplaced {}",
                present[p].to_ascii_uppercase() as char
            )));
        }
    }

    Ok(())
}

/// Augmenting-path step of a bipartite matching between present letters and
/// the open positions that could hold them.
fn assign(
    p: usize,
    present: &[u8],
    open: &[usize],
    letters: &[u8],
    owner: &mut [Option<usize>],
    seen: &mut [bool],
) -> bool {
    for (slot, &position) in open.iter().enumerate() {
        if seen[slot] || letters[position] == present[p] {
            continue;
        }
        seen[slot] = true;
        let free = match owner[slot] {
            None => true,
            Some(other) => assign(other, present, open, letters, owner, seen),
        };
        if free {
            owner[slot] = Some(p);
            return true;
        }
    }
    false
}

/// Render a guess with its feedback as coloured tiles.
pub fn paint(guess: &Word, pattern: Pattern) -> String {
    guess
        .as_bytes()
        .iter()
        .zip(pattern.statuses())
        .map(|(&c, status)| {
            let tile = format!(" {} ", c.to_ascii_uppercase() as char);
            match status {
                LetterStatus::Absent => tile.on_black().to_string(),
                LetterStatus::Present => tile.black().on_yellow().to_string(),
                LetterStatus::Correct => tile.black().on_green().bold().to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use LetterStatus::*;

    fn word(text: &str) -> Word {
        Word::parse(text).unwrap()
    }

    fn compare(secret: &str, guess: &str) -> Vec<LetterStatus> {
        encode(&word(guess), &word(secret)).unwrap().statuses()
    }

    #[test]
    fn test_encode_status() {
        assert_eq!(encode_status(&[Absent, Absent, Absent, Absent, Absent]), 0);
        assert_eq!(encode_status(&[Present, Absent, Absent, Absent, Absent]), 1);
        assert_eq!(
            encode_status(&[Present, Absent, Present, Absent, Absent]),
            10
        );
        assert_eq!(
            encode_status(&[Correct, Correct, Correct, Correct, Correct]),
            242
        );
        assert_eq!(
            encode_status(&[Correct, Correct, Present, Correct, Correct]),
            233
        );
    }

    #[test]
    fn test_decode_status() {
        assert_eq!(decode_status(0, 5), [Absent, Absent, Absent, Absent, Absent]);
        assert_eq!(
            decode_status(10, 5),
            [Present, Absent, Present, Absent, Absent]
        );
        assert_eq!(
            decode_status(233, 5),
            [Correct, Correct, Present, Correct, Correct]
        );
        assert_eq!(Pattern::all_correct(5).code(), 242);
    }

    #[test]
    fn compare_words() {
        assert_eq!(
            compare("water", "slate"),
            [Absent, Absent, Present, Present, Present]
        );
        assert_eq!(
            compare("water", "eerie"),
            [Present, Absent, Present, Absent, Absent]
        );
        assert_eq!(
            compare("water", "eater"),
            [Absent, Correct, Correct, Correct, Correct]
        );
        assert_eq!(
            compare("abide", "speed"),
            [Absent, Absent, Present, Absent, Present]
        );
        assert_eq!(
            compare("erase", "speed"),
            [Present, Absent, Present, Present, Absent]
        );
        assert_eq!(
            compare("steal", "speed"),
            [Correct, Absent, Correct, Absent, Absent]
        );
        assert_eq!(
            compare("crepe", "speed"),
            [Absent, Present, Correct, Present, Absent]
        );
    }

    #[test]
    fn compare_words_2() {
        assert_eq!(
            compare("steer", "slate"),
            [Correct, Absent, Absent, Present, Present]
        );
        assert_eq!(
            compare("steer", "deers"),
            [Absent, Present, Correct, Present, Present]
        );
    }

    #[test]
    fn crane_against_crate() {
        assert_eq!(
            compare("crate", "crane"),
            [Correct, Correct, Correct, Absent, Correct]
        );
    }

    #[test]
    fn length_mismatch_is_an_error() {
        assert_eq!(
            encode(&word("cranes"), &word("crate")),
            Err(Error::LengthMismatch {
                expected: 5,
                found: 6
            })
        );
    }

    #[test]
    fn repeated_letters_never_exceed_secret_multiplicity() {
        let words = ["geese", "eerie", "sassy", "llama", "added", "abbey", "steer"];
        for guess in words {
            for secret in words {
                let (g, s) = (word(guess), word(secret));
                let pattern = encode(&g, &s).unwrap();
                if guess == secret {
                    assert!(pattern.is_win());
                }
                let exact = (0..5).filter(|&i| g.as_bytes()[i] == s.as_bytes()[i]).count();
                assert_eq!(pattern.count(Correct), exact);
                for &letter in g.as_bytes() {
                    let hits = (0..5)
                        .filter(|&i| g.as_bytes()[i] == letter && pattern.status(i) != Absent)
                        .count();
                    assert!(hits <= s.count_char(letter), "{guess} vs {secret}");
                }
            }
        }
    }

    #[test]
    fn every_encoded_pattern_is_realizable() {
        let words = ["geese", "eerie", "sassy", "llama", "crane", "speed"];
        for guess in words {
            for secret in words {
                let pattern = encode(&word(guess), &word(secret)).unwrap();
                assert!(check_realizable(&word(guess), pattern).is_ok());
            }
        }
    }

    #[test]
    fn absent_before_present_is_unrealizable() {
        let err = check_realizable(&word("eerie"), Pattern::parse("bybbb").unwrap());
        assert!(matches!(err, Err(Error::InconsistentFeedback { .. })));
    }

    #[test]
    fn misplaced_letter_without_room_is_unrealizable() {
        // Four greens leave only the yellow's own position open.
        let err = check_realizable(&word("crane"), Pattern::parse("ggggy").unwrap());
        assert!(matches!(err, Err(Error::InconsistentFeedback { .. })));

        // Both open positions hold an E, so a misplaced E has nowhere to go.
        let err = check_realizable(&word("geese"), Pattern::parse("gyggb").unwrap());
        assert!(matches!(err, Err(Error::InconsistentFeedback { .. })));
    }

    #[test]
    fn pattern_length_must_match_guess() {
        let err = check_realizable(&word("crane"), Pattern::parse("gggg").unwrap());
        assert!(matches!(err, Err(Error::InconsistentFeedback { .. })));
    }

    #[test]
    fn parse_rejects_unknown_symbols() {
        assert_eq!(
            Pattern::parse("gyqbb"),
            Err(Error::InvalidPattern("gyqbb".to_string()))
        );
        assert!(Pattern::parse("").is_err());
    }

    #[test]
    fn statuses_outside_word_lengths_are_invalid_patterns() {
        assert_eq!(
            Pattern::from_statuses(&[]),
            Err(Error::InvalidPattern(String::new()))
        );
        assert_eq!(
            Pattern::from_statuses(&[Correct; 11]),
            Err(Error::InvalidPattern("ggggggggggg".to_string()))
        );
        assert!(Pattern::from_statuses(&[Correct; 10]).is_ok());
    }

    #[test]
    fn display_is_plain_text_and_paint_is_coloured() {
        let pattern = Pattern::from_statuses(&[Correct, Present, Absent]).unwrap();
        assert_eq!(pattern.to_string(), "gyb");
        assert_eq!(Pattern::parse(&pattern.to_string()), Ok(pattern));

        let tiles = paint(&word("cab"), pattern);
        for tile in [" C ", " A ", " B "] {
            assert!(tiles.contains(tile), "{tiles:?}");
        }
    }
}
