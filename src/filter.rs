use log::debug;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::lexicon::{Lexicon, SecretId, WordId};
use crate::pattern::{check_realizable, encode_code, Pattern};
use crate::table::PatternTable;
use crate::wordle::Word;

/// The secrets still consistent with every observed pattern, in ascending
/// [`SecretId`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSet {
    secrets: Vec<SecretId>,
}

impl CandidateSet {
    /// Every answerable word.
    pub fn initial(lexicon: &Lexicon) -> Self {
        CandidateSet {
            secrets: (0..lexicon.answerable().len()).collect(),
        }
    }

    pub fn from_secrets(secrets: impl IntoIterator<Item = SecretId>) -> Self {
        let mut secrets: Vec<SecretId> = secrets.into_iter().collect();
        secrets.sort_unstable();
        secrets.dedup();
        CandidateSet { secrets }
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    pub fn contains(&self, secret: SecretId) -> bool {
        self.secrets.binary_search(&secret).is_ok()
    }

    pub fn secrets(&self) -> &[SecretId] {
        &self.secrets
    }

    pub fn iter(&self) -> impl Iterator<Item = SecretId> + '_ {
        self.secrets.iter().copied()
    }

    /// The candidates as [`WordId`]s.
    pub fn word_ids(&self, lexicon: &Lexicon) -> Vec<WordId> {
        self.iter().map(|s| lexicon.answerable()[s]).collect()
    }

    pub fn words(&self, lexicon: &Lexicon) -> Vec<Word> {
        self.iter().map(|s| lexicon.secret_word(s)).collect()
    }
}

/// The guesses played so far and the feedback each one got.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuessHistory {
    turns: Vec<(Word, Pattern)>,
}

impl GuessHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, guess: Word, pattern: Pattern) {
        self.turns.push((guess, pattern));
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&(Word, Pattern)> {
        self.turns.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Word, Pattern)> + '_ {
        self.turns.iter()
    }
}

impl FromIterator<(Word, Pattern)> for GuessHistory {
    fn from_iter<T: IntoIterator<Item = (Word, Pattern)>>(iter: T) -> Self {
        GuessHistory {
            turns: iter.into_iter().collect(),
        }
    }
}

/// Keep the candidates for which `guess` would have produced `observed`.
///
/// Only the new evidence is applied; whatever produced `candidates` is not
/// looked at again. Fails with `InconsistentFeedback` before touching the
/// candidates if no word at all could produce `observed`, and with
/// `EmptyCandidateSet` if no candidate survives.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use entropybot::{narrow, CandidateSet, Lexicon, Pattern, PatternTable, Word};
/// let lexicon = Arc::new(Lexicon::new(["crane"], ["crane", "trace", "slate", "crate"]).unwrap());
/// let table = PatternTable::new(lexicon.clone());
/// let guess = Word::parse("crane").unwrap();
/// let narrowed = narrow(
///     &table,
///     &CandidateSet::initial(&lexicon),
///     &guess,
///     Pattern::parse("gggbg").unwrap(),
/// )
/// .unwrap();
/// assert_eq!(narrowed.words(&lexicon), [Word::parse("crate").unwrap()]);
/// ```
pub fn narrow(
    table: &PatternTable,
    candidates: &CandidateSet,
    guess: &Word,
    observed: Pattern,
) -> Result<CandidateSet> {
    let lexicon = table.lexicon();
    if guess.len() != lexicon.word_len() {
        return Err(Error::LengthMismatch {
            expected: lexicon.word_len(),
            found: guess.len(),
        });
    }
    check_realizable(guess, observed)?;

    let target = observed.code();
    let secrets: Vec<SecretId> = match lexicon.id_of(guess) {
        Some(id) => {
            let row = table.row(id);
            candidates
                .secrets
                .par_iter()
                .copied()
                .filter(|&s| row.code(s) == target)
                .collect()
        }
        None => candidates
            .secrets
            .par_iter()
            .copied()
            .filter(|&s| encode_code(guess.as_bytes(), lexicon.secret_word(s).as_bytes()) == target)
            .collect(),
    };

    debug!(
        "{guess} {observed}: {} -> {} candidates",
        candidates.len(),
        secrets.len()
    );
    if secrets.is_empty() {
        return Err(Error::EmptyCandidateSet);
    }
    Ok(CandidateSet { secrets })
}

/// Recompute the candidates for a whole history, starting from every
/// answerable word.
pub fn filter_from_scratch(table: &PatternTable, history: &GuessHistory) -> Result<CandidateSet> {
    history
        .iter()
        .try_fold(CandidateSet::initial(table.lexicon()), |candidates, (guess, pattern)| {
            narrow(table, &candidates, guess, *pattern)
        })
}
