//! Expected information gain of guesses against the current candidates.

use std::cmp::Ordering;
use std::sync::atomic::{self, AtomicBool};
use std::time::Instant;

use log::{debug, warn};
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::filter::CandidateSet;
use crate::lexicon::WordId;
use crate::pattern::{encode_code, num_patterns};
use crate::table::PatternTable;
use crate::wordle::Word;

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredGuess {
    pub word: Word,
    /// Shannon entropy of the pattern distribution, in bits.
    pub bits: f64,
    /// Whether the guess could itself be the secret.
    pub is_candidate: bool,
    /// Number of distinct patterns the guess can produce.
    pub groups: usize,
    pub largest_group: usize,
    /// Candidates expected to remain after playing the guess.
    pub expected_remaining: f64,
}

/// Knobs for [`rank_all`]. The default scores every guess and keeps them all.
#[derive(Debug, Clone, Default)]
pub struct RankOptions {
    /// Keep only the best `limit` guesses.
    pub limit: Option<usize>,
    pub cancel: Option<CancellationToken>,
    pub deadline: Option<Instant>,
    /// Stop scoring once some guess reaches this many bits.
    pub good_enough: Option<f64>,
}

impl RankOptions {
    pub fn with_limit(limit: usize) -> Self {
        RankOptions {
            limit: Some(limit),
            ..Default::default()
        }
    }

    fn interrupted(&self) -> bool {
        self.cancel.as_ref().map_or(false, |c| c.is_cancelled())
            || self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// Whether a ranking made with these options can be reproduced.
    pub fn is_exhaustive(&self) -> bool {
        self.cancel.is_none() && self.deadline.is_none() && self.good_enough.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub guesses: Vec<ScoredGuess>,
    /// False if scoring was abandoned before every allowed guess was seen.
    pub complete: bool,
}

struct Groups {
    bits: f64,
    groups: usize,
    largest: usize,
    expected_remaining: f64,
}

/// Reusable buffers for counting patterns, one per worker.
struct Scratch {
    counts: Vec<u32>,
    touched: Vec<u16>,
    sizes: Vec<u32>,
}

impl Scratch {
    fn new(word_len: usize) -> Self {
        Scratch {
            counts: vec![0; num_patterns(word_len)],
            touched: vec![],
            sizes: vec![],
        }
    }

    fn groups(&mut self, codes: impl Iterator<Item = u16>) -> Groups {
        for code in codes {
            let count = &mut self.counts[code as usize];
            if *count == 0 {
                self.touched.push(code);
            }
            *count += 1;
        }

        self.sizes.clear();
        for code in self.touched.drain(..) {
            self.sizes.push(std::mem::take(&mut self.counts[code as usize]));
        }
        // Summing in size order makes equal distributions score identically.
        self.sizes.sort_unstable();

        let n: u32 = self.sizes.iter().sum();
        let n = n as f64;
        let bits = self
            .sizes
            .iter()
            .map(|&size| {
                let size = size as f64;
                size / n * (n / size).log2()
            })
            .sum();
        let expected_remaining = self
            .sizes
            .iter()
            .map(|&size| (size as f64).powi(2))
            .sum::<f64>()
            / n;

        Groups {
            bits,
            groups: self.sizes.len(),
            largest: self.sizes.last().copied().unwrap_or(0) as usize,
            expected_remaining,
        }
    }
}

/// Entropy in bits of the patterns `guess` produces against `candidates`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use entropybot::{score, CandidateSet, Lexicon, PatternTable, Word};
/// let lexicon = Arc::new(Lexicon::new(["crane"], ["crane", "trace", "slate", "crate"]).unwrap());
/// let table = PatternTable::new(lexicon.clone());
/// let bits = score(&table, &CandidateSet::initial(&lexicon), &Word::parse("crane").unwrap()).unwrap();
/// assert_eq!(bits, 2.0);
/// ```
pub fn score(table: &PatternTable, candidates: &CandidateSet, guess: &Word) -> Result<f64> {
    Ok(evaluate(table, candidates, guess)?.bits)
}

/// Score one guess with all of its group statistics.
pub fn evaluate(table: &PatternTable, candidates: &CandidateSet, guess: &Word) -> Result<ScoredGuess> {
    let lexicon = table.lexicon();
    if guess.len() != lexicon.word_len() {
        return Err(Error::LengthMismatch {
            expected: lexicon.word_len(),
            found: guess.len(),
        });
    }
    if candidates.is_empty() {
        return Err(Error::EmptyCandidateSet);
    }

    let mut scratch = Scratch::new(lexicon.word_len());
    match lexicon.id_of(guess) {
        Some(id) => Ok(score_id(table, candidates, id, &mut scratch)),
        None => {
            let groups = scratch.groups(
                candidates
                    .iter()
                    .map(|s| encode_code(guess.as_bytes(), lexicon.secret_word(s).as_bytes())),
            );
            Ok(scored(*guess, false, groups))
        }
    }
}

fn score_id(
    table: &PatternTable,
    candidates: &CandidateSet,
    guess: WordId,
    scratch: &mut Scratch,
) -> ScoredGuess {
    let lexicon = table.lexicon();
    let row = table.row(guess);
    let groups = scratch.groups(candidates.iter().map(|s| row.code(s)));
    let is_candidate = lexicon
        .secret_id(guess)
        .map_or(false, |s| candidates.contains(s));
    scored(lexicon.word(guess), is_candidate, groups)
}

fn scored(word: Word, is_candidate: bool, groups: Groups) -> ScoredGuess {
    ScoredGuess {
        word,
        bits: groups.bits,
        is_candidate,
        groups: groups.groups,
        largest_group: groups.largest,
        expected_remaining: groups.expected_remaining,
    }
}

/// Best first: more bits, then guesses that could be the answer, then
/// alphabetical.
pub fn ranking_order(a: &ScoredGuess, b: &ScoredGuess) -> Ordering {
    b.bits
        .total_cmp(&a.bits)
        .then_with(|| b.is_candidate.cmp(&a.is_candidate))
        .then_with(|| a.word.cmp(&b.word))
}

/// Score every allowed guess against `candidates` in parallel and sort them
/// with [`ranking_order`].
///
/// Cancellation, the deadline and the good-enough threshold only cut the
/// scan short; the guesses scored so far are still ranked and returned. The
/// first allowed guess is always scored, so an abandoned scan still has a
/// best guess to offer.
pub fn rank_all(
    table: &PatternTable,
    candidates: &CandidateSet,
    allowed: &[WordId],
    options: &RankOptions,
) -> Result<Ranking> {
    if candidates.is_empty() {
        return Err(Error::EmptyCandidateSet);
    }

    let word_len = table.lexicon().word_len();
    let stop = AtomicBool::new(false);
    let mut guesses: Vec<ScoredGuess> = allowed
        .par_iter()
        .enumerate()
        .map_init(
            || Scratch::new(word_len),
            |scratch, (i, &guess)| {
                if i > 0 && (stop.load(atomic::Ordering::Relaxed) || options.interrupted()) {
                    stop.store(true, atomic::Ordering::Relaxed);
                    return None;
                }
                let scored = score_id(table, candidates, guess, scratch);
                if options.good_enough.map_or(false, |t| scored.bits >= t) {
                    stop.store(true, atomic::Ordering::Relaxed);
                }
                Some(scored)
            },
        )
        .flatten()
        .collect();

    let complete = guesses.len() == allowed.len();
    if !complete {
        warn!(
            "ranking abandoned after {}/{} guesses",
            guesses.len(),
            allowed.len()
        );
    }

    guesses.sort_by(ranking_order);
    if let Some(limit) = options.limit {
        guesses.truncate(limit);
    }
    if let Some(best) = guesses.first() {
        debug!(
            "best of {} guesses against {} candidates: {} ({:.3} bits)",
            allowed.len(),
            candidates.len(),
            best.word,
            best.bits
        );
    }

    Ok(Ranking { guesses, complete })
}
