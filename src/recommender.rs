use crate::entropy::{evaluate, rank_all, RankOptions, Ranking};
use crate::error::{Error, Result};
use crate::filter::{CandidateSet, GuessHistory};
use crate::lexicon::{Lexicon, WordId};
use crate::table::PatternTable;

/// Which words may be suggested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Only words that could still be the secret.
    Hard,
    /// Any guessable word, plus the remaining candidates.
    #[default]
    Soft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Policy {
    pub mode: Mode,
    pub max_suggestions: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            mode: Mode::Soft,
            max_suggestions: 1,
        }
    }
}

impl Policy {
    pub fn hard() -> Self {
        Policy {
            mode: Mode::Hard,
            ..Default::default()
        }
    }

    pub fn with_suggestions(self, max_suggestions: usize) -> Self {
        Policy {
            max_suggestions,
            ..self
        }
    }

    /// The words this policy lets us suggest, without duplicates.
    pub fn allowed_guesses(&self, lexicon: &Lexicon, candidates: &CandidateSet) -> Vec<WordId> {
        let mut allowed = candidates.word_ids(lexicon);
        if self.mode == Mode::Soft {
            allowed.extend_from_slice(lexicon.guessable());
            allowed.sort_unstable();
            allowed.dedup();
        }
        allowed
    }
}

/// Anything that can pick the next guesses for a game.
///
/// The entropy engine and the naive baseline both implement this, so they
/// can be swapped or compared without the game knowing which one it has.
pub trait Recommender: Send + Sync {
    /// Short name, also used to key cached openings.
    fn name(&self) -> &'static str;

    fn recommend(
        &self,
        table: &PatternTable,
        candidates: &CandidateSet,
        history: &GuessHistory,
        policy: &Policy,
    ) -> Result<Ranking>;
}

/// Picks the guesses with the highest expected information gain.
#[derive(Debug, Clone, Default)]
pub struct EntropyRecommender {
    pub options: RankOptions,
}

impl EntropyRecommender {
    pub fn new(options: RankOptions) -> Self {
        EntropyRecommender { options }
    }
}

impl Recommender for EntropyRecommender {
    fn name(&self) -> &'static str {
        "entropy"
    }

    fn recommend(
        &self,
        table: &PatternTable,
        candidates: &CandidateSet,
        _history: &GuessHistory,
        policy: &Policy,
    ) -> Result<Ranking> {
        let allowed = policy.allowed_guesses(table.lexicon(), candidates);
        let options = RankOptions {
            limit: Some(policy.max_suggestions.max(1)),
            ..self.options.clone()
        };
        let mut ranking = rank_all(table, candidates, &allowed, &options)?;
        ranking.complete &= self.options.is_exhaustive();
        Ok(ranking)
    }
}

/// Baseline: suggest the first remaining candidates in list order.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveRecommender;

impl Recommender for NaiveRecommender {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn recommend(
        &self,
        table: &PatternTable,
        candidates: &CandidateSet,
        _history: &GuessHistory,
        policy: &Policy,
    ) -> Result<Ranking> {
        let lexicon = table.lexicon();
        let guesses = candidates
            .iter()
            .take(policy.max_suggestions.max(1))
            .map(|s| evaluate(table, candidates, &lexicon.secret_word(s)))
            .collect::<Result<Vec<_>>>()?;
        if guesses.is_empty() {
            return Err(Error::EmptyCandidateSet);
        }
        Ok(Ranking {
            guesses,
            complete: true,
        })
    }
}
