use std::sync::{Arc, Mutex, MutexGuard};

use indicatif::ProgressBar;
use log::{debug, info};
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;

use crate::entropy::ScoredGuess;
use crate::error::{Error, Result};
use crate::filter::{narrow, CandidateSet, GuessHistory};
use crate::lexicon::Lexicon;
use crate::pattern::Pattern;
use crate::recommender::{EntropyRecommender, Policy, Recommender};
use crate::table::PatternTable;
use crate::wordle::Word;

type Openings = FxHashMap<(&'static str, Policy), Vec<ScoredGuess>>;

/// Everything that can be shared between games on the same lexicon: the
/// pattern table and the cached opening suggestions.
#[derive(Debug)]
pub struct Solver {
    table: PatternTable,
    openings: Mutex<Openings>,
}

impl Solver {
    pub fn new(lexicon: Lexicon) -> Arc<Self> {
        info!(
            "lexicon: {} guessable, {} answerable, {} letters",
            lexicon.guessable().len(),
            lexicon.answerable().len(),
            lexicon.word_len()
        );
        Arc::new(Solver {
            table: PatternTable::new(Arc::new(lexicon)),
            openings: Mutex::new(FxHashMap::default()),
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        self.table.lexicon()
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// Fill the whole pattern table up front. See
    /// [`PatternTable::precompute_all`].
    pub fn precompute(&self, cancel: Option<&CancellationToken>, progress: Option<ProgressBar>) -> bool {
        self.table.precompute_all(cancel, progress)
    }

    /// Start a game driven by the entropy recommender.
    pub fn new_game(self: &Arc<Self>, policy: Policy) -> Game {
        self.new_game_with(policy, Arc::new(EntropyRecommender::default()))
    }

    pub fn new_game_with(self: &Arc<Self>, policy: Policy, recommender: Arc<dyn Recommender>) -> Game {
        Game {
            candidates: CandidateSet::initial(self.lexicon()),
            solver: Arc::clone(self),
            recommender,
            policy,
            state: GameState::AwaitingFirstGuess,
            history: GuessHistory::new(),
        }
    }

    /// The first suggestions only depend on the lexicon, the recommender and
    /// the policy, so they are computed once.
    fn opening(&self, recommender: &dyn Recommender, policy: &Policy) -> Result<Vec<ScoredGuess>> {
        let key = (recommender.name(), *policy);
        if let Some(cached) = self.lock_openings().get(&key) {
            return Ok(cached.clone());
        }

        let candidates = CandidateSet::initial(self.lexicon());
        let ranking = recommender.recommend(&self.table, &candidates, &GuessHistory::new(), policy)?;
        if ranking.complete {
            self.lock_openings().insert(key, ranking.guesses.clone());
        }
        Ok(ranking.guesses)
    }

    fn lock_openings(&self) -> MutexGuard<'_, Openings> {
        // The map only ever holds finished entries, so a poisoned lock is still usable.
        self.openings.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    AwaitingFirstGuess,
    AwaitingFeedback,
    Won,
    /// Feedback ruled out every answer.
    Exhausted,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        matches!(self, GameState::Won | GameState::Exhausted)
    }
}

/// What a game looks like after a guess has been submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub state: GameState,
    /// Next guesses, best first. Empty once the game is won.
    pub suggestions: Vec<ScoredGuess>,
    pub remaining: usize,
}

/// One game: the feedback so far and the answers it leaves open.
pub struct Game {
    solver: Arc<Solver>,
    recommender: Arc<dyn Recommender>,
    policy: Policy,
    state: GameState,
    history: GuessHistory,
    candidates: CandidateSet,
}

impl Game {
    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn history(&self) -> &GuessHistory {
        &self.history
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    pub fn solver(&self) -> &Arc<Solver> {
        &self.solver
    }

    /// The best next guesses under this game's policy.
    pub fn recommend(&self) -> Result<Vec<ScoredGuess>> {
        match self.state {
            GameState::Won => Err(Error::GameOver),
            GameState::Exhausted => Err(Error::EmptyCandidateSet),
            GameState::AwaitingFirstGuess => {
                self.solver.opening(self.recommender.as_ref(), &self.policy)
            }
            GameState::AwaitingFeedback => Ok(self
                .recommender
                .recommend(
                    self.solver.table(),
                    &self.candidates,
                    &self.history,
                    &self.policy,
                )?
                .guesses),
        }
    }

    /// Record the feedback for a guess without computing new suggestions.
    ///
    /// Impossible feedback is rejected with `InconsistentFeedback` and leaves
    /// the game untouched. Feedback that rules out every answer moves the game
    /// to [`GameState::Exhausted`] and fails with `EmptyCandidateSet`.
    pub fn observe(&mut self, guess: Word, pattern: Pattern) -> Result<GameState> {
        if self.state.is_over() {
            return Err(Error::GameOver);
        }
        let lexicon = self.solver.lexicon();
        if guess.len() != lexicon.word_len() {
            return Err(Error::LengthMismatch {
                expected: lexicon.word_len(),
                found: guess.len(),
            });
        }
        if lexicon.id_of(&guess).is_none() {
            return Err(Error::UnknownWord(guess.as_str().to_string()));
        }

        let candidates = match narrow(self.solver.table(), &self.candidates, &guess, pattern) {
            Ok(candidates) => candidates,
            Err(Error::EmptyCandidateSet) => {
                self.history.push(guess, pattern);
                self.state = GameState::Exhausted;
                return Err(Error::EmptyCandidateSet);
            }
            Err(e) => return Err(e),
        };

        self.history.push(guess, pattern);
        self.candidates = candidates;
        self.state = if pattern.is_win() {
            GameState::Won
        } else {
            GameState::AwaitingFeedback
        };
        debug!(
            "turn {}: {guess} {pattern}, {} candidates left",
            self.history.len(),
            self.candidates.len()
        );
        Ok(self.state)
    }

    /// Record the feedback for a guess and suggest what to play next.
    ///
    /// # Example
    ///
    /// ```
    /// use entropybot::{GameState, Lexicon, Pattern, Policy, Solver, Word};
    /// let lexicon = Lexicon::new(["crane"], ["crane", "trace", "slate", "crate"]).unwrap();
    /// let solver = Solver::new(lexicon);
    /// let mut game = solver.new_game(Policy::default());
    /// let turn = game
    ///     .submit(Word::parse("crane").unwrap(), Pattern::parse("gggbg").unwrap())
    ///     .unwrap();
    /// assert_eq!(turn.state, GameState::AwaitingFeedback);
    /// assert_eq!(turn.suggestions[0].word, Word::parse("crate").unwrap());
    /// assert_eq!(turn.suggestions[0].bits, 0.0);
    /// ```
    pub fn submit(&mut self, guess: Word, pattern: Pattern) -> Result<Turn> {
        let state = self.observe(guess, pattern)?;
        let suggestions = match state {
            GameState::Won => vec![],
            _ => self.recommend()?,
        };
        Ok(Turn {
            state,
            suggestions,
            remaining: self.candidates.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::RankOptions;
    use crate::pattern::encode;
    use crate::recommender::NaiveRecommender;

    fn word(text: &str) -> Word {
        Word::parse(text).unwrap()
    }

    fn solver() -> Arc<Solver> {
        let answers = ["crane", "trace", "slate", "crate", "stare", "roast", "toast"];
        Solver::new(Lexicon::new(answers.iter().chain(&["qajaq"]), answers).unwrap())
    }

    #[test]
    fn winning_ends_the_game() {
        let solver = solver();
        let mut game = solver.new_game(Policy::default());
        assert_eq!(game.state(), GameState::AwaitingFirstGuess);

        let turn = game
            .submit(word("toast"), Pattern::all_correct(5))
            .unwrap();
        assert_eq!(turn.state, GameState::Won);
        assert!(turn.suggestions.is_empty());
        assert_eq!(turn.remaining, 1);
        assert_eq!(game.recommend(), Err(Error::GameOver));
        assert_eq!(
            game.submit(word("toast"), Pattern::all_correct(5)),
            Err(Error::GameOver)
        );
    }

    #[test]
    fn contradicting_feedback_exhausts_the_game() {
        let solver = solver();
        let mut game = solver.new_game(Policy::default());
        let err = game.submit(word("qajaq"), Pattern::parse("bbbbb").unwrap());
        assert_eq!(err, Err(Error::EmptyCandidateSet));
        assert_eq!(game.state(), GameState::Exhausted);
        assert_eq!(game.recommend(), Err(Error::EmptyCandidateSet));
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn impossible_feedback_leaves_the_game_untouched() {
        let solver = solver();
        let mut game = solver.new_game(Policy::default());
        let err = game.submit(word("crane"), Pattern::parse("ggggy").unwrap());
        assert!(matches!(err, Err(Error::InconsistentFeedback { .. })));
        assert_eq!(game.state(), GameState::AwaitingFirstGuess);
        assert!(game.history().is_empty());
        assert_eq!(game.candidates().len(), 7);
    }

    #[test]
    fn unknown_and_malformed_guesses_are_rejected() {
        let solver = solver();
        let mut game = solver.new_game(Policy::default());
        assert_eq!(
            game.observe(word("zebra"), Pattern::parse("bbbbb").unwrap()),
            Err(Error::UnknownWord("zebra".to_string()))
        );
        assert!(matches!(
            game.observe(word("cranes"), Pattern::parse("bbbbbb").unwrap()),
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[test]
    fn hard_mode_suggests_only_candidates() {
        let solver = solver();
        let mut game = solver.new_game(Policy::hard().with_suggestions(10));
        let secret = word("toast");
        let turn = game
            .submit(word("crane"), encode(&word("crane"), &secret).unwrap())
            .unwrap();
        assert!(turn.suggestions.iter().all(|g| g.is_candidate));
        assert_eq!(turn.suggestions.len(), turn.remaining);
    }

    #[test]
    fn openings_are_cached_per_policy_and_recommender() {
        let solver = solver();
        let first = solver.new_game(Policy::default()).recommend().unwrap();
        let again = solver.new_game(Policy::default()).recommend().unwrap();
        assert_eq!(first, again);

        let naive = solver
            .new_game_with(Policy::default(), Arc::new(NaiveRecommender))
            .recommend()
            .unwrap();
        assert_eq!(naive[0].word, word("crane"));
        assert_eq!(solver.lock_openings().len(), 2);
    }

    #[test]
    fn cancelled_recommendations_still_suggest_but_are_not_cached() {
        let solver = solver();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let rushed = EntropyRecommender::new(RankOptions {
            cancel: Some(cancel),
            ..Default::default()
        });
        let game = solver.new_game_with(Policy::default(), Arc::new(rushed));
        let suggestions = game.recommend().unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(game.candidates().len(), 7);
        assert!(solver.lock_openings().is_empty());
    }
}
