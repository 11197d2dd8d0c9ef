//! Entropy-based next-guess recommendations for Wordle-style games.
//!
//! A [`Lexicon`] holds the words that may be guessed and the words that may
//! be the secret. A [`Solver`] wraps it with a lazily filled
//! [`PatternTable`] and hands out [`Game`]s, which narrow the candidate
//! answers as feedback comes in and rank the next guesses by expected
//! information gain.
//!
//! ```
//! use entropybot::{Lexicon, Pattern, Policy, Solver, Word};
//! let answers = ["crane", "trace", "slate", "crate"];
//! let solver = Solver::new(Lexicon::new(answers, answers).unwrap());
//! let mut game = solver.new_game(Policy::default());
//! let first = game.recommend().unwrap();
//! assert_eq!(first.len(), 1);
//! let turn = game
//!     .submit(Word::parse("slate").unwrap(), Pattern::parse("bbgyg").unwrap())
//!     .unwrap();
//! assert!(turn.remaining < answers.len());
//! ```

mod entropy;
mod error;
mod filter;
mod game;
mod lexicon;
mod pattern;
mod recommender;
pub mod simulate;
mod table;
mod wordle;

pub use entropy::{evaluate, rank_all, ranking_order, score, RankOptions, Ranking, ScoredGuess};
pub use error::{Error, Result};
pub use filter::{filter_from_scratch, narrow, CandidateSet, GuessHistory};
pub use game::{Game, GameState, Solver, Turn};
pub use lexicon::{Lexicon, SecretId, WordId};
pub use pattern::{
    check_realizable, decode_status, encode, encode_status, num_patterns, paint, Pattern,
};
pub use recommender::{EntropyRecommender, Mode, NaiveRecommender, Policy, Recommender};
pub use table::{PatternTable, Row};
pub use wordle::{LetterStatus, Word, MAX_WORD_LEN};
