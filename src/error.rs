use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything the recommendation core can refuse to do.
///
/// `EmptyCandidateSet` ends a game. `InconsistentFeedback` leaves it as it
/// was so the caller can correct the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("expected a word of {expected} letters, got {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("invalid lexicon: {0}")]
    InvalidLexicon(String),

    #[error("{0:?} is not a word of lowercase ascii letters")]
    InvalidWord(String),

    #[error("{0:?} is not a feedback pattern (use g/y/b or 2/1/0 per letter)")]
    InvalidPattern(String),

    #[error("{0:?} is not in the lexicon")]
    UnknownWord(String),

    #[error("no possible words remain")]
    EmptyCandidateSet,

    #[error("feedback {pattern} for {guess} is impossible: {reason}")]
    InconsistentFeedback {
        guess: String,
        pattern: String,
        reason: String,
    },

    #[error("the game is already over")]
    GameOver,
}
