//! Playing whole games against a known secret, to compare recommenders.

use std::collections::BTreeMap;
use std::sync::Arc;

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::info;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::game::{GameState, Solver};
use crate::pattern::Pattern;
use crate::recommender::{Policy, Recommender};
use crate::wordle::Word;

pub const DEFAULT_MAX_TURNS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playthrough {
    pub secret: Word,
    pub turns: Vec<(Word, Pattern)>,
    pub solved: bool,
}

/// Let `recommender` play against `secret`, always taking its top guess.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use entropybot::{simulate, EntropyRecommender, Lexicon, Policy, Solver, Word};
/// let answers = ["crane", "trace", "slate", "crate"];
/// let solver = Solver::new(Lexicon::new(answers, answers).unwrap());
/// let secret = Word::parse("crate").unwrap();
/// let game = simulate::play(&solver, Arc::new(EntropyRecommender::default()), Policy::default(), &secret, 6).unwrap();
/// assert!(game.solved);
/// assert_eq!(game.turns.last().unwrap().0, secret);
/// ```
pub fn play(
    solver: &Arc<Solver>,
    recommender: Arc<dyn Recommender>,
    policy: Policy,
    secret: &Word,
    max_turns: usize,
) -> Result<Playthrough> {
    let lexicon = solver.lexicon();
    let in_answers = lexicon
        .id_of(secret)
        .and_then(|id| lexicon.secret_id(id))
        .is_some();
    if !in_answers {
        return Err(Error::UnknownWord(secret.as_str().to_string()));
    }

    let mut game = solver.new_game_with(policy, recommender);
    let mut turns = vec![];
    while turns.len() < max_turns {
        let guess = game
            .recommend()?
            .first()
            .map(|g| g.word)
            .ok_or(Error::EmptyCandidateSet)?;
        let pattern = solver.table().lookup(&guess, secret)?;
        turns.push((guess, pattern));
        if game.observe(guess, pattern)? == GameState::Won {
            break;
        }
    }

    Ok(Playthrough {
        secret: *secret,
        solved: game.state() == GameState::Won,
        turns,
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Benchmark {
    /// Number of solved games per guess count.
    pub distribution: BTreeMap<usize, usize>,
    pub failures: Vec<Word>,
}

impl Benchmark {
    pub fn games(&self) -> usize {
        self.distribution.values().sum::<usize>() + self.failures.len()
    }

    /// Mean number of guesses over the solved games.
    pub fn mean_guesses(&self) -> f64 {
        let solved: usize = self.distribution.values().sum();
        if solved == 0 {
            return 0.0;
        }
        let total: usize = self.distribution.iter().map(|(turns, n)| turns * n).sum();
        total as f64 / solved as f64
    }
}

/// Play every answerable word (or the first `limit` of them) in parallel.
pub fn benchmark(
    solver: &Arc<Solver>,
    recommender: Arc<dyn Recommender>,
    policy: Policy,
    limit: Option<usize>,
    progress: Option<ProgressBar>,
) -> Result<Benchmark> {
    let lexicon = solver.lexicon();
    let secrets: Vec<Word> = (0..lexicon.answerable().len())
        .take(limit.unwrap_or(usize::MAX))
        .map(|s| lexicon.secret_word(s))
        .collect();
    let progress = progress.unwrap_or_else(ProgressBar::hidden);
    progress.set_length(secrets.len() as u64);

    // Warm the shared opening before fanning out.
    solver
        .new_game_with(policy, Arc::clone(&recommender))
        .recommend()?;

    let games = secrets
        .par_iter()
        .progress_with(progress.clone())
        .map(|secret| play(solver, Arc::clone(&recommender), policy, secret, DEFAULT_MAX_TURNS))
        .collect::<Result<Vec<_>>>()?;
    progress.finish_and_clear();

    let mut bench = Benchmark::default();
    for game in games {
        if game.solved {
            *bench.distribution.entry(game.turns.len()).or_default() += 1;
        } else {
            bench.failures.push(game.secret);
        }
    }
    info!(
        "{}: {} games, {:.3} mean guesses, {} failures",
        recommender.name(),
        bench.games(),
        bench.mean_guesses(),
        bench.failures.len()
    );
    Ok(bench)
}

#[cfg(test)]
mod tests {
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::entropy::RankOptions;
    use crate::lexicon::Lexicon;
    use crate::recommender::{EntropyRecommender, NaiveRecommender};

    const ANSWERS: [&str; 10] = [
        "crane", "slate", "trace", "crate", "raise", "arise", "stare", "roast", "toast", "beast",
    ];

    fn solver() -> Arc<Solver> {
        Solver::new(Lexicon::new(ANSWERS, ANSWERS).unwrap())
    }

    fn word(text: &str) -> Word {
        Word::parse(text).unwrap()
    }

    #[test]
    fn every_answer_is_found() {
        let solver = solver();
        for answer in ANSWERS {
            let game = play(
                &solver,
                Arc::new(EntropyRecommender::default()),
                Policy::default(),
                &word(answer),
                DEFAULT_MAX_TURNS,
            )
            .unwrap();
            assert!(game.solved, "{answer}");
            assert!(game.turns.len() <= DEFAULT_MAX_TURNS);
            assert!(game.turns.last().unwrap().1.is_win());
        }
    }

    #[test]
    fn turn_cap_is_respected() {
        let solver = solver();
        let game = play(
            &solver,
            Arc::new(NaiveRecommender),
            Policy::default(),
            &word("beast"),
            1,
        )
        .unwrap();
        assert_eq!(game.turns.len(), 1);
        assert!(!game.solved);
    }

    #[test]
    fn cancelled_recommender_keeps_playing() {
        let solver = solver();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let rushed = EntropyRecommender::new(RankOptions {
            cancel: Some(cancel),
            ..Default::default()
        });
        let game = play(
            &solver,
            Arc::new(rushed),
            Policy::hard(),
            &word("beast"),
            ANSWERS.len(),
        )
        .unwrap();
        assert!(game.solved);
        assert_eq!(game.turns.last().unwrap().0, word("beast"));
    }

    #[test]
    fn secrets_must_be_answerable() {
        let solver = solver();
        let err = play(
            &solver,
            Arc::new(NaiveRecommender),
            Policy::default(),
            &word("zebra"),
            DEFAULT_MAX_TURNS,
        );
        assert_eq!(err, Err(Error::UnknownWord("zebra".to_string())));
    }

    #[test]
    fn benchmark_counts_every_game() {
        let solver = solver();
        let entropy = benchmark(
            &solver,
            Arc::new(EntropyRecommender::default()),
            Policy::default(),
            None,
            None,
        )
        .unwrap();
        let naive = benchmark(&solver, Arc::new(NaiveRecommender), Policy::default(), None, None)
            .unwrap();
        assert_eq!(entropy.games(), ANSWERS.len());
        assert_eq!(naive.games(), ANSWERS.len());
        assert!(entropy.failures.is_empty());
        assert!(entropy.mean_guesses() >= 1.0);

        let some = benchmark(&solver, Arc::new(NaiveRecommender), Policy::hard(), Some(3), None)
            .unwrap();
        assert_eq!(some.games(), 3);
    }
}
