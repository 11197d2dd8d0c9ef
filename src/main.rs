use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use entropybot::{
    paint, simulate, EntropyRecommender, Lexicon, NaiveRecommender, Pattern, Policy,
    RankOptions, Recommender, ScoredGuess, Solver, Word,
};

mod data;

#[derive(Parser, Debug)]
#[command(version, about = "Suggests Wordle guesses by expected information gain")]
struct Cli {
    /// Words that can be the secret, one per line
    #[arg(long)]
    answers: PathBuf,

    /// Words that may be guessed; the answers are used if omitted
    #[arg(long)]
    guesses: Option<PathBuf>,

    /// Only suggest words that could still be the secret
    #[arg(long)]
    hard: bool,

    #[arg(short = 'n', long, default_value_t = 5)]
    suggestions: usize,

    /// Fill the whole pattern table before doing anything else
    #[arg(long)]
    precompute: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rank the next guesses for the feedback seen so far
    Suggest {
        /// A played guess and its feedback, e.g. crane:bbygb (g = correct, y = present, b = absent)
        #[arg(long = "history", value_name = "WORD:PATTERN")]
        history: Vec<String>,

        /// Return the best guesses found within this many milliseconds
        #[arg(long)]
        deadline_ms: Option<u64>,

        /// Stop as soon as a guess is worth this many bits
        #[arg(long)]
        good_enough: Option<f64>,
    },
    /// Play a whole game against a known secret
    Play {
        secret: String,

        /// Use the first-candidate baseline instead of entropy
        #[arg(long)]
        naive: bool,
    },
    /// Play every answer and report the guess distribution
    Bench {
        #[arg(long)]
        naive: bool,

        /// Only play the first LIMIT answers
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn load_solver(cli: &Cli) -> Result<Arc<Solver>> {
    let answers = data::read_words(&cli.answers)?;
    let guesses = match &cli.guesses {
        Some(path) => data::read_words(path)?,
        None => answers.clone(),
    };
    let lexicon = Lexicon::new(&guesses, &answers).context("building the lexicon")?;
    Ok(Solver::new(lexicon))
}

fn progress_bar(message: &'static str) -> Result<ProgressBar> {
    let style = ProgressStyle::default_bar()
        .template("{msg}: [{elapsed} / {duration}] {wide_bar} {pos}/{len}")?;
    Ok(ProgressBar::new(0).with_style(style).with_message(message))
}

/// Run blocking work on the rayon side and cancel `token` on Ctrl-C. The work
/// is expected to notice the token and return what it has.
async fn run_cancellable<T, F>(token: &CancellationToken, work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let mut task = tokio::task::spawn_blocking(work);
    tokio::select! {
        biased;
        result = &mut task => return result.context("worker thread panicked"),
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, returning partial results");
            token.cancel();
        }
    }
    task.await.context("worker thread panicked")
}

fn parse_turn(entry: &str) -> Result<(Word, Pattern)> {
    let Some((guess, pattern)) = entry.split_once(':') else {
        bail!("expected WORD:PATTERN, got {entry:?}");
    };
    let guess = Word::parse(guess).with_context(|| format!("in {entry:?}"))?;
    let pattern = Pattern::parse(pattern).with_context(|| format!("in {entry:?}"))?;
    Ok((guess, pattern))
}

fn print_suggestions(suggestions: &[ScoredGuess]) {
    for (rank, guess) in suggestions.iter().enumerate() {
        let marker = if guess.is_candidate { "*" } else { " " };
        println!(
            "{:>3}. {}{} {:>6.3} bits  {:>4} groups  {:>8.2} expected left",
            rank + 1,
            guess.word.to_string().bold(),
            marker,
            guess.bits,
            guess.groups,
            guess.expected_remaining
        );
    }
}

fn recommender(naive: bool) -> Arc<dyn Recommender> {
    if naive {
        Arc::new(NaiveRecommender)
    } else {
        Arc::new(EntropyRecommender::default())
    }
}

async fn suggest(
    solver: Arc<Solver>,
    policy: Policy,
    token: CancellationToken,
    history: &[String],
    deadline_ms: Option<u64>,
    good_enough: Option<f64>,
) -> Result<()> {
    let options = RankOptions {
        cancel: Some(token.clone()),
        deadline: deadline_ms.map(|ms| Instant::now() + Duration::from_millis(ms)),
        good_enough,
        ..Default::default()
    };
    let mut game = solver.new_game_with(policy, Arc::new(EntropyRecommender::new(options)));

    for entry in history {
        let (guess, pattern) = parse_turn(entry)?;
        let state = game
            .observe(guess, pattern)
            .with_context(|| format!("applying {entry}"))?;
        println!("{}  {} left", paint(&guess, pattern), game.candidates().len());
        if state.is_over() {
            println!("{}", "solved".green().bold());
            return Ok(());
        }
    }

    let remaining = game.candidates().words(game.solver().lexicon());
    if remaining.len() <= 10 {
        let list: Vec<String> = remaining.iter().map(Word::to_string).collect();
        println!("candidates: {}", list.join(" "));
    }

    let suggestions = run_cancellable(&token, move || game.recommend()).await??;
    print_suggestions(&suggestions);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let solver = load_solver(&cli)?;
    let base = if cli.hard { Policy::hard() } else { Policy::default() };
    let policy = base.with_suggestions(cli.suggestions);
    let token = CancellationToken::new();

    if cli.precompute {
        // Interrupting the precompute must not cancel the command that follows.
        let phase = token.child_token();
        let bar = progress_bar("Pattern table")?;
        let worker = Arc::clone(&solver);
        let cancel = phase.clone();
        let full = run_cancellable(&phase, move || worker.precompute(Some(&cancel), Some(bar))).await?;
        if !full {
            info!("pattern table left partially filled");
        }
    }

    match cli.command {
        Command::Suggest {
            history,
            deadline_ms,
            good_enough,
        } => suggest(solver, policy, token.child_token(), &history, deadline_ms, good_enough).await?,
        Command::Play { secret, naive } => {
            let secret = Word::parse(&secret)?;
            let game = simulate::play(
                &solver,
                recommender(naive),
                policy,
                &secret,
                simulate::DEFAULT_MAX_TURNS,
            )?;
            for (guess, pattern) in &game.turns {
                println!("{}", paint(guess, *pattern));
            }
            if game.solved {
                println!("solved in {}", game.turns.len());
            } else {
                println!("{} {}", "failed, the word was".red(), secret);
            }
        }
        Command::Bench { naive, limit } => {
            let bar = progress_bar("Games")?;
            let worker = Arc::clone(&solver);
            let bench = run_cancellable(&token, move || {
                simulate::benchmark(&worker, recommender(naive), policy, limit, Some(bar))
            })
            .await??;
            for (turns, games) in &bench.distribution {
                println!("{turns}: {games}");
            }
            println!(
                "{} games, {:.3} mean guesses, {} failed",
                bench.games(),
                bench.mean_guesses(),
                bench.failures.len()
            );
            for word in &bench.failures {
                println!("  {}", word.to_string().red());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn an_interrupted_phase_leaves_later_phases_running() {
        let root = CancellationToken::new();
        let precompute = root.child_token();
        precompute.cancel();

        let next = root.child_token();
        assert!(!root.is_cancelled());
        assert!(!next.is_cancelled());
        assert_eq!(run_cancellable(&next, || 42).await.unwrap(), 42);
        assert!(!next.is_cancelled());
    }

    #[test]
    fn history_entries_need_a_word_and_a_pattern() {
        let (guess, pattern) = parse_turn("crane:bbygb").unwrap();
        assert_eq!(guess, Word::parse("crane").unwrap());
        assert_eq!(pattern.to_string(), "bbygb");
        assert!(parse_turn("crane").is_err());
        assert!(parse_turn("crane:bbqgb").is_err());
    }
}
