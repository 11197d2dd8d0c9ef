//! Cached feedback patterns for every (guess, secret) pair of a lexicon.
//!
//! The cache is one flat `ndarray` arena with a row per [`WordId`] and a
//! column per [`SecretId`]. Rows are filled in a single pass the first time
//! they are needed, or all at once by [`PatternTable::precompute_all`]. A row
//! is published through its ready flag after it is written, so readers never
//! see a half-filled row. Two threads racing on the same row both write the
//! same codes.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::info;
use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayView1, Axis};
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::lexicon::{Lexicon, SecretId, WordId};
use crate::pattern::{encode, encode_code, Pattern};
use crate::wordle::Word;

#[derive(Debug)]
pub struct PatternTable {
    lexicon: Arc<Lexicon>,
    codes: Array2<AtomicU16>,
    ready: Vec<AtomicBool>,
}

/// One guess's patterns against every secret of the lexicon.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    codes: ArrayView1<'a, AtomicU16>,
    word_len: usize,
}

impl<'a> Row<'a> {
    pub fn code(&self, secret: SecretId) -> u16 {
        self.codes[secret].load(Ordering::Relaxed)
    }

    pub fn pattern(&self, secret: SecretId) -> Pattern {
        Pattern::from_code(self.code(secret), self.word_len)
    }
}

impl PatternTable {
    /// Create an empty table. Nothing is computed until it is asked for.
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        let shape = (lexicon.words().len(), lexicon.answerable().len());
        let codes = Array2::from_shape_simple_fn(shape, || AtomicU16::new(0));
        let ready = (0..shape.0).map(|_| AtomicBool::new(false)).collect();
        PatternTable {
            lexicon,
            codes,
            ready,
        }
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    pub fn is_ready(&self, guess: WordId) -> bool {
        self.ready[guess].load(Ordering::Acquire)
    }

    /// Number of guess rows already filled.
    pub fn ready_rows(&self) -> usize {
        self.ready
            .iter()
            .filter(|r| r.load(Ordering::Relaxed))
            .count()
    }

    /// The patterns of `guess` against every secret, filling the row first if
    /// needed.
    pub fn row(&self, guess: WordId) -> Row<'_> {
        let codes = self.codes.row(guess);
        if !self.is_ready(guess) {
            self.fill_row(guess, codes);
        }
        Row {
            codes,
            word_len: self.lexicon.word_len(),
        }
    }

    pub fn lookup_ids(&self, guess: WordId, secret: SecretId) -> Pattern {
        self.row(guess).pattern(secret)
    }

    /// Pattern of any two words. Pairs inside the lexicon go through the
    /// cache; anything else is encoded directly.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use entropybot::{Lexicon, PatternTable, Word};
    /// let lexicon = Lexicon::new(["crane"], ["crate"]).unwrap();
    /// let table = PatternTable::new(Arc::new(lexicon));
    /// let crane = Word::parse("crane").unwrap();
    /// let crate_ = Word::parse("crate").unwrap();
    /// assert_eq!(table.lookup(&crane, &crate_).unwrap().to_string(), "gggbg");
    /// assert!(table.is_ready(0));
    /// ```
    pub fn lookup(&self, guess: &Word, secret: &Word) -> Result<Pattern> {
        let cached = self.lexicon.id_of(guess).zip(
            self.lexicon
                .id_of(secret)
                .and_then(|id| self.lexicon.secret_id(id)),
        );
        match cached {
            Some((guess, secret)) => Ok(self.lookup_ids(guess, secret)),
            None => encode(guess, secret),
        }
    }

    /// Fill the rows of `guesses` in parallel.
    pub fn precompute(&self, guesses: &[WordId]) {
        guesses.par_iter().for_each(|&guess| {
            self.row(guess);
        });
    }

    /// Fill every row in parallel. Stops early once `cancel` fires; rows
    /// finished before that stay usable. Returns whether the table is full.
    pub fn precompute_all(
        &self,
        cancel: Option<&CancellationToken>,
        progress: Option<ProgressBar>,
    ) -> bool {
        let progress = progress.unwrap_or_else(ProgressBar::hidden);
        progress.set_length(self.ready.len() as u64);

        self.codes
            .axis_iter(Axis(0))
            .into_par_iter()
            .enumerate()
            .progress_with(progress.clone())
            .for_each(|(guess, codes)| {
                if cancel.map_or(false, |c| c.is_cancelled()) || self.is_ready(guess) {
                    return;
                }
                self.fill_row(guess, codes);
            });
        progress.finish_and_clear();

        let ready = self.ready_rows();
        info!(
            "pattern table: {ready}/{} rows ready ({} secrets each)",
            self.ready.len(),
            self.lexicon.answerable().len()
        );
        ready == self.ready.len()
    }

    fn fill_row(&self, guess: WordId, codes: ArrayView1<'_, AtomicU16>) {
        let guess_word = self.lexicon.word(guess);
        for (cell, &secret) in codes.iter().zip(self.lexicon.answerable()) {
            let secret_word = self.lexicon.word(secret);
            cell.store(
                encode_code(guess_word.as_bytes(), secret_word.as_bytes()),
                Ordering::Relaxed,
            );
        }
        self.ready[guess].store(true, Ordering::Release);
    }
}
