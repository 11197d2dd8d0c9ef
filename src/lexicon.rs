use log::warn;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::wordle::Word;

/// Index of a word in [`Lexicon::words`]: every distinct guessable or
/// answerable word has one.
pub type WordId = usize;

/// Index of a word in [`Lexicon::answerable`].
pub type SecretId = usize;

/// The two word lists of a game, validated once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Lexicon {
    word_len: usize,
    /// Guessable words in input order, then answerable words that are not
    /// guessable.
    words: Vec<Word>,
    index: FxHashMap<Word, WordId>,
    guessable: Vec<WordId>,
    answerable: Vec<WordId>,
    secret_ids: Vec<Option<SecretId>>,
}

impl Lexicon {
    /// Build a lexicon, taking the word length from the first answerable word.
    ///
    /// # Example
    ///
    /// ```
    /// use entropybot::Lexicon;
    /// let lexicon = Lexicon::new(["crane", "slate"], ["crate", "slate"]).unwrap();
    /// assert_eq!(lexicon.word_len(), 5);
    /// assert_eq!(lexicon.words().len(), 3);
    /// assert_eq!(lexicon.answerable().len(), 2);
    /// ```
    pub fn new<G, A>(guessable: G, answerable: A) -> Result<Lexicon>
    where
        G: IntoIterator,
        G::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        let answerable = parse_list(answerable, "answerable")?;
        let word_len = answerable[0].len();
        let guessable = parse_list(guessable, "guessable")?;
        Lexicon::build(word_len, guessable, answerable)
    }

    /// Build a lexicon whose words must all have `word_len` letters.
    pub fn with_word_len<G, A>(word_len: usize, guessable: G, answerable: A) -> Result<Lexicon>
    where
        G: IntoIterator,
        G::Item: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        let answerable = parse_list(answerable, "answerable")?;
        let guessable = parse_list(guessable, "guessable")?;
        Lexicon::build(word_len, guessable, answerable)
    }

    fn build(word_len: usize, guessable: Vec<Word>, answerable: Vec<Word>) -> Result<Lexicon> {
        if let Some(word) = guessable.iter().chain(&answerable).find(|w| w.len() != word_len) {
            return Err(Error::InvalidLexicon(format!(
                "{word} has {} letters, expected {word_len}",
                word.len()
            )));
        }

        let mut lexicon = Lexicon {
            word_len,
            words: Vec::with_capacity(guessable.len() + answerable.len()),
            index: FxHashMap::default(),
            guessable: Vec::with_capacity(guessable.len()),
            answerable: Vec::with_capacity(answerable.len()),
            secret_ids: vec![],
        };

        for word in guessable {
            match lexicon.intern(word) {
                (id, true) => lexicon.guessable.push(id),
                (_, false) => warn!("dropping duplicate guessable word {word}"),
            }
        }

        let mut seen = vec![false; lexicon.words.len()];
        for word in answerable {
            let (id, _) = lexicon.intern(word);
            seen.resize(lexicon.words.len(), false);
            if seen[id] {
                warn!("dropping duplicate answerable word {word}");
                continue;
            }
            seen[id] = true;
            lexicon.answerable.push(id);
        }

        lexicon.secret_ids = vec![None; lexicon.words.len()];
        for (secret, &id) in lexicon.answerable.iter().enumerate() {
            lexicon.secret_ids[id] = Some(secret);
        }

        Ok(lexicon)
    }

    /// Returns the id of `word`, and whether it was newly added.
    fn intern(&mut self, word: Word) -> (WordId, bool) {
        if let Some(&id) = self.index.get(&word) {
            return (id, false);
        }
        let id = self.words.len();
        self.words.push(word);
        self.index.insert(word, id);
        (id, true)
    }

    pub fn word_len(&self) -> usize {
        self.word_len
    }

    /// All distinct words, indexed by [`WordId`].
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn word(&self, id: WordId) -> Word {
        self.words[id]
    }

    pub fn guessable(&self) -> &[WordId] {
        &self.guessable
    }

    /// Answerable words as [`WordId`]s, indexed by [`SecretId`].
    pub fn answerable(&self) -> &[WordId] {
        &self.answerable
    }

    pub fn secret_word(&self, secret: SecretId) -> Word {
        self.words[self.answerable[secret]]
    }

    pub fn id_of(&self, word: &Word) -> Option<WordId> {
        self.index.get(word).copied()
    }

    pub fn secret_id(&self, id: WordId) -> Option<SecretId> {
        self.secret_ids.get(id).copied().flatten()
    }

    /// Parse `text` and find it in the lexicon.
    pub fn lookup(&self, text: &str) -> Result<WordId> {
        let word = Word::parse(text)?;
        if word.len() != self.word_len {
            return Err(Error::LengthMismatch {
                expected: self.word_len,
                found: word.len(),
            });
        }
        self.id_of(&word)
            .ok_or_else(|| Error::UnknownWord(text.trim().to_string()))
    }
}

fn parse_list<I>(list: I, name: &str) -> Result<Vec<Word>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let words = list
        .into_iter()
        .map(|text| {
            Word::parse(text.as_ref()).map_err(|_| {
                Error::InvalidLexicon(format!("{name} word {:?} is malformed", text.as_ref()))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    if words.is_empty() {
        return Err(Error::InvalidLexicon(format!("no {name} words")));
    }
    Ok(words)
}
