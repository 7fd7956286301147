//! Token frequencies of extracted text
//!
//! Words are lowercased and stemmed with the German Snowball stemmer.
//! Stopwords are removed both before and after stemming, and so are words
//! shorter than four characters and anything containing a digit.

use super::{read_file, ExtractResult};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

/// Punctuation that separates words like whitespace does
#[allow(clippy::expect_used)]
static PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.:;,?!+/]").expect("static regex is valid"));

/// Shortest word that is counted, in characters
pub const MIN_WORD_LENGTH: usize = 4;

/// Counts stemmed words of a text
pub struct TokenFrequency {
    stopwords: HashSet<String>,
    stemmer: Stemmer,
    binary: bool,
}

impl TokenFrequency {
    /// Creates a counter that reports every kept word with frequency 1
    pub fn new<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stopwords: stopwords.into_iter().map(Into::into).collect(),
            stemmer: Stemmer::create(Algorithm::German),
            binary: true,
        }
    }

    /// Reads whitespace-separated stopwords from a file
    pub fn from_stopword_file(path: &Path) -> ExtractResult<Self> {
        let content = read_file(path)?;
        Ok(Self::new(content.split_whitespace()))
    }

    /// Reports how often each word occurs instead of 1
    pub fn counting(mut self) -> Self {
        self.binary = false;
        self
    }

    /// Frequencies of the kept words, keyed by stem
    pub fn frequencies(&self, text: &str) -> BTreeMap<String, u32> {
        let text = PUNCTUATION.replace_all(text, " ");
        let mut frequencies = BTreeMap::new();

        for word in text.split_whitespace() {
            let word = word.to_lowercase();
            if self.stopwords.contains(&word) {
                continue;
            }

            let stem = self.stemmer.stem(&word).into_owned();
            if self.stopwords.contains(&stem)
                || stem.chars().count() < MIN_WORD_LENGTH
                || stem.chars().any(|c| c.is_ascii_digit())
            {
                continue;
            }

            *frequencies.entry(stem).or_insert(0) += 1;
        }

        if self.binary {
            frequencies.values_mut().for_each(|count| *count = 1);
        }

        frequencies
    }

    /// Frequencies of the kept words as a JSON object
    pub fn to_json(&self, text: &str) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.frequencies(text))
    }
}
