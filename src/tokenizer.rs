use crate::config::Lang;
use crate::error::{ClusterError, Result};
use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};

/// Splits text into normalized tokens, in order of appearance.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

// Word runs; Han runs are captured separately so they can be segmented further.
static RE_CN_RUNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\p{Han}+)|([\w&&[^\p{Han}]]+)").unwrap()
});

static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Dictionary-backed segmenter.
///
/// `en` mode yields lowercase word tokens. `cn` mode additionally splits runs of
/// Han characters by forward maximum matching against the loaded dictionary;
/// characters not covered by any entry become single-character tokens.
#[derive(Debug, Clone)]
pub struct Segmenter {
    lang: Lang,
    words: AHashSet<String>,
    max_word_chars: usize,
}

impl Segmenter {
    pub fn new(lang: Lang) -> Self {
        Self { lang, words: AHashSet::new(), max_word_chars: 1 }
    }

    pub fn with_words<I, S>(lang: Lang, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seg = Self::new(lang);
        for w in words {
            seg.add_word(w.into());
        }
        seg
    }

    /// Loads a jieba-style dictionary (`word [freq] [tag]` per line).
    /// An absent file yields an empty dictionary.
    pub fn load(lang: Lang, dict: &Path) -> Result<Self> {
        if lang == Lang::En {
            return Ok(Self::new(lang));
        }
        if !dict.exists() {
            warn!(path = %dict.display(), "dictionary not found, segmenting Han text per character");
            return Ok(Self::new(lang));
        }
        let content = std::fs::read_to_string(dict)
            .map_err(|e| ClusterError::configuration(dict, e.to_string()))?;
        let seg = Self::with_words(
            lang,
            content.lines().filter_map(|l| l.split_whitespace().next()),
        );
        debug!(path = %dict.display(), words = seg.words.len(), "loaded dictionary");
        Ok(seg)
    }

    fn add_word(&mut self, word: String) {
        let n = word.chars().count();
        if n == 0 {
            return;
        }
        self.max_word_chars = self.max_word_chars.max(n);
        self.words.insert(word);
    }

    fn segment_han(&self, run: &str, out: &mut Vec<String>) {
        let chars: Vec<char> = run.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let longest = self.max_word_chars.min(chars.len() - i);
            let mut taken = 1;
            for len in (2..=longest).rev() {
                let candidate: String = chars[i..i + len].iter().collect();
                if self.words.contains(&candidate) {
                    taken = len;
                    break;
                }
            }
            out.push(chars[i..i + taken].iter().collect());
            i += taken;
        }
    }
}

impl Tokenizer for Segmenter {
    fn tokenize(&self, text: &str) -> Vec<String> {
        match self.lang {
            Lang::En => RE_WORD.find_iter(text).map(|m| m.as_str().to_lowercase()).collect(),
            Lang::Cn => {
                let mut out = Vec::new();
                for cap in RE_CN_RUNS.captures_iter(text) {
                    if let Some(han) = cap.get(1) {
                        self.segment_han(han.as_str(), &mut out);
                    } else if let Some(word) = cap.get(2) {
                        out.push(word.as_str().to_lowercase());
                    }
                }
                out
            }
        }
    }
}

/// Whitespace split, no normalization. Useful when input is pre-tokenized.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}
