//! Greedy single-pass assignment of lines to clusters.
//!
//! For every line the distinct tokens are walked in order of first occurrence,
//! and for each token the clusters already associated with it are tried oldest
//! first, a cluster reached again through a later token being sampled again.
//! A cluster accepts the line only if the line is strictly more similar than
//! the threshold to *every* line of a fresh random sample drawn from it.
//! The first accepting cluster wins, so results depend on input order.

use crate::error::Result;
use crate::index::InvertedIndex;
use crate::line::ParsedLine;
use crate::similarity::{jaccard, TokenSet};
use crate::stopwords::StopWords;
use crate::store::{ClusterId, ClusterStore};
use crate::tokenizer::Tokenizer;
use itertools::Itertools;
use lru::LruCache;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::num::NonZeroUsize;
use tracing::trace;

const TOKEN_CACHE_CAPACITY: usize = 8192;

#[derive(Debug, Clone, Copy)]
pub struct AssignOpts<'a> {
    pub sample_number: usize,
    pub threshold: f64,
    pub payload_delimiter: Option<&'a str>,
}

impl Default for AssignOpts<'_> {
    fn default() -> Self {
        Self { sample_number: 5, threshold: 0.3, payload_delimiter: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    Matched(ClusterId),
    Created(ClusterId),
}

impl Assignment {
    pub fn is_new(&self) -> bool {
        matches!(self, Assignment::Created(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignStats {
    pub lines: usize,
    pub matched: usize,
    pub created: usize,
    pub candidates_tried: usize,
}

/// Distinct, stop-word-filtered tokens of the clustered part of a line.
fn line_tokens(tokenizer: &dyn Tokenizer, stop_words: &StopWords, delimiter: Option<&str>, raw: &str) -> Vec<String> {
    let parsed = ParsedLine::parse(raw, delimiter);
    let tokens = stop_words.filter(tokenizer.tokenize(parsed.text));
    tokens.into_iter().unique().collect()
}

pub struct ClusterAssigner<'a, S: ClusterStore, R: RngCore = StdRng> {
    store: S,
    index: InvertedIndex,
    tokenizer: Box<dyn Tokenizer + 'a>,
    stop_words: StopWords,
    opts: AssignOpts<'a>,
    rng: R,
    cache: LruCache<String, TokenSet>,
    stats: AssignStats,
}

impl<'a, S: ClusterStore> ClusterAssigner<'a, S, StdRng> {
    /// Seeded when `seed` is given, otherwise drawn from system entropy.
    pub fn new(
        store: S,
        tokenizer: Box<dyn Tokenizer + 'a>,
        stop_words: StopWords,
        opts: AssignOpts<'a>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(store, tokenizer, stop_words, opts, rng)
    }
}

impl<'a, S: ClusterStore, R: RngCore> ClusterAssigner<'a, S, R> {
    pub fn with_rng(
        store: S,
        tokenizer: Box<dyn Tokenizer + 'a>,
        stop_words: StopWords,
        opts: AssignOpts<'a>,
        rng: R,
    ) -> Self {
        let cap = NonZeroUsize::new(TOKEN_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            store,
            index: InvertedIndex::new(),
            tokenizer,
            stop_words,
            opts,
            rng,
            cache: LruCache::new(cap),
            stats: AssignStats::default(),
        }
    }

    /// Continue from an index produced by an earlier run over the same store.
    pub fn with_index(mut self, index: InvertedIndex) -> Self {
        self.index = index;
        self
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stats(&self) -> AssignStats {
        self.stats
    }

    pub fn into_parts(self) -> (S, InvertedIndex) {
        (self.store, self.index)
    }

    pub fn tokens(&self, raw: &str) -> Vec<String> {
        line_tokens(self.tokenizer.as_ref(), &self.stop_words, self.opts.payload_delimiter, raw)
    }

    /// Places one line. Trailing whitespace is dropped before storing.
    ///
    /// A storage failure is returned as-is; the line is then not counted as placed
    /// and a cluster created for it is discarded again.
    pub fn assign(&mut self, raw: &str) -> Result<Assignment> {
        let line = raw.trim_end();
        let tokens = self.tokens(line);
        let set: TokenSet = tokens.iter().cloned().collect();

        for token in &tokens {
            let candidates = self.index.lookup(token).to_vec();
            for cluster in candidates {
                self.stats.candidates_tried += 1;
                if self.accepts(&cluster, &set)? {
                    self.store.append(&cluster, line)?;
                    self.index.record_all(&tokens, &cluster);
                    self.stats.lines += 1;
                    self.stats.matched += 1;
                    trace!(cluster = %cluster, via = %token, "matched");
                    return Ok(Assignment::Matched(cluster));
                }
            }
        }

        let cluster = self.store.create()?;
        if let Err(e) = self.store.append(&cluster, line) {
            self.store.discard(&cluster)?;
            return Err(e);
        }
        self.index.record_all(&tokens, &cluster);
        self.stats.lines += 1;
        self.stats.created += 1;
        trace!(cluster = %cluster, "created");
        Ok(Assignment::Created(cluster))
    }

    fn accepts(&mut self, cluster: &str, set: &TokenSet) -> Result<bool> {
        let sample = self.store.sample(cluster, self.opts.sample_number, &mut self.rng)?;
        for member in sample {
            let member_set = match self.cache.get(&member) {
                Some(s) => s.clone(),
                None => {
                    let s: TokenSet = line_tokens(
                        self.tokenizer.as_ref(),
                        &self.stop_words,
                        self.opts.payload_delimiter,
                        &member,
                    )
                    .into_iter()
                    .collect();
                    self.cache.put(member, s.clone());
                    s
                }
            };
            if jaccard(set, &member_set) <= self.opts.threshold {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
