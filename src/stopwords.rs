use crate::error::{ClusterError, Result};
use ahash::AHashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Tokens removed before similarity is computed.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: AHashSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { words: words.into_iter().map(Into::into).collect() }
    }

    /// One stop word per line. A missing file is not an error: the set is empty.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "stop-word file not found, continuing without stop words");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClusterError::configuration(path, e.to_string()))?;
        let sw = Self::new(content.lines().map(str::trim).filter(|l| !l.is_empty()));
        debug!(path = %path.display(), words = sw.len(), "loaded stop words");
        Ok(sw)
    }

    fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        if self.is_empty() {
            return tokens;
        }
        tokens.into_iter().filter(|t| !self.contains(t)).collect()
    }
}
