use ahash::AHashSet;

/// Distinct tokens of one line; order does not matter.
pub type TokenSet = AHashSet<String>;

pub fn token_set<I, S>(tokens: I) -> TokenSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    tokens.into_iter().map(Into::into).collect()
}

/// Jaccard index `|A ∩ B| / |A ∪ B|`.
///
/// Two empty sets score 0.0: with no tokens there is nothing to agree on, so
/// empty lines never count as a confident match, not even with each other.
pub fn jaccard(a: &TokenSet, b: &TokenSet) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let inter = small.iter().filter(|t| large.contains(*t)).count();
    let union = a.len() + b.len() - inter;
    inter as f64 / union as f64
}
