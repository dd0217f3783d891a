//! Extreme-value selection over `(key, value)` entries.
//!
//! Ties always resolve to the entry encountered first, so selection over an
//! insertion-ordered table is deterministic.

/// Entry with the largest value; first one wins on ties.
pub fn max_by_value<K, V, I>(entries: I) -> Option<(K, V)>
where
    V: Ord,
    I: IntoIterator<Item = (K, V)>,
{
    entries.into_iter().fold(None, |best, (k, v)| match best {
        Some((bk, bv)) if bv >= v => Some((bk, bv)),
        _ => Some((k, v)),
    })
}

/// Entry with the smallest value; first one wins on ties.
pub fn min_by_value<K, V, I>(entries: I) -> Option<(K, V)>
where
    V: Ord,
    I: IntoIterator<Item = (K, V)>,
{
    entries.into_iter().fold(None, |best, (k, v)| match best {
        Some((bk, bv)) if bv <= v => Some((bk, bv)),
        _ => Some((k, v)),
    })
}

/// The `n` largest entries, largest first. Equal values keep their
/// encounter order.
pub fn top_n_by_value<K, V, I>(entries: I, n: usize) -> Vec<(K, V)>
where
    V: Ord,
    I: IntoIterator<Item = (K, V)>,
{
    let mut all: Vec<(K, V)> = entries.into_iter().collect();
    // sort_by is stable
    all.sort_by(|a, b| b.1.cmp(&a.1));
    all.truncate(n);
    all
}
