//! Fuzzy filtering of candidate items using the nucleo matcher.

use nucleo::pattern::{CaseMatching, Normalization, Pattern};
use nucleo::{Config, Matcher, Utf32Str};

/// Filter `items` down to the ones whose key fuzzy-matches `query`,
/// best matches first. Items with equal scores keep their input order.
///
/// An empty (or all-whitespace) query returns the full list unchanged.
pub fn filter<T: Clone>(query: &str, items: &[T], key: impl Fn(&T) -> String) -> Vec<T> {
    if query.trim().is_empty() {
        return items.to_vec();
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::parse(query, CaseMatching::Smart, Normalization::Smart);

    let mut buf = Vec::new();
    let mut scored: Vec<(u32, &T)> = items
        .iter()
        .filter_map(|item| {
            let text = key(item);
            let haystack = Utf32Str::new(&text, &mut buf);
            pattern.score(haystack, &mut matcher).map(|score| (score, item))
        })
        .collect();

    // Stable, so ties keep input order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, item)| item.clone()).collect()
}
