//! Incremental filtering of menu entries.
//!
//! Filtering is a per-entry predicate, so it never reorders the list: an empty
//! query returns the entries unchanged and filtering twice with the same query
//! is the same as filtering once.

use std::ops::Range;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::config::MatchMode;
use crate::menu::MenuEntry;

/// Matches a query against the searchable fields of entries.
pub struct Matcher {
    mode: MatchMode,
    fuzzy: SkimMatcherV2,
}

impl Matcher {
    #[must_use]
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            fuzzy: SkimMatcherV2::default().ignore_case(),
        }
    }

    fn field_matches(&self, field: &str, query: &str) -> bool {
        match self.mode {
            MatchMode::Substring => field.to_lowercase().contains(&query.to_lowercase()),
            MatchMode::Fuzzy => self.fuzzy.fuzzy_match(field, query).is_some(),
        }
    }

    /// An entry matches when its label, description or id matches.
    #[must_use]
    pub fn matches(&self, entry: &MenuEntry, query: &str) -> bool {
        query.is_empty()
            || [&entry.label, &entry.description, &entry.id]
                .iter()
                .any(|field| self.field_matches(field, query))
    }

    /// Byte ranges of `text` to emphasise for `query`.
    #[must_use]
    pub fn highlight(&self, text: &str, query: &str) -> Vec<Range<usize>> {
        if query.is_empty() {
            return Vec::new();
        }

        match self.mode {
            MatchMode::Substring => first_substring(text, query).into_iter().collect(),
            MatchMode::Fuzzy => match self.fuzzy.fuzzy_indices(text, query) {
                Some((_, char_indices)) => char_ranges(text, &char_indices),
                None => Vec::new(),
            },
        }
    }
}

fn chars_equal_ignoring_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// First case-insensitive occurrence of `query`, compared char by char so the
/// range stays on `text`'s own byte offsets.
fn first_substring(text: &str, query: &str) -> Option<Range<usize>> {
    for (start, _) in text.char_indices() {
        let mut candidate = text[start..].char_indices();
        let mut end = start;
        let mut matched = true;

        for query_char in query.chars() {
            match candidate.next() {
                Some((offset, text_char)) if chars_equal_ignoring_case(text_char, query_char) => {
                    end = start + offset + text_char.len_utf8();
                }
                _ => {
                    matched = false;
                    break;
                }
            }
        }

        if matched {
            return Some(start..end);
        }
    }

    None
}

fn char_ranges(text: &str, char_indices: &[usize]) -> Vec<Range<usize>> {
    text.char_indices()
        .enumerate()
        .filter(|(position, _)| char_indices.contains(position))
        .map(|(_, (offset, c))| offset..offset + c.len_utf8())
        .collect()
}

/// Indexes of the entries matching `query`, in their original order.
#[must_use]
pub fn filter_indices(entries: &[MenuEntry], query: &str, mode: MatchMode) -> Vec<usize> {
    if query.is_empty() {
        return (0..entries.len()).collect();
    }

    let matcher = Matcher::new(mode);
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| matcher.matches(entry, query))
        .map(|(index, _)| index)
        .collect()
}

/// The entries matching `query`, in their original order.
#[must_use]
pub fn filter(entries: &[MenuEntry], query: &str, mode: MatchMode) -> Vec<MenuEntry> {
    filter_indices(entries, query, mode)
        .into_iter()
        .map(|index| entries[index].clone())
        .collect()
}

/// Byte ranges of `text` to emphasise for `query`.
#[must_use]
pub fn highlight(text: &str, query: &str, mode: MatchMode) -> Vec<Range<usize>> {
    Matcher::new(mode).highlight(text, query)
}
