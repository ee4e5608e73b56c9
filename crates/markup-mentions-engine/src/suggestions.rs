//! # Suggestions
//!
//! Everything between a trigger being typed and a mention being inserted:
//! locating the query before the caret, asking data providers for
//! candidates, keeping the candidate list and its focus, and splicing the
//! chosen candidate into the marked-up value.
//!
//! Providers may answer later. Every query is issued under a
//! [`QueryGeneration`]; a newer keystroke or selection change advances the
//! generation, and answers carrying an older one are dropped by the caller.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    display::DisplayTransform,
    error::MarkupError,
    mapping::{Boundary, InMentionPolicy, plain_to_markup_boundary, plain_to_markup_index},
    markup::Markup,
    mentions::end_of_last_mention,
    text::{char_len, char_slice, splice_string},
};

/// What starts a mention query.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// A literal trigger such as `@` or `#`.
    Char(String),
    /// A full pattern. Group 1 is the sequence replaced on insertion, group 2
    /// the query.
    Pattern(Regex),
}

impl Default for Trigger {
    fn default() -> Self {
        Trigger::Char("@".to_string())
    }
}

/// Builds the regex matching a trigger sequence that ends at the caret.
///
/// A literal trigger must start the text or follow whitespace. The query
/// stops at the next trigger and, unless `allow_space_in_query`, at
/// whitespace.
pub fn trigger_regex(trigger: &Trigger, allow_space_in_query: bool) -> Result<Regex, MarkupError> {
    match trigger {
        Trigger::Pattern(re) => Ok(re.clone()),
        Trigger::Char(chars) => {
            let escaped = regex::escape(chars);
            let excluded = if allow_space_in_query { "" } else { r"\s" };
            Ok(Regex::new(&format!(
                r"(?:^|\s)({escaped}([^{excluded}{escaped}]*))$"
            ))?)
        }
    }
}

/// A trigger sequence found before the caret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionQuery {
    /// Text typed after the trigger.
    pub query: String,
    /// Plain-text range of the trigger plus query, replaced on insertion.
    pub start: usize,
    pub end: usize,
}

/// Looks for a trigger sequence ending at `caret`.
///
/// Returns `None` when the caret is inside a mention or no trigger matches.
/// The search never reaches back past the end of the previous mention.
pub fn find_query(
    value: &str,
    markup: &Markup,
    plain_text: &str,
    caret: usize,
    trigger: &Regex,
    transform: &dyn DisplayTransform,
) -> Option<MentionQuery> {
    let position = plain_to_markup_index(value, markup, caret, InMentionPolicy::Null, transform)?;
    let lookback = end_of_last_mention(char_slice(value, 0, position), markup, transform);
    let substring = char_slice(plain_text, lookback, caret);

    let caps = trigger.captures(substring)?;
    let sequence = caps.get(1)?;
    let query = caps.get(2).map_or("", |m| m.as_str());

    let start = lookback + char_len(&substring[..sequence.start()]);
    Some(MentionQuery {
        query: query.to_string(),
        start,
        end: start + char_len(sequence.as_str()),
    })
}

/// A candidate entity offered for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    #[serde(default)]
    pub display: Option<String>,
}

impl Suggestion {
    pub fn new(id: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: Some(display.into()),
        }
    }

    /// The display text, falling back to the id when missing or empty.
    pub fn display_text(&self) -> &str {
        match self.display.as_deref() {
            Some(display) if !display.is_empty() => display,
            _ => &self.id,
        }
    }
}

/// Monotonic counter identifying the current round of queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryGeneration(u64);

impl QueryGeneration {
    /// Moves to the next generation, invalidating every earlier one.
    pub fn advance(&mut self) -> QueryGeneration {
        self.0 += 1;
        *self
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// A provider's answer to a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderResponse {
    Ready(Vec<Suggestion>),
    /// Results will be delivered later, tagged with the generation the query
    /// was issued under.
    Pending,
}

/// Source of candidates for a mention query.
pub trait DataProvider {
    fn query(&self, query: &str, generation: QueryGeneration) -> ProviderResponse;
}

/// A fixed list is searched by case-insensitive substring of the display.
impl DataProvider for [Suggestion] {
    fn query(&self, query: &str, _generation: QueryGeneration) -> ProviderResponse {
        ProviderResponse::Ready(
            self.iter()
                .filter(|s| find_case_insensitive(s.display_text(), query).is_some())
                .cloned()
                .collect(),
        )
    }
}

impl DataProvider for Vec<Suggestion> {
    fn query(&self, query: &str, generation: QueryGeneration) -> ProviderResponse {
        self.as_slice().query(query, generation)
    }
}

/// Byte range of the first case-insensitive occurrence of `needle`.
fn find_case_insensitive(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    haystack.char_indices().map(|(i, _)| i).chain([haystack.len()]).find_map(|start| {
        let mut rest = haystack[start..].char_indices();
        let mut end = start;
        for wanted in needle.chars() {
            let (offset, got) = rest.next()?;
            if !got.to_lowercase().eq(wanted.to_lowercase()) {
                return None;
            }
            end = start + offset + got.len_utf8();
        }
        Some((start, end))
    })
}

/// A display split around the first case-insensitive match of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight<'a> {
    pub before: &'a str,
    pub matched: &'a str,
    pub after: &'a str,
}

/// Splits `display` for rendering the matched part of a suggestion. When the
/// query does not occur, the whole display is `before`.
pub fn highlight<'a>(display: &'a str, query: &str) -> Highlight<'a> {
    match find_case_insensitive(display, query) {
        Some((start, end)) => Highlight {
            before: &display[..start],
            matched: &display[start..end],
            after: &display[end..],
        },
        None => Highlight {
            before: display,
            matched: "",
            after: "",
        },
    }
}

/// Results of one source for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionGroup {
    /// Index of the mention source that produced these results.
    pub source: usize,
    pub query: MentionQuery,
    /// Plain text at the time of the query.
    pub plain_text: String,
    pub results: Vec<Suggestion>,
}

/// All current suggestions, grouped by source, with a focused entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionList {
    groups: Vec<SuggestionGroup>,
    focus: usize,
}

impl SuggestionList {
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.results.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn groups(&self) -> &[SuggestionGroup] {
        &self.groups
    }

    pub fn focus_index(&self) -> usize {
        self.focus
    }

    /// Entry at `index` counting across all groups in order.
    pub fn get(&self, index: usize) -> Option<(&SuggestionGroup, &Suggestion)> {
        self.groups
            .iter()
            .flat_map(|g| g.results.iter().map(move |s| (g, s)))
            .nth(index)
    }

    pub fn focused(&self) -> Option<(&SuggestionGroup, &Suggestion)> {
        self.get(self.focus)
    }

    /// Stores the results of a source, replacing its previous group. The
    /// focus is pulled back if the list shrank beneath it.
    pub fn upsert(&mut self, group: SuggestionGroup) {
        match self.groups.iter_mut().find(|g| g.source == group.source) {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
        let len = self.len();
        if self.focus >= len {
            self.focus = len.saturating_sub(1);
        }
    }

    /// Moves the focus by `delta`, wrapping at both ends.
    pub fn shift_focus(&mut self, delta: isize) {
        let len = self.len();
        if len == 0 {
            return;
        }
        self.focus = (self.focus as isize + delta).rem_euclid(len as isize) as usize;
    }

    /// Focuses the entry at `index`, clamped to the last entry.
    pub fn set_focus(&mut self, index: usize) {
        self.focus = index.min(self.len().saturating_sub(1));
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.focus = 0;
    }
}

/// Result of inserting a mention for a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionInsertion {
    pub value: String,
    pub plain_text: String,
    /// Plain-text caret just past the inserted display.
    pub caret: usize,
}

/// Replaces the query's trigger sequence with a mention of `suggestion`.
#[allow(clippy::too_many_arguments)]
pub fn insert_mention(
    value: &str,
    markup: &Markup,
    query: &MentionQuery,
    plain_text: &str,
    suggestion: &Suggestion,
    kind: Option<&str>,
    append_space: bool,
    transform: &dyn DisplayTransform,
) -> MentionInsertion {
    let start = plain_to_markup_boundary(value, markup, query.start, Boundary::Start, transform);
    let end = start + query.end.saturating_sub(query.start);

    let mut insert = markup.render(&suggestion.id, suggestion.display_text(), kind);
    let mut display = transform.transform(&suggestion.id, suggestion.display_text(), kind);
    if append_space {
        insert.push(' ');
        display.push(' ');
    }

    MentionInsertion {
        value: splice_string(value, start, end, &insert),
        plain_text: splice_string(plain_text, query.start, query.end, &display),
        caret: query.start + char_len(&display),
    }
}
