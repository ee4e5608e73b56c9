//! # Input Session
//!
//! UI-agnostic state of one mention input. The embedding layer forwards the
//! surface's change, select, blur and composition events; the session keeps
//! the selection it needs for the next edit, runs suggestion queries, and
//! returns the new marked-up value together with the mention payload.
//!
//! The session never holds the marked-up value itself. The host owns it and
//! passes it into every call.

use regex::Regex;

use crate::{
    display::{DisplayTransform, IdentityDisplay},
    editor::{PlainTextEdit, apply_edit},
    error::MarkupError,
    mapping::{MentionLookup, find_mention_start_containing},
    markup::Markup,
    mentions::{MentionOccurrence, extract_mentions},
    projection::{PlainAndStripped, plain_text, project},
    suggestions::{
        DataProvider, MentionQuery, ProviderResponse, QueryGeneration, Suggestion, SuggestionGroup,
        SuggestionList, Trigger, find_query, insert_mention, trigger_regex,
    },
};

/// A plain-text selection; a caret when `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_collapsed(self) -> bool {
        self.start == self.end
    }
}

/// One kind of mention the input offers, e.g. users behind `@`.
pub struct MentionSource {
    /// Written into the `__type__` placeholder.
    pub kind: Option<String>,
    pub trigger: Regex,
    pub provider: Box<dyn DataProvider>,
    pub append_space_on_add: bool,
    /// Called with the id and display of every mention this source inserts.
    pub on_add: Option<Box<dyn Fn(&str, &str)>>,
}

impl MentionSource {
    pub fn new(
        kind: Option<String>,
        trigger: &Trigger,
        allow_space_in_query: bool,
        provider: Box<dyn DataProvider>,
    ) -> Result<Self, MarkupError> {
        Ok(Self {
            kind,
            trigger: trigger_regex(trigger, allow_space_in_query)?,
            provider,
            append_space_on_add: false,
            on_add: None,
        })
    }

    pub fn append_space_on_add(mut self, append: bool) -> Self {
        self.append_space_on_add = append;
        self
    }

    pub fn on_add(mut self, callback: impl Fn(&str, &str) + 'static) -> Self {
        self.on_add = Some(Box::new(callback));
        self
    }
}

/// What the host should store and show after a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeOutcome {
    pub value: String,
    pub plain_text: String,
    pub mentions: Vec<MentionOccurrence>,
    pub selection: Selection,
    /// The surface must move its selection to `selection`, because a
    /// mention was added or removed around the caret.
    pub restore_selection: bool,
}

#[derive(Debug, Clone)]
struct PendingQuery {
    source: usize,
    query: MentionQuery,
    plain_text: String,
}

pub struct MentionsInput {
    markup: Markup,
    transform: Box<dyn DisplayTransform>,
    sources: Vec<MentionSource>,
    selection: Option<Selection>,
    /// An IME composition session is open; selection events are unreliable.
    composing: bool,
    generation: QueryGeneration,
    suggestions: SuggestionList,
    pending: Vec<PendingQuery>,
}

impl MentionsInput {
    pub fn new(markup: Markup) -> Self {
        Self {
            markup,
            transform: Box::new(IdentityDisplay),
            sources: Vec::new(),
            selection: None,
            composing: false,
            generation: QueryGeneration::default(),
            suggestions: SuggestionList::default(),
            pending: Vec::new(),
        }
    }

    pub fn with_display_transform(mut self, transform: impl DisplayTransform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    pub fn with_source(mut self, source: MentionSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn markup(&self) -> &Markup {
        &self.markup
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn generation(&self) -> QueryGeneration {
        self.generation
    }

    pub fn suggestions(&self) -> &SuggestionList {
        &self.suggestions
    }

    pub fn plain_text(&self, value: &str) -> String {
        plain_text(value, &self.markup, self.transform.as_ref())
    }

    pub fn project(&self, value: &str) -> PlainAndStripped {
        project(value, &self.markup, self.transform.as_ref())
    }

    pub fn mentions(&self, value: &str) -> Vec<MentionOccurrence> {
        extract_mentions(value, &self.markup, self.transform.as_ref())
    }

    /// Applies a change of the surface's text to `value`.
    ///
    /// `selection_start` and `selection_end` are the surface's selection after
    /// the change. If a mention vanished around the caret, the returned
    /// selection is moved to where the mention started.
    pub fn handle_change(
        &mut self,
        value: &str,
        new_plain_text: &str,
        selection_start: usize,
        selection_end: usize,
    ) -> ChangeOutcome {
        let transform = self.transform.as_ref();
        let before = self.selection;
        let edit = PlainTextEdit {
            new_plain_text,
            selection_start_before: before.map(|s| s.start),
            selection_end_before: before.map(|s| s.end),
            selection_end_after: selection_end,
        };
        let new_value = apply_edit(value, &self.markup, &edit, transform);
        // Removing a mention also removes the rest of its display.
        let plain = plain_text(&new_value, &self.markup, transform);

        let mut selection = Selection {
            start: selection_start,
            end: selection_end,
        };
        let mut restore_selection = false;
        if let MentionLookup::Found(mention_start) =
            find_mention_start_containing(value, &self.markup, selection_start, transform)
            && before.is_some_and(|s| s.end > mention_start)
        {
            selection = Selection::caret(mention_start);
            restore_selection = true;
        }
        self.selection = Some(selection);

        let mentions = extract_mentions(&new_value, &self.markup, transform);
        ChangeOutcome {
            value: new_value,
            plain_text: plain,
            mentions,
            selection,
            restore_selection,
        }
    }

    /// Tracks the surface's selection and refreshes suggestions.
    ///
    /// Ignored while composing. A caret starts a new round of queries; a
    /// range selection closes the suggestions.
    pub fn handle_select(&mut self, value: &str, plain_text: &str, start: usize, end: usize) {
        if self.composing {
            return;
        }
        let selection = Selection { start, end };
        self.selection = Some(selection);
        if selection.is_collapsed() {
            self.update_queries(value, plain_text, start);
        } else {
            self.clear_suggestions();
        }
    }

    /// Invalidates earlier queries and asks every source whose trigger
    /// precedes `caret`.
    pub fn update_queries(&mut self, value: &str, plain_text: &str, caret: usize) {
        let generation = self.generation.advance();
        self.suggestions.clear();
        self.pending.clear();
        log::trace!("query generation {} at caret {caret}", generation.value());

        let transform = self.transform.as_ref();
        for (source_index, source) in self.sources.iter().enumerate() {
            let Some(query) =
                find_query(value, &self.markup, plain_text, caret, &source.trigger, transform)
            else {
                continue;
            };
            match source.provider.query(&query.query, generation) {
                ProviderResponse::Ready(results) => self.suggestions.upsert(SuggestionGroup {
                    source: source_index,
                    query,
                    plain_text: plain_text.to_string(),
                    results,
                }),
                ProviderResponse::Pending => self.pending.push(PendingQuery {
                    source: source_index,
                    query,
                    plain_text: plain_text.to_string(),
                }),
            }
        }
    }

    /// Delivers results a provider answered with [`ProviderResponse::Pending`].
    ///
    /// Returns `false` and drops the results if `generation` is no longer
    /// current or the source has no outstanding query.
    pub fn receive_suggestions(
        &mut self,
        generation: QueryGeneration,
        source: usize,
        results: Vec<Suggestion>,
    ) -> bool {
        if generation != self.generation {
            log::debug!(
                "dropping stale suggestions from generation {} (current {})",
                generation.value(),
                self.generation.value()
            );
            return false;
        }
        let Some(pending) = self.pending.iter().find(|p| p.source == source).cloned() else {
            return false;
        };
        self.suggestions.upsert(SuggestionGroup {
            source,
            query: pending.query,
            plain_text: pending.plain_text,
            results,
        });
        true
    }

    pub fn clear_suggestions(&mut self) {
        self.generation.advance();
        self.suggestions.clear();
        self.pending.clear();
    }

    pub fn shift_focus(&mut self, delta: isize) {
        self.suggestions.shift_focus(delta);
    }

    pub fn set_focus(&mut self, index: usize) {
        self.suggestions.set_focus(index);
    }

    /// Inserts the focused suggestion, if any.
    pub fn select_focused(&mut self, value: &str) -> Option<ChangeOutcome> {
        let (group, suggestion) = self.suggestions.focused()?;
        let (group, suggestion) = (group.clone(), suggestion.clone());
        self.add_mention(value, &group, &suggestion)
    }

    /// Replaces the group's trigger sequence with a mention of `suggestion`
    /// and closes the suggestions.
    pub fn add_mention(
        &mut self,
        value: &str,
        group: &SuggestionGroup,
        suggestion: &Suggestion,
    ) -> Option<ChangeOutcome> {
        let source = self.sources.get(group.source)?;
        let transform = self.transform.as_ref();
        let inserted = insert_mention(
            value,
            &self.markup,
            &group.query,
            &group.plain_text,
            suggestion,
            source.kind.as_deref(),
            source.append_space_on_add,
            transform,
        );
        if let Some(on_add) = &source.on_add {
            on_add(&suggestion.id, suggestion.display_text());
        }
        let mentions = extract_mentions(&inserted.value, &self.markup, transform);
        let selection = Selection::caret(inserted.caret);

        self.selection = Some(selection);
        self.clear_suggestions();

        Some(ChangeOutcome {
            value: inserted.value,
            plain_text: inserted.plain_text,
            mentions,
            selection,
            restore_selection: true,
        })
    }

    /// Focus left the surface. A click on the suggestions keeps the selection
    /// so the clicked entry can still be inserted.
    pub fn blur(&mut self, clicked_suggestion: bool) {
        if !clicked_suggestion {
            self.selection = None;
        }
    }

    pub fn composition_start(&mut self) {
        self.composing = true;
    }

    pub fn composition_end(&mut self) {
        self.composing = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::DEFAULT_MARKUP;
    use pretty_assertions::assert_eq;
    use std::{cell::RefCell, rc::Rc};

    struct Deferred;

    impl DataProvider for Deferred {
        fn query(&self, _query: &str, _generation: QueryGeneration) -> ProviderResponse {
            ProviderResponse::Pending
        }
    }

    fn users() -> Box<dyn DataProvider> {
        Box::new(vec![
            Suggestion::new("1", "Alice"),
            Suggestion::new("2", "Albert"),
            Suggestion::new("3", "Bob"),
        ])
    }

    fn input() -> MentionsInput {
        let source = MentionSource::new(Some("user".into()), &Trigger::default(), false, users()).unwrap();
        MentionsInput::new(Markup::new(DEFAULT_MARKUP).unwrap()).with_source(source)
    }

    #[test]
    fn caret_after_trigger_queries_sources() {
        let mut input = input();
        input.handle_select("hey @al", "hey @al", 7, 7);

        assert_eq!(input.suggestions().len(), 2);
        let (group, first) = input.suggestions().focused().unwrap();
        assert_eq!(group.query.query, "al");
        assert_eq!(first.id, "1");
    }

    #[test]
    fn range_selection_closes_suggestions() {
        let mut input = input();
        input.handle_select("hey @al", "hey @al", 7, 7);
        input.handle_select("hey @al", "hey @al", 4, 7);
        assert!(input.suggestions().is_empty());
    }

    #[test]
    fn selecting_focused_suggestion_inserts_mention() {
        let mut input = input();
        input.handle_select("hey @al", "hey @al", 7, 7);
        input.shift_focus(1);

        let outcome = input.select_focused("hey @al").unwrap();
        assert_eq!(outcome.value, "hey @[2:user:Albert]");
        assert_eq!(outcome.plain_text, "hey Albert");
        assert_eq!(outcome.selection, Selection::caret(10));
        assert!(outcome.restore_selection);
        assert_eq!(
            outcome.mentions,
            vec![MentionOccurrence {
                id: "2".into(),
                display: "Albert".into(),
                kind: Some("user".into()),
                index: 4,
                plain_text_index: 4,
            }]
        );
        assert!(input.suggestions().is_empty());
    }

    #[test]
    fn adding_mention_notifies_its_source() {
        let added = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&added);
        let source = MentionSource::new(Some("user".into()), &Trigger::default(), false, users())
            .unwrap()
            .on_add(move |id, display| sink.borrow_mut().push((id.to_string(), display.to_string())));
        let mut input = MentionsInput::new(Markup::new(DEFAULT_MARKUP).unwrap()).with_source(source);

        input.handle_select("hey @al", "hey @al", 7, 7);
        input.select_focused("hey @al").unwrap();

        assert_eq!(*added.borrow(), vec![("1".to_string(), "Alice".to_string())]);
    }

    #[test]
    fn backspace_into_mention_moves_caret_to_its_start() {
        let mut input = MentionsInput::new(Markup::new("@[__id__:__display__]").unwrap());
        let value = "Hello @[1:Alice] and @[2:Bob]!";
        input.handle_select(value, "Hello Alice and Bob!", 11, 11);

        let outcome = input.handle_change(value, "Hello Alic and Bob!", 10, 10);
        assert_eq!(outcome.value, "Hello  and @[2:Bob]!");
        assert_eq!(outcome.plain_text, "Hello  and Bob!");
        assert_eq!(outcome.selection, Selection::caret(6));
        assert!(outcome.restore_selection);
        assert_eq!(outcome.mentions.len(), 1);
    }

    #[test]
    fn plain_typing_keeps_reported_selection() {
        let mut input = MentionsInput::new(Markup::new("@[__id__:__display__]").unwrap());
        input.handle_select("ab", "ab", 2, 2);
        let outcome = input.handle_change("ab", "abc", 3, 3);
        assert_eq!(outcome.value, "abc");
        assert_eq!(outcome.selection, Selection::caret(3));
        assert!(!outcome.restore_selection);
    }

    #[test]
    fn stale_async_results_are_dropped() {
        let source = MentionSource::new(None, &Trigger::default(), false, Box::new(Deferred)).unwrap();
        let mut input = MentionsInput::new(Markup::new("@[__id__:__display__]").unwrap()).with_source(source);

        input.handle_select("@a", "@a", 2, 2);
        let stale = input.generation();
        input.handle_select("@al", "@al", 3, 3);
        let current = input.generation();

        assert!(!input.receive_suggestions(stale, 0, vec![Suggestion::new("1", "Alice")]));
        assert!(input.suggestions().is_empty());

        assert!(input.receive_suggestions(current, 0, vec![Suggestion::new("1", "Alice")]));
        let (group, _) = input.suggestions().focused().unwrap();
        assert_eq!(group.query.query, "al");
    }

    #[test]
    fn selection_events_ignored_while_composing() {
        let mut input = input();
        input.composition_start();
        input.handle_select("hey @al", "hey @al", 7, 7);
        assert_eq!(input.selection(), None);
        assert!(input.suggestions().is_empty());

        input.composition_end();
        input.handle_select("hey @al", "hey @al", 7, 7);
        assert_eq!(input.selection(), Some(Selection::caret(7)));
    }

    #[test]
    fn blur_keeps_selection_when_suggestion_clicked() {
        let mut input = input();
        input.handle_select("hey", "hey", 3, 3);
        input.blur(true);
        assert!(input.selection().is_some());
        input.blur(false);
        assert!(input.selection().is_none());
    }
}
