//! # Markup Editor
//!
//! Carries an edit made to the plain text back onto the marked-up value.
//!
//! The text surface only reports what it shows: the new plain text plus the
//! selection before and after the change. From that the editor works out the
//! inserted text and the plain-text range it replaced, maps the range into
//! the marked-up value, and splices. Range ends that land inside a mention
//! snap outwards, so a partially deleted mention disappears whole and a
//! mention outside the range is never cut.
//!
//! Surfaces sometimes change more than they report: combining-character
//! input replaces a character without moving the caret, and platform
//! autocorrect rewrites text before the caret. Both are detected and the
//! splice is widened to match what the surface actually displays.

use crate::{
    display::DisplayTransform,
    mapping::{Boundary, InMentionPolicy, plain_to_markup_boundary, plain_to_markup_index},
    markup::Markup,
    projection::plain_text,
    text::{char_len, char_slice, char_tail, common_prefix_len, rfind_char_index, splice_string},
};

/// A change reported by the plain-text surface.
///
/// All offsets are plain-text char offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlainTextEdit<'a> {
    /// The full plain text after the change.
    pub new_plain_text: &'a str,
    pub selection_start_before: Option<usize>,
    pub selection_end_before: Option<usize>,
    /// Caret (selection end) after the change.
    pub selection_end_after: usize,
}

impl<'a> PlainTextEdit<'a> {
    pub fn new(
        new_plain_text: &'a str,
        selection_start_before: usize,
        selection_end_before: usize,
        selection_end_after: usize,
    ) -> Self {
        Self {
            new_plain_text,
            selection_start_before: Some(selection_start_before),
            selection_end_before: Some(selection_end_before),
            selection_end_after,
        }
    }

    /// An edit reported without the selection that preceded it. The prior
    /// caret is inferred from the length change.
    pub fn without_prior_selection(new_plain_text: &'a str, selection_end_after: usize) -> Self {
        Self {
            new_plain_text,
            selection_start_before: None,
            selection_end_before: None,
            selection_end_after,
        }
    }
}

/// Applies a plain-text edit to `old_value` and returns the new marked-up
/// value. Never fails; malformed selections clamp.
pub fn apply_edit(
    old_value: &str,
    markup: &Markup,
    edit: &PlainTextEdit<'_>,
    transform: &dyn DisplayTransform,
) -> String {
    let new_plain = edit.new_plain_text;
    let old_plain = plain_text(old_value, markup, transform);
    let old_len = char_len(&old_plain);
    let new_len = char_len(new_plain);
    let length_delta = old_len as isize - new_len as isize;
    let end_after = edit.selection_end_after;

    let mut start_before = edit
        .selection_start_before
        .unwrap_or_else(|| shift(end_after, length_delta));
    let end_before = edit.selection_end_before.unwrap_or(start_before);

    // Combining input replaces the char before an unmoved caret.
    if start_before == end_before && end_before == end_after && old_len == new_len {
        start_before = start_before.saturating_sub(1);
    }

    let insert = char_slice(new_plain, start_before, end_after);
    let splice_start = start_before.min(end_after);
    let splice_end = if start_before == end_after {
        // Collapsed deletion: cover whatever went missing past the caret.
        end_before.max(shift(start_before, length_delta))
    } else {
        end_before
    };

    let new_value = splice_mapped(old_value, markup, splice_start, splice_end, insert, transform);

    let removes_mention =
        plain_to_markup_index(old_value, markup, splice_start, InMentionPolicy::Null, transform)
            .is_none()
            || plain_to_markup_index(old_value, markup, splice_end, InMentionPolicy::Null, transform)
                .is_none();
    if removes_mention {
        // Display and markup lengths of the cut mention diverge, so the
        // plain texts cannot be compared for autocorrect.
        log::debug!("edit [{splice_start}, {splice_end}) removes a mention");
        return new_value;
    }

    let control = plain_text(&new_value, markup, transform);
    if control == new_plain {
        return new_value;
    }

    reconcile_autocorrect(
        old_value,
        markup,
        &old_plain,
        new_plain,
        &control,
        end_after,
        splice_end,
        transform,
    )
}

/// Re-splices when the surface changed more text than the edit reported.
///
/// The true insertion runs from the first char where the surface text and
/// our result disagree up to the caret. The true deletion ends where the
/// text after the caret last occurs in the old plain text; with a short or
/// repeated remainder that search can settle on the wrong occurrence.
#[allow(clippy::too_many_arguments)]
fn reconcile_autocorrect(
    old_value: &str,
    markup: &Markup,
    old_plain: &str,
    new_plain: &str,
    control: &str,
    end_after: usize,
    nominal_end: usize,
    transform: &dyn DisplayTransform,
) -> String {
    let splice_start = common_prefix_len(new_plain, control);
    let insert = char_slice(new_plain, splice_start, end_after);
    let remainder = char_tail(new_plain, end_after);
    let splice_end = rfind_char_index(old_plain, remainder).unwrap_or(nominal_end);

    log::debug!(
        "autocorrect detected, re-splicing [{splice_start}, {splice_end}) with {insert:?}"
    );

    splice_mapped(old_value, markup, splice_start, splice_end, insert, transform)
}

/// Splices `insert` over the plain-text range `[start, end)`, widened to
/// whole mentions.
fn splice_mapped(
    value: &str,
    markup: &Markup,
    start: usize,
    end: usize,
    insert: &str,
    transform: &dyn DisplayTransform,
) -> String {
    let mapped_start = plain_to_markup_boundary(value, markup, start, Boundary::Start, transform);
    let mapped_end = plain_to_markup_boundary(value, markup, end, Boundary::End, transform);
    splice_string(value, mapped_start, mapped_end, insert)
}

fn shift(offset: usize, delta: isize) -> usize {
    offset.saturating_add_signed(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{display::IdentityDisplay, mentions::extract_mentions};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const VALUE: &str = "Hello @[1:Alice] and @[2:Bob]!";

    fn markup() -> Markup {
        Markup::new("@[__id__:__display__]").unwrap()
    }

    fn edit(value: &str, new_plain: &str, start: usize, end: usize, after: usize) -> String {
        apply_edit(
            value,
            &markup(),
            &PlainTextEdit::new(new_plain, start, end, after),
            &IdentityDisplay,
        )
    }

    #[test]
    fn deleting_selected_mention_keeps_others() {
        assert_eq!(edit(VALUE, "Hello  and Bob!", 6, 11, 6), "Hello  and @[2:Bob]!");
    }

    #[rstest]
    #[case::typing_at_end("Hello Alice and Bob!X", 20, 20, 21, "Hello @[1:Alice] and @[2:Bob]!X")]
    #[case::typing_at_start("XHello Alice and Bob!", 0, 0, 1, "XHello @[1:Alice] and @[2:Bob]!")]
    #[case::typing_between_mention_and_text("Hello Alice, and Bob!", 11, 11, 12, "Hello @[1:Alice], and @[2:Bob]!")]
    #[case::replacing_a_word("Hello Alice or Bob!", 12, 15, 14, "Hello @[1:Alice] or @[2:Bob]!")]
    #[case::backspace_in_text("Hell Alice and Bob!", 5, 5, 4, "Hell @[1:Alice] and @[2:Bob]!")]
    #[case::forward_delete("Hello Aliceand Bob!", 11, 11, 11, "Hello @[1:Alice]and @[2:Bob]!")]
    fn edits_outside_mentions(
        #[case] new_plain: &str,
        #[case] start: usize,
        #[case] end: usize,
        #[case] after: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(edit(VALUE, new_plain, start, end, after), expected);
    }

    #[test]
    fn backspace_at_mention_end_removes_whole_mention() {
        assert_eq!(edit(VALUE, "Hello Alic and Bob!", 11, 11, 10), "Hello  and @[2:Bob]!");
    }

    #[test]
    fn backspace_inside_trailing_mention() {
        assert_eq!(edit("Hi @[1:Bob]", "Hi Bo", 6, 6, 5), "Hi ");
    }

    #[test]
    fn typing_inside_mention_replaces_it() {
        assert_eq!(edit("Hi @[1:Bob]!", "Hi Boxb!", 5, 5, 6), "Hi x!");
    }

    #[test]
    fn selection_spanning_two_mentions() {
        assert_eq!(edit(VALUE, "Hello !", 6, 19, 6), "Hello !");
    }

    #[test]
    fn combining_character_replaces_previous_char() {
        assert_eq!(edit("cafe @[1:Bob]", "café Bob", 4, 4, 4), "café @[1:Bob]");
    }

    #[test]
    fn edit_without_prior_selection_infers_caret() {
        let result = apply_edit(
            VALUE,
            &markup(),
            &PlainTextEdit::without_prior_selection("Hello Alice and Bob!?", 21),
            &IdentityDisplay,
        );
        assert_eq!(result, "Hello @[1:Alice] and @[2:Bob]!?");
    }

    #[test]
    fn autocorrect_before_caret_is_reconciled() {
        // The surface turned "teh" into "the" while the user typed a space.
        assert_eq!(edit("@[1:Bob] teh", "Bob the ", 7, 7, 8), "@[1:Bob] the ");
    }

    #[test]
    fn untouched_mentions_survive_every_single_char_deletion() {
        let m = markup();
        let plain = "Hello Alice and Bob!";
        for caret in 1..=char_len(plain) {
            let new_plain = format!(
                "{}{}",
                char_slice(plain, 0, caret - 1),
                char_tail(plain, caret)
            );
            let result = edit(VALUE, &new_plain, caret, caret, caret - 1);
            for mention in extract_mentions(&result, &m, &IdentityDisplay) {
                assert!(
                    (mention.id == "1" && mention.display == "Alice")
                        || (mention.id == "2" && mention.display == "Bob"),
                    "mangled mention {mention:?} after deleting at {caret}: {result}"
                );
            }
            let survivors = extract_mentions(&result, &m, &IdentityDisplay).len();
            let touched = usize::from((7..=11).contains(&caret)) + usize::from((17..=19).contains(&caret));
            assert_eq!(survivors, 2 - touched, "deleting at {caret}: {result}");
        }
    }
}
