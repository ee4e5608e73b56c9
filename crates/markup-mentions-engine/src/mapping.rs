//! # Index Mapper
//!
//! Translates char offsets between the plain text and the marked-up value.
//!
//! An offset inside a text run maps linearly. An offset strictly inside a
//! mention's display has no counterpart in the other representation, so the
//! caller picks a policy: snap to the start of the mention, snap past its end,
//! or get `None` back. An offset past the end of the content maps to the end
//! of the other representation; text surfaces report such offsets routinely
//! while typing fast, so they are not an error.

use crate::{
    display::DisplayTransform,
    markup::Markup,
    scanner::{Segment, segments},
    text::char_len,
};

/// Resolution of an offset that falls inside a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InMentionPolicy {
    /// The first char of the mention.
    Start,
    /// Just past the last char of the mention.
    End,
    /// No valid position; the mapping yields `None`.
    Null,
}

/// Side of a mention to snap to when an offset lands inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Start,
    End,
}

impl From<Boundary> for InMentionPolicy {
    fn from(boundary: Boundary) -> Self {
        match boundary {
            Boundary::Start => InMentionPolicy::Start,
            Boundary::End => InMentionPolicy::End,
        }
    }
}

/// Result of looking for the mention around a plain-text offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionLookup {
    /// Plain-text start of the mention whose display covers the offset.
    Found(usize),
    NotInsideMention,
}

/// Where a plain-text offset lands in the marked-up value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Text(usize),
    Mention { start: usize, end: usize },
    PastEnd,
}

fn locate(value: &str, markup: &Markup, plain_index: usize, transform: &dyn DisplayTransform) -> Location {
    for segment in segments(value, markup, transform) {
        match segment {
            Segment::Text(run) => {
                if run.plain_end() >= plain_index {
                    return Location::Text((run.markup_index + plain_index).saturating_sub(run.plain_index));
                }
            }
            Segment::Mention(token) => {
                if token.plain_end() > plain_index {
                    return Location::Mention {
                        start: token.markup_index,
                        end: token.markup_end(),
                    };
                }
            }
        }
    }
    Location::PastEnd
}

/// Maps a plain-text offset to the marked-up value.
///
/// Returns `None` only with [`InMentionPolicy::Null`] when the offset is
/// strictly inside a mention. Offsets past the end of the plain text map to
/// the length of `value`.
pub fn plain_to_markup_index(
    value: &str,
    markup: &Markup,
    plain_index: usize,
    policy: InMentionPolicy,
    transform: &dyn DisplayTransform,
) -> Option<usize> {
    match locate(value, markup, plain_index, transform) {
        Location::Text(index) => Some(index),
        Location::Mention { start, end } => match policy {
            InMentionPolicy::Start => Some(start),
            InMentionPolicy::End => Some(end),
            InMentionPolicy::Null => None,
        },
        Location::PastEnd => Some(char_len(value)),
    }
}

/// Maps a plain-text offset to the marked-up value, snapping offsets inside a
/// mention to one of its edges.
pub fn plain_to_markup_boundary(
    value: &str,
    markup: &Markup,
    plain_index: usize,
    boundary: Boundary,
    transform: &dyn DisplayTransform,
) -> usize {
    match locate(value, markup, plain_index, transform) {
        Location::Text(index) => index,
        Location::Mention { start, end } => match boundary {
            Boundary::Start => start,
            Boundary::End => end,
        },
        Location::PastEnd => char_len(value),
    }
}

/// Maps an offset in the marked-up value to the plain text.
///
/// Offsets inside a mention's markup resolve by `policy` to the start or end
/// of its display, or `None`. Offsets past the end map to the plain-text
/// length.
pub fn markup_to_plain_index(
    value: &str,
    markup: &Markup,
    markup_index: usize,
    policy: InMentionPolicy,
    transform: &dyn DisplayTransform,
) -> Option<usize> {
    let mut plain_len = 0;
    for segment in segments(value, markup, transform) {
        match segment {
            Segment::Text(run) => {
                if run.markup_index + run.len() >= markup_index {
                    return Some((run.plain_index + markup_index).saturating_sub(run.markup_index));
                }
                plain_len = run.plain_end();
            }
            Segment::Mention(token) => {
                if token.markup_end() > markup_index {
                    return match policy {
                        InMentionPolicy::Start => Some(token.plain_index),
                        InMentionPolicy::End => Some(token.plain_end()),
                        InMentionPolicy::Null => None,
                    };
                }
                plain_len = token.plain_end();
            }
        }
    }
    Some(plain_len)
}

/// Finds the mention whose display covers `plain_index`.
///
/// The display span is half-open: an offset equal to the mention's start is
/// covered and yields `Found` with that same offset, the offset just past its
/// end is not.
pub fn find_mention_start_containing(
    value: &str,
    markup: &Markup,
    plain_index: usize,
    transform: &dyn DisplayTransform,
) -> MentionLookup {
    segments(value, markup, transform)
        .find_map(|segment| match segment {
            Segment::Mention(token)
                if token.plain_index <= plain_index && plain_index < token.plain_end() =>
            {
                Some(MentionLookup::Found(token.plain_index))
            }
            _ => None,
        })
        .unwrap_or(MentionLookup::NotInsideMention)
}

/// Whether `plain_index` lies strictly inside a mention's display.
pub fn is_inside_mention(
    value: &str,
    markup: &Markup,
    plain_index: usize,
    transform: &dyn DisplayTransform,
) -> bool {
    matches!(
        find_mention_start_containing(value, markup, plain_index, transform),
        MentionLookup::Found(start) if start != plain_index
    )
}
