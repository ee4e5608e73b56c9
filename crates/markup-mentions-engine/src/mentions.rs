use serde::{Deserialize, Serialize};

use crate::{
    display::DisplayTransform,
    markup::Markup,
    scanner::{Segment, segments},
};

/// A mention found in a marked-up value.
///
/// This is the payload handed to the host on every change, so it serializes
/// with the field names the host stores (`type`, `plainTextIndex`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionOccurrence {
    pub id: String,
    pub display: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Char offset of the mention markup in the marked-up value.
    pub index: usize,
    /// Char offset of the mention display in the plain text.
    pub plain_text_index: usize,
}

impl MentionOccurrence {
    pub fn plain_text_end(&self) -> usize {
        self.plain_text_index + crate::text::char_len(&self.display)
    }
}

/// Lists every mention in `value`, in document order.
pub fn extract_mentions(
    value: &str,
    markup: &Markup,
    transform: &dyn DisplayTransform,
) -> Vec<MentionOccurrence> {
    segments(value, markup, transform)
        .filter_map(|segment| match segment {
            Segment::Mention(token) => Some(MentionOccurrence {
                id: token.id.to_string(),
                kind: token.kind.map(str::to_string),
                index: token.markup_index,
                plain_text_index: token.plain_index,
                display: token.display,
            }),
            Segment::Text(_) => None,
        })
        .collect()
}

/// Plain-text offset just past the last mention in `value_prefix`, or 0.
///
/// Suggestion queries look back no further than this, so a query never spans
/// into an earlier mention.
pub fn end_of_last_mention(
    value_prefix: &str,
    markup: &Markup,
    transform: &dyn DisplayTransform,
) -> usize {
    extract_mentions(value_prefix, markup, transform)
        .last()
        .map_or(0, MentionOccurrence::plain_text_end)
}
