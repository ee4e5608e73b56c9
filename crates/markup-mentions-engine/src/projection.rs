use serde::Serialize;

use crate::{
    display::DisplayTransform,
    markup::Markup,
    scanner::{Segment, segments},
};

/// The two renderings of a marked-up value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlainAndStripped {
    /// Mentions replaced by their (transformed) display text.
    pub plain: String,
    /// Mentions removed entirely.
    pub stripped: String,
}

/// Renders `value` as the text the user sees, and without any mentions.
pub fn project(value: &str, markup: &Markup, transform: &dyn DisplayTransform) -> PlainAndStripped {
    let mut plain = String::with_capacity(value.len());
    let mut stripped = String::with_capacity(value.len());
    for segment in segments(value, markup, transform) {
        match segment {
            Segment::Text(run) => {
                plain.push_str(run.text);
                stripped.push_str(run.text);
            }
            Segment::Mention(token) => plain.push_str(&token.display),
        }
    }
    PlainAndStripped { plain, stripped }
}

/// The text the user sees for `value`.
pub fn plain_text(value: &str, markup: &Markup, transform: &dyn DisplayTransform) -> String {
    segments(value, markup, transform)
        .map(|segment| match segment {
            Segment::Text(run) => run.text.to_string(),
            Segment::Mention(token) => token.display,
        })
        .collect()
}
