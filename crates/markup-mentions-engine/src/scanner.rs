//! # Markup Scanner
//!
//! Walks a marked-up value left to right, splitting it into literal text runs
//! and mention tokens while tracking offsets in both the marked-up string and
//! the plain text it renders to.
//!
//! Every mention is preceded by a text run, even an empty one when two
//! mentions touch or the value opens with a mention. Index mapping relies on
//! this: an offset exactly at a mention's start resolves to the run before it
//! and is never treated as inside the mention. A trailing run is only emitted
//! when text remains after the last mention.

use regex::{CaptureMatches, Captures};

use crate::{display::DisplayTransform, markup::Markup, text::char_len};

/// Literal text between mentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    /// Char offset of the run in the marked-up value.
    pub markup_index: usize,
    /// Char offset of the run in the plain text.
    pub plain_index: usize,
}

impl TextRun<'_> {
    pub fn len(&self) -> usize {
        char_len(self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn plain_end(&self) -> usize {
        self.plain_index + self.len()
    }
}

/// One matched mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionToken<'a> {
    /// The raw markup of the mention.
    pub matched: &'a str,
    pub markup_index: usize,
    pub plain_index: usize,
    pub id: &'a str,
    /// Display text after the display transform.
    pub display: String,
    pub kind: Option<&'a str>,
    /// Markup offset where the scan resumed before reaching this mention,
    /// i.e. the end of the previous mention or 0.
    pub prior_scan_index: usize,
}

impl MentionToken<'_> {
    pub fn markup_end(&self) -> usize {
        self.markup_index + char_len(self.matched)
    }

    pub fn display_len(&self) -> usize {
        char_len(&self.display)
    }

    pub fn plain_end(&self) -> usize {
        self.plain_index + self.display_len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(TextRun<'a>),
    Mention(MentionToken<'a>),
}

/// Lazy iterator over the segments of a marked-up value.
pub struct Segments<'a> {
    value: &'a str,
    markup: &'a Markup,
    transform: &'a dyn DisplayTransform,
    captures: CaptureMatches<'a, 'a>,
    /// Byte and char offsets just past the previous mention.
    resume_byte: usize,
    resume_char: usize,
    plain_index: usize,
    pending: Option<MentionToken<'a>>,
    finished: bool,
}

/// Splits `value` into text runs and mentions in document order.
pub fn segments<'a>(
    value: &'a str,
    markup: &'a Markup,
    transform: &'a dyn DisplayTransform,
) -> Segments<'a> {
    Segments {
        value,
        markup,
        transform,
        captures: markup.pattern().captures_iter(value),
        resume_byte: 0,
        resume_char: 0,
        plain_index: 0,
        pending: None,
        finished: false,
    }
}

/// Callback form of [`segments`].
pub fn scan<'a>(
    value: &'a str,
    markup: &'a Markup,
    transform: &'a dyn DisplayTransform,
    mut on_text: impl FnMut(&TextRun<'a>),
    mut on_mention: impl FnMut(&MentionToken<'a>),
) {
    for segment in segments(value, markup, transform) {
        match &segment {
            Segment::Text(run) => on_text(run),
            Segment::Mention(token) => on_mention(token),
        }
    }
}

impl<'a> Segments<'a> {
    fn group(&self, caps: &Captures<'a>, ordinal: usize) -> &'a str {
        caps.get(ordinal + 1).map_or("", |m| m.as_str())
    }

    fn trailing_run(&mut self) -> Option<Segment<'a>> {
        if self.resume_byte >= self.value.len() {
            return None;
        }
        let text = &self.value[self.resume_byte..];
        let run = TextRun {
            text,
            markup_index: self.resume_char,
            plain_index: self.plain_index,
        };
        self.resume_byte = self.value.len();
        self.plain_index += char_len(text);
        Some(Segment::Text(run))
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.take() {
            return Some(Segment::Mention(token));
        }
        if self.finished {
            return None;
        }

        let Some(caps) = self.captures.next() else {
            self.finished = true;
            return self.trailing_run();
        };
        let Some(whole) = caps.get(0) else {
            self.finished = true;
            return self.trailing_run();
        };

        let gap = &self.value[self.resume_byte..whole.start()];
        let gap_len = char_len(gap);
        let run = TextRun {
            text: gap,
            markup_index: self.resume_char,
            plain_index: self.plain_index,
        };
        self.plain_index += gap_len;

        let layout = self.markup.layout();
        let id = self.group(&caps, layout.id);
        let raw_display = self.group(&caps, layout.display);
        let kind = layout.kind.map(|ordinal| self.group(&caps, ordinal));
        let display = self.transform.transform(id, raw_display, kind);

        let markup_index = self.resume_char + gap_len;
        let token = MentionToken {
            matched: whole.as_str(),
            markup_index,
            plain_index: self.plain_index,
            id,
            kind,
            prior_scan_index: self.resume_char,
            display,
        };

        self.plain_index += token.display_len();
        self.resume_byte = whole.end();
        self.resume_char = token.markup_end();
        self.pending = Some(token);

        Some(Segment::Text(run))
    }
}
