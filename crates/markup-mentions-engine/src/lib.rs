pub mod display;
pub mod editor;
pub mod error;
pub mod input;
pub mod mapping;
pub mod markup;
pub mod mentions;
pub mod projection;
pub mod scanner;
pub mod suggestions;
pub mod text;

// Re-export key types for easier usage
pub use display::{DisplayTransform, IdentityDisplay};
pub use editor::{PlainTextEdit, apply_edit};
pub use error::MarkupError;
pub use input::{ChangeOutcome, MentionSource, MentionsInput, Selection};
pub use mapping::{
    Boundary, InMentionPolicy, MentionLookup, find_mention_start_containing, is_inside_mention,
    markup_to_plain_index, plain_to_markup_boundary, plain_to_markup_index,
};
pub use markup::{DEFAULT_MARKUP, Markup, Placeholder, capturing_group_index};
pub use mentions::{MentionOccurrence, end_of_last_mention, extract_mentions};
pub use projection::{PlainAndStripped, plain_text, project};
pub use scanner::{MentionToken, Segment, TextRun, scan, segments};
pub use suggestions::{
    DataProvider, MentionQuery, ProviderResponse, QueryGeneration, Suggestion, SuggestionGroup,
    SuggestionList, Trigger, find_query, highlight, insert_mention, trigger_regex,
};
