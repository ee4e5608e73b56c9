/// Configuration errors raised while building a markup grammar or trigger.
///
/// These surface at setup time; no per-keystroke operation returns them.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error(
        "The markup `{markup}` must contain at least one of the placeholders `__id__` or `__display__`"
    )]
    MissingPlaceholder { markup: String },
    #[error("parameter name must be 'id', 'display', or 'type', got '{0}'")]
    UnknownParameter(String),
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}
