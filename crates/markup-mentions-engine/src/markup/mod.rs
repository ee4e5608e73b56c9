//! # Markup Grammar
//!
//! A markup template such as `@[__id__:__display__]` defines how a mention is
//! serialized inside the marked-up value. Everything around the placeholders
//! is literal text.
//!
//! ## Modules
//!
//! - **`placeholder`**: `Placeholder` enum owning the `__id__`, `__display__`
//!   and `__type__` tokens
//! - **`layout`**: `GroupLayout` and `capturing_group_index()`, mapping each
//!   parameter to its capture group
//!
//! ## Matching
//!
//! Each placeholder present becomes a non-greedy `(.+?)` group, so a value
//! like `@[1:Alice] and @[2:Bob]` yields two matches rather than one spanning
//! both mentions. Only the first occurrence of a placeholder token is
//! substituted.

pub mod layout;
pub mod placeholder;

use regex::Regex;

use crate::error::MarkupError;

pub use layout::{GroupLayout, capturing_group_index};
pub use placeholder::Placeholder;

/// Template used when none is configured.
pub const DEFAULT_MARKUP: &str = "@[__id__:__type__:__display__]";

const CAPTURE: &str = "(.+?)";

/// A validated markup template with its compiled match pattern.
#[derive(Debug, Clone)]
pub struct Markup {
    template: String,
    pattern: Regex,
    layout: GroupLayout,
}

impl Markup {
    /// Validates `template` and compiles its match pattern.
    pub fn new(template: impl Into<String>) -> Result<Self, MarkupError> {
        let template = template.into();
        let layout = GroupLayout::from_template(&template)?;
        let pattern = build_match_pattern(&template, false)?;
        Ok(Self {
            template,
            pattern,
            layout,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    pub fn layout(&self) -> GroupLayout {
        self.layout
    }

    /// Whether the template carries a `__type__` placeholder.
    pub fn has_type(&self) -> bool {
        self.layout.kind.is_some()
    }

    /// Serializes one mention with this template.
    ///
    /// A `None` kind renders as the literal `null`; supply a kind whenever the
    /// template has a `__type__` placeholder.
    pub fn render(&self, id: &str, display: &str, kind: Option<&str>) -> String {
        render_markup(&self.template, id, display, kind)
    }
}

/// Builds the regex matching one mention of `template`.
///
/// With `match_at_end` the pattern only matches a mention that closes the
/// input.
pub fn build_match_pattern(template: &str, match_at_end: bool) -> Result<Regex, MarkupError> {
    if Placeholder::Id.position_in(template).is_none()
        && Placeholder::Display.position_in(template).is_none()
    {
        return Err(MarkupError::MissingPlaceholder {
            markup: template.to_string(),
        });
    }

    let mut source = regex::escape(template);
    for placeholder in [Placeholder::Display, Placeholder::Id, Placeholder::Type] {
        source = source.replacen(placeholder.token(), CAPTURE, 1);
    }
    if match_at_end {
        source.push('$');
    }
    Ok(Regex::new(&source)?)
}

/// Substitutes each placeholder of `template` with its value.
pub fn render_markup(template: &str, id: &str, display: &str, kind: Option<&str>) -> String {
    template
        .replacen(Placeholder::ID, id, 1)
        .replacen(Placeholder::DISPLAY, display, 1)
        .replacen(Placeholder::TYPE, kind.unwrap_or("null"), 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_escapes_literals() {
        let re = build_match_pattern("@[__id__:__display__]", false).unwrap();
        assert_eq!(re.as_str(), r"@\[(.+?):(.+?)\]");
    }

    #[test]
    fn pattern_anchored_at_end() {
        let re = build_match_pattern("@[__id__:__display__]", true).unwrap();
        assert!(re.is_match("hi @[1:Bob]"));
        assert!(!re.is_match("@[1:Bob] hi"));
    }

    #[test]
    fn pattern_is_non_greedy() {
        let re = build_match_pattern("@[__id__:__display__]", false).unwrap();
        let found: Vec<_> = re.find_iter("@[1:Alice] and @[2:Bob]").map(|m| m.as_str()).collect();
        assert_eq!(found, vec!["@[1:Alice]", "@[2:Bob]"]);
    }

    #[test]
    fn pattern_requires_id_or_display() {
        assert!(matches!(
            build_match_pattern("@[__type__]", false),
            Err(MarkupError::MissingPlaceholder { .. })
        ));
        assert!(Markup::new("plain text").is_err());
    }

    #[test]
    fn render_substitutes_placeholders() {
        let markup = Markup::new(DEFAULT_MARKUP).unwrap();
        assert_eq!(markup.render("7", "Alice", Some("user")), "@[7:user:Alice]");
        assert_eq!(markup.render("7", "Alice", None), "@[7:null:Alice]");
    }

    #[test]
    fn render_without_type_placeholder_ignores_kind() {
        let markup = Markup::new("@[__id__:__display__]").unwrap();
        assert!(!markup.has_type());
        assert_eq!(markup.render("1", "Bob", Some("user")), "@[1:Bob]");
    }
}
