use crate::error::MarkupError;

use super::placeholder::Placeholder;

/// Which capture group of the match pattern holds each mention parameter.
///
/// Group ordinals are 0-based and follow the order the placeholders appear in
/// the template. When a template carries only one of `__id__` and
/// `__display__`, both parameters read from that single group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLayout {
    pub id: usize,
    pub display: usize,
    pub kind: Option<usize>,
}

impl GroupLayout {
    pub fn from_template(template: &str) -> Result<Self, MarkupError> {
        let id = capturing_group_for(template, Placeholder::Id)?;
        let display = capturing_group_for(template, Placeholder::Display)?;
        let kind = capturing_group_for(template, Placeholder::Type)?;
        // Both mandatory lookups succeeded, so neither can be absent.
        match (id, display) {
            (Some(id), Some(display)) => Ok(Self { id, display, kind }),
            _ => Err(missing_placeholder(template)),
        }
    }
}

/// Returns the ordinal of the capture group holding `param_name`.
///
/// `param_name` is one of `"id"`, `"display"` or `"type"`. Only `"type"` can
/// resolve to `None`, when the template has no `__type__` placeholder.
pub fn capturing_group_index(
    template: &str,
    param_name: &str,
) -> Result<Option<usize>, MarkupError> {
    let placeholder: Placeholder = param_name.parse()?;
    capturing_group_for(template, placeholder)
}

pub(crate) fn capturing_group_for(
    template: &str,
    placeholder: Placeholder,
) -> Result<Option<usize>, MarkupError> {
    let mut display = Placeholder::Display.position_in(template);
    let mut id = Placeholder::Id.position_in(template);
    let kind = Placeholder::Type.position_in(template);

    if display.is_none() && id.is_none() {
        return Err(missing_placeholder(template));
    }

    if placeholder == Placeholder::Type && kind.is_none() {
        return Ok(None);
    }

    let mut sorted: Vec<usize> = [display, id, kind].into_iter().flatten().collect();
    sorted.sort_unstable();

    // A lone id or display placeholder serves both parameters.
    if display.is_none() {
        display = id;
    }
    if id.is_none() {
        id = display;
    }

    let position = match placeholder {
        Placeholder::Id => id,
        Placeholder::Display => display,
        Placeholder::Type => kind,
    };
    Ok(position.and_then(|p| sorted.iter().position(|&s| s == p)))
}

fn missing_placeholder(template: &str) -> MarkupError {
    MarkupError::MissingPlaceholder {
        markup: template.to_string(),
    }
}
