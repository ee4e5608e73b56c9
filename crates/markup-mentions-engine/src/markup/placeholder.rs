use std::{fmt, str::FromStr};

use crate::error::MarkupError;

/// A substitutable slot in a markup template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    Id,
    Display,
    Type,
}

impl Placeholder {
    pub const ID: &'static str = "__id__";
    pub const DISPLAY: &'static str = "__display__";
    pub const TYPE: &'static str = "__type__";

    /// The literal token marking this slot in a template.
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::Id => Self::ID,
            Placeholder::Display => Self::DISPLAY,
            Placeholder::Type => Self::TYPE,
        }
    }

    /// The parameter name used when asking for a capturing group.
    pub fn name(self) -> &'static str {
        match self {
            Placeholder::Id => "id",
            Placeholder::Display => "display",
            Placeholder::Type => "type",
        }
    }

    /// Char offset of the first occurrence of this placeholder in `template`.
    pub fn position_in(self, template: &str) -> Option<usize> {
        template
            .find(self.token())
            .map(|byte| crate::text::char_len(&template[..byte]))
    }
}

impl FromStr for Placeholder {
    type Err = MarkupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Placeholder::Id),
            "display" => Ok(Placeholder::Display),
            "type" => Ok(Placeholder::Type),
            other => Err(MarkupError::UnknownParameter(other.to_string())),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
