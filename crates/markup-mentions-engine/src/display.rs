/// Customises how a mention's display text appears in the plain text.
///
/// Implementations must be pure for the duration of one engine call: the
/// same `(id, display, kind)` has to produce the same string, otherwise the
/// offsets computed by separate scans of one value disagree.
pub trait DisplayTransform {
    fn transform(&self, id: &str, display: &str, kind: Option<&str>) -> String;
}

/// Renders a mention as its raw display text.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityDisplay;

impl DisplayTransform for IdentityDisplay {
    fn transform(&self, _id: &str, display: &str, _kind: Option<&str>) -> String {
        display.to_string()
    }
}

impl<F> DisplayTransform for F
where
    F: Fn(&str, &str, Option<&str>) -> String,
{
    fn transform(&self, id: &str, display: &str, kind: Option<&str>) -> String {
        self(id, display, kind)
    }
}
