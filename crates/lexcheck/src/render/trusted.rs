use std::fmt;

/// HTML that has been through the sanitizer.
///
/// Only this crate can build one, so anything holding a `TrustedHtml` came
/// out of [`MarkupRenderer`](super::MarkupRenderer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    pub(crate) fn new(html: String) -> Self {
        Self(html)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
