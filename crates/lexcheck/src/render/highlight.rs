//! Class-based syntax highlighting for fenced code blocks.

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::error::RenderError;

/// Syntax highlighting for fenced code blocks, limited to a configured set
/// of languages.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    supported: Vec<String>,
    fallback: String,
}

impl Highlighter {
    /// `supported` are the languages highlighted as declared; anything else
    /// is highlighted as `fallback`.
    pub fn new(supported: &[String], fallback: &str) -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            supported: supported.iter().map(|l| l.to_lowercase()).collect(),
            fallback: fallback.to_lowercase(),
        }
    }

    /// Language a block declared as `declared` is highlighted with.
    pub fn resolve(&self, declared: Option<&str>) -> &str {
        declared
            .map(str::to_lowercase)
            .and_then(|lang| {
                self.supported
                    .iter()
                    .find(|s| **s == lang)
                    .filter(|s| self.syntaxes.find_syntax_by_token(s).is_some())
            })
            .map(String::as_str)
            .unwrap_or(self.fallback.as_str())
    }

    /// `<pre><code class="language-…">` with token spans.
    pub fn highlight(&self, code: &str, declared: Option<&str>) -> Result<String, RenderError> {
        let language = self.resolve(declared);
        let syntax = self.syntax_for(language)?;

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| RenderError::Highlight {
                    language: language.to_string(),
                    message: e.to_string(),
                })?;
        }

        Ok(format!(
            "<pre><code class=\"language-{}\">{}</code></pre>\n",
            language,
            generator.finalize()
        ))
    }

    fn syntax_for(&self, language: &str) -> Result<&SyntaxReference, RenderError> {
        self.syntaxes
            .find_syntax_by_token(language)
            .ok_or_else(|| RenderError::UnknownSyntax(language.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighter() -> Highlighter {
        let langs: Vec<String> = ["javascript", "python", "json"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Highlighter::new(&langs, "javascript")
    }

    #[test]
    fn test_resolve() {
        let h = highlighter();
        assert_eq!(h.resolve(Some("python")), "python");
        assert_eq!(h.resolve(Some("JSON")), "json");
        assert_eq!(h.resolve(Some("cobol")), "javascript");
        assert_eq!(h.resolve(Some("rust")), "javascript");
        assert_eq!(h.resolve(None), "javascript");
    }

    #[test]
    fn test_highlight_wraps_in_language_class() {
        let h = highlighter();
        let html = h.highlight("def f():\n    return 1\n", Some("python")).unwrap();
        assert!(html.starts_with("<pre><code class=\"language-python\">"));
        assert!(html.contains("<span class=\""));
        assert!(html.contains("return"));
    }

    #[test]
    fn test_highlight_escapes_code() {
        let h = highlighter();
        let html = h.highlight("if (a < b && c) {}\n", None).unwrap();
        assert!(html.contains("&lt;"));
        assert!(!html.contains("a < b"));
    }

    #[test]
    fn test_unknown_fallback_is_an_error() {
        let h = Highlighter::new(&[], "no-such-language");
        assert!(matches!(
            h.highlight("x", None),
            Err(RenderError::UnknownSyntax(_))
        ));
    }
}
