//! Markdown to sanitized HTML.

use ammonia::Builder;
use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use tracing::error;

use crate::config::Settings;
use crate::error::RenderError;
use crate::utils::html_escape;

use super::highlight::Highlighter;
use super::trusted::TrustedHtml;

/// Shown in place of output that could not be rendered.
pub const RENDER_FAILURE_MESSAGE: &str =
    "Error formatting results. Please check the logs for details.";

pub struct MarkupRenderer {
    highlighter: Highlighter,
    sanitizer: Builder<'static>,
}

impl MarkupRenderer {
    pub fn new(highlight_languages: &[String], fallback_language: &str) -> Self {
        let mut sanitizer = Builder::default();
        sanitizer.add_generic_attributes(&["class"]);
        Self {
            highlighter: Highlighter::new(highlight_languages, fallback_language),
            sanitizer,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.highlight_languages, &settings.fallback_language)
    }

    /// Render markup, replacing any failure with [`RENDER_FAILURE_MESSAGE`].
    pub fn render(&self, markup: &str) -> TrustedHtml {
        match self.try_render(markup) {
            Ok(html) => html,
            Err(e) => {
                error!("Error formatting results: {}", e);
                Self::failure()
            }
        }
    }

    /// The fixed failure notice as a paragraph.
    pub fn failure() -> TrustedHtml {
        TrustedHtml::new(format!(
            "<p class=\"render-error\">{}</p>\n",
            html_escape(RENDER_FAILURE_MESSAGE)
        ))
    }

    /// Render markup, surfacing highlighting failures.
    pub fn try_render(&self, markup: &str) -> Result<TrustedHtml, RenderError> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);

        let mut events = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in Parser::new_ext(markup, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((language, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((language, code)) = code_block.take() {
                        let html = self.highlighter.highlight(&code, language.as_deref())?;
                        events.push(Event::Html(html.into()));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::SoftBreak => events.push(Event::HardBreak),
                other => events.push(other),
            }
        }

        let mut raw = String::with_capacity(markup.len() * 3 / 2);
        html::push_html(&mut raw, events.into_iter());

        Ok(TrustedHtml::new(self.sanitizer.clean(&raw).to_string()))
    }
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
