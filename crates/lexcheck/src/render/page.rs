//! Standalone HTML report.

use crate::error::FormatError;
use crate::results::{ExtractionSummary, TabularRow};
use crate::utils::{format_size, html_escape};

use super::trusted::TrustedHtml;

const STYLE: &str = r#"
    body { font-family: system-ui, sans-serif; max-width: 60rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
    header { border-bottom: 1px solid #ddd; margin-bottom: 1.5rem; }
    .meta { color: #666; font-size: 0.875rem; }
    .error { background: #fdecea; border: 1px solid #f44336; border-radius: 4px; padding: 0.75rem 1rem; color: #b71c1c; }
    .notice { background: #fff8e1; border: 1px solid #ffb300; border-radius: 4px; padding: 0.75rem 1rem; }
    table.extraction { width: 100%; border-collapse: collapse; }
    table.extraction th, table.extraction td { border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; vertical-align: top; }
    pre { background: #f5f5f5; padding: 0.75rem; overflow-x: auto; }
    .summary span { margin-right: 1.5rem; }
"#;

/// Overall outcome shown at the top of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Complete,
    Partial,
    Failed,
}

impl ReportStatus {
    fn label(self) -> &'static str {
        match self {
            ReportStatus::Complete => "Analysis Results",
            ReportStatus::Partial => "Analysis Results (partial)",
            ReportStatus::Failed => "Error",
        }
    }
}

/// Builder for a report page. Raw HTML is only accepted as [`TrustedHtml`].
#[derive(Debug, Default)]
pub struct ReportPage<'a> {
    title: &'a str,
    document: Option<(&'a str, u64)>,
    analysis: Option<&'a str>,
    body: Option<&'a TrustedHtml>,
    rows: Option<&'a [TabularRow]>,
    notices: &'a [FormatError],
    error: Option<String>,
}

impl<'a> ReportPage<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            ..Default::default()
        }
    }

    pub fn document(mut self, name: &'a str, size_bytes: u64) -> Self {
        self.document = Some((name, size_bytes));
        self
    }

    pub fn analysis(mut self, label: &'a str) -> Self {
        self.analysis = Some(label);
        self
    }

    pub fn body(mut self, html: &'a TrustedHtml) -> Self {
        self.body = Some(html);
        self
    }

    pub fn rows(mut self, rows: &'a [TabularRow]) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn notices(mut self, notices: &'a [FormatError]) -> Self {
        self.notices = notices;
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub fn status(&self) -> ReportStatus {
        if self.error.is_some() {
            ReportStatus::Failed
        } else if !self.notices.is_empty() {
            ReportStatus::Partial
        } else {
            ReportStatus::Complete
        }
    }

    pub fn render(&self) -> String {
        let mut meta = String::new();
        if let Some((name, size)) = self.document {
            meta.push_str(&format!(
                "<span>{} ({})</span> ",
                html_escape(name),
                format_size(size)
            ));
        }
        if let Some(label) = self.analysis {
            meta.push_str(&format!("<span>{}</span>", html_escape(label)));
        }

        let mut content = String::new();
        if let Some(ref message) = self.error {
            content.push_str(&format!(
                r#"<div class="error"><p>{}</p></div>"#,
                html_escape(message)
            ));
        }
        if !self.notices.is_empty() {
            content.push_str(&notices_section(self.notices));
        }
        if let Some(rows) = self.rows {
            content.push_str(&extraction_table(rows));
        } else if let Some(body) = self.body {
            content.push_str(&format!(
                r#"<div class="markdown-content">{}</div>"#,
                body.as_str()
            ));
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - lexcheck</title>
    <style>{style}</style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <p class="meta">{meta}</p>
    </header>
    <main>
        <h3>{status}</h3>
        {content}
    </main>
</body>
</html>
"#,
            title = html_escape(self.title),
            style = STYLE,
            meta = meta,
            status = self.status().label(),
            content = content,
        )
    }
}

fn notices_section(notices: &[FormatError]) -> String {
    let items: String = notices
        .iter()
        .map(|n| format!("<li>{}</li>", html_escape(&n.to_string())))
        .collect();
    format!(
        r#"<div class="notice"><p>Some parts of the result could not be displayed:</p><ul>{}</ul></div>"#,
        items
    )
}

fn extraction_table(rows: &[TabularRow]) -> String {
    let summary = ExtractionSummary::from_rows(rows);
    let show_section = rows.iter().any(|r| r.section.is_some());

    let mut body = String::new();
    for row in rows {
        let section = if show_section {
            format!(
                "<td>{}</td>",
                html_escape(row.section.as_deref().unwrap_or(""))
            )
        } else {
            String::new()
        };
        body.push_str(&format!(
            r#"
            <tr>
                <td>{}</td>
                <td>{}</td>
                {}<td>{}</td>
            </tr>"#,
            html_escape(&row.term),
            html_escape(&row.value),
            section,
            html_escape(&row.timestamp)
        ));
    }

    format!(
        r#"
    <p class="summary">
        <span>Terms: {total}</span>
        <span>Found: {found}</span>
        <span>Sections located: {sections}</span>
        <span>Completion: {rate}</span>
    </p>
    <table class="extraction">
        <thead>
            <tr>
                <th>term</th>
                <th>extracted_value</th>
                {section_header}<th>timestamp</th>
            </tr>
        </thead>
        <tbody>{body}
        </tbody>
    </table>
    "#,
        total = summary.total_terms,
        found = summary.terms_found,
        sections = summary.sections_found,
        rate = summary.completion_rate,
        section_header = if show_section { "<th>section</th>" } else { "" },
        body = body,
    )
}
