//! Markup to sanitized HTML, and the standalone report page.

mod highlight;
mod markup;
mod page;
mod trusted;

pub use highlight::Highlighter;
pub use markup::{MarkupRenderer, RENDER_FAILURE_MESSAGE};
pub use page::{ReportPage, ReportStatus};
pub use trusted::TrustedHtml;
