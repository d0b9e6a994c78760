//! Small formatting helpers.

mod format;
mod html;

pub use format::{escape_csv, format_size};
pub use html::html_escape;
