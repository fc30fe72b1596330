//! sumbench-report — renders a `ComparisonReport` as markdown or HTML.

pub mod html;
pub mod markdown;

pub use html::{generate_html, write_html_report};
pub use markdown::{render_markdown, write_markdown_report};
