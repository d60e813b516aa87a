//! Notion-to-Markdown conversion and cleanup passes.
//!
//! Renders a fetched Notion page into a Markdown note: a YAML header
//! built from the page properties, followed by the rendered blocks after the
//! cleanup pipeline (plain-text fences, MathJax delimiters) has run.

mod blocks;
mod cleanup;
pub mod frontmatter;
mod rich_text;

use deepnotes_shared::{ContentBlock, DocumentProperties};

pub use blocks::render_blocks;
pub use frontmatter::{
    FALLBACK_CATEGORY, StoredHeader, parse_header, render_header, split_frontmatter,
};
pub use rich_text::{plain_text, render_runs};

// ---------------------------------------------------------------------------
// Converter
// ---------------------------------------------------------------------------

/// Render blocks and run the cleanup pipeline over the result.
pub fn render_body(blocks: &[ContentBlock]) -> String {
    normalize(&render_blocks(blocks))
}

/// Apply the cleanup passes to an already-rendered Markdown body.
///
/// Plain-text fence tags are removed first, then `$$…$$` and `$…$` outside
/// fenced code become `\[…\]` and `\(…\)`.
pub fn normalize(md: &str) -> String {
    cleanup::run_pipeline(md)
}

/// Full note file content: header, a blank line, then the body.
pub fn compose_note(props: &DocumentProperties, body: &str) -> String {
    format!("{}\n{body}", render_header(props))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
