//! Post-render cleanup passes for MkDocs + MathJax.
//!
//! Each pass is a function `&str -> String` applied in sequence. Fenced
//! code is never rewritten by the math pass.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Run the full cleanup pipeline on a rendered body.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = md.to_string();

    result = fix_plain_text_fences(&result);
    result = convert_math(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Plain-text fence tags
// ---------------------------------------------------------------------------

/// Turn ```` ```plain text ```` (any case, with or without the space) into a bare fence.
fn fix_plain_text_fences(md: &str) -> String {
    static PLAIN_FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)(`{3,})[ \t]*plain[ \t]*text[ \t]*\n").expect("valid regex")
    });

    PLAIN_FENCE_RE.replace_all(md, "${1}\n").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Math delimiters
// ---------------------------------------------------------------------------

/// A slice of the body: fenced code is carried through untouched.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Code(&'a str),
    Text(&'a str),
}

/// Split a body into alternating text and fenced-code segments.
///
/// Fences are matched left to right, each from one ```` ``` ```` to the next.
fn segments(md: &str) -> Vec<Segment<'_>> {
    static CODE_BLOCK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));

    let mut out = Vec::new();
    let mut last = 0;

    for m in CODE_BLOCK_RE.find_iter(md) {
        if m.start() > last {
            out.push(Segment::Text(&md[last..m.start()]));
        }
        out.push(Segment::Code(m.as_str()));
        last = m.end();
    }
    if last < md.len() {
        out.push(Segment::Text(&md[last..]));
    }

    out
}

/// Rewrite `$$…$$` to `\[…\]` and `$…$` to `\(…\)` outside fenced code.
fn convert_math(md: &str) -> String {
    segments(md)
        .into_iter()
        .map(|segment| match segment {
            Segment::Code(code) => code.to_string(),
            Segment::Text(text) => convert_inline_math(&convert_display_math(text)),
        })
        .collect()
}

fn convert_display_math(text: &str) -> String {
    static DISPLAY_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)\$\$(.*?)\$\$").expect("valid regex"));

    DISPLAY_RE
        .replace_all(text, |caps: &Captures| format!("\\[{}\\]", caps[1].trim()))
        .to_string()
}

/// Single-line `$…$` spans whose dollars are not part of a `$$`.
///
/// The `regex` crate has no lookaround, so the delimiter rules are checked
/// on the bytes directly. `$` and `\n` are ASCII, so every index used for
/// slicing is a char boundary.
fn convert_inline_math(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        let close = if is_lone_dollar(bytes, i) {
            closing_dollar(bytes, i)
        } else {
            None
        };

        match close {
            Some(close) => {
                out.push_str(&text[copied..i]);
                out.push_str("\\(");
                out.push_str(&text[i + 1..close]);
                out.push_str("\\)");
                copied = close + 1;
                i = close + 1;
            }
            None => i += 1,
        }
    }

    out.push_str(&text[copied..]);
    out
}

fn is_lone_dollar(bytes: &[u8], i: usize) -> bool {
    bytes[i] == b'$'
        && (i == 0 || bytes[i - 1] != b'$')
        && bytes.get(i + 1) != Some(&b'$')
}

/// First lone `$` after `open` on the same line, leaving a non-empty interior.
fn closing_dollar(bytes: &[u8], open: usize) -> Option<usize> {
    for j in open + 1..bytes.len() {
        match bytes[j] {
            b'\n' => return None,
            b'$' if j > open + 1 && is_lone_dollar(bytes, j) => return Some(j),
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
