//! YAML front matter: writing the note header and reading it back.

use chrono::SecondsFormat;
use serde_yaml::Value;
use tracing::{debug, warn};

use deepnotes_shared::DocumentProperties;

/// Category written when a page has none, and assumed when a file has none.
pub const FALLBACK_CATEGORY: &str = "Misc";

const DELIMITER: &str = "---";

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Serialize the header block, delimiters included, ending in a newline.
///
/// `title` and `category` are always present; other keys only when set.
/// `tags` is always written, possibly as `[]`.
pub fn render_header(props: &DocumentProperties) -> String {
    let category = props.category.as_deref().unwrap_or_else(|| {
        warn!(title = %props.title, fallback = FALLBACK_CATEGORY, "page has no category");
        FALLBACK_CATEGORY
    });

    let mut lines = vec![DELIMITER.to_string()];
    lines.push(format!("title: {}", quote(&props.title)));
    lines.push(format!("category: {}", quote(category)));
    if let Some(subcategory) = &props.subcategory {
        lines.push(format!("subcategory: {}", quote(subcategory)));
    }
    if let Some(language) = &props.language {
        lines.push(format!("language: {}", quote(language)));
    }
    if let Some(created) = &props.created {
        let ts = created.to_rfc3339_opts(SecondsFormat::Millis, true);
        lines.push(format!("created: {}", quote(&ts)));
    }
    if let Some(edited) = &props.last_edited {
        let ts = edited.to_rfc3339_opts(SecondsFormat::Millis, true);
        lines.push(format!("last_updated: {}", quote(&ts)));
    }
    let tags: Vec<String> = props.tags.iter().map(|t| quote(t)).collect();
    lines.push(format!("tags: [{}]", tags.join(", ")));
    if let Some(summary) = &props.summary {
        lines.push(format!("summary: {}", quote(summary)));
    }
    if let Some(chapter) = props.chapter {
        lines.push(format!("chapter: {chapter}"));
    }
    if let Some(section) = props.section {
        lines.push(format!("section: {section}"));
    }
    lines.push(DELIMITER.to_string());

    format!("{}\n", lines.join("\n"))
}

/// Double-quoted YAML scalar.
///
/// Control characters and the non-printable BOM/noncharacters are written
/// as escapes; YAML rejects them raw.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", u32::from(c))),
            '\u{FEFF}' | '\u{FFFE}' | '\u{FFFF}' => {
                out.push_str(&format!("\\u{:04X}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// The header fields the navigation builder cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredHeader {
    pub title: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub chapter: Option<u32>,
    pub section: Option<u32>,
}

/// Split a file into its raw YAML header and body.
///
/// The first line must be `---`; the header ends at the next `---` line.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let rest = content
        .strip_prefix(DELIMITER)?
        .strip_prefix('\r')
        .unwrap_or_else(|| &content[DELIMITER.len()..]);
    let rest = rest.strip_prefix('\n')?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }

    None
}

/// Parse a file's header leniently.
///
/// Returns `None` when the header is missing or is not a YAML mapping.
/// Individual fields with unexpected types read as absent.
pub fn parse_header(content: &str) -> Option<StoredHeader> {
    let (yaml, _) = split_frontmatter(content)?;

    let value: Value = match serde_yaml::from_str(yaml) {
        Ok(value) => value,
        Err(error) => {
            debug!(%error, "unparsable front matter");
            return None;
        }
    };
    let map = value.as_mapping()?;

    let text = |key: &str| map.get(key).and_then(scalar_text).filter(|s| !s.is_empty());
    let number = |key: &str| map.get(key).and_then(ordinal);

    Some(StoredHeader {
        title: text("title"),
        category: text("category"),
        subcategory: text("subcategory"),
        chapter: number("chapter"),
        section: number("section"),
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A positive whole number, from a YAML number or a numeric string.
fn ordinal(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn props() -> DocumentProperties {
        DocumentProperties {
            title: "Groups".into(),
            category: Some("Math".into()),
            subcategory: Some("Algebra".into()),
            language: Some("English".into()),
            tags: vec!["algebra".into(), "group theory".into()],
            created: Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()),
            last_edited: Some(Utc.with_ymd_and_hms(2024, 3, 2, 8, 15, 0).unwrap()),
            summary: Some("Sets with an operation".into()),
            chapter: Some(1),
            section: Some(1),
            sync_path: Some("Math/Algebra/chapter_1/sec_1_groups.md".into()),
        }
    }

    #[test]
    fn full_header_layout() {
        assert_eq!(
            render_header(&props()),
            "---\n\
             title: \"Groups\"\n\
             category: \"Math\"\n\
             subcategory: \"Algebra\"\n\
             language: \"English\"\n\
             created: \"2024-01-15T10:30:00.000Z\"\n\
             last_updated: \"2024-03-02T08:15:00.000Z\"\n\
             tags: [\"algebra\", \"group theory\"]\n\
             summary: \"Sets with an operation\"\n\
             chapter: 1\n\
             section: 1\n\
             ---\n"
        );
    }

    #[test]
    fn optional_keys_omitted() {
        let minimal = DocumentProperties {
            title: "Untitled".into(),
            category: Some("Math".into()),
            ..Default::default()
        };
        assert_eq!(
            render_header(&minimal),
            "---\ntitle: \"Untitled\"\ncategory: \"Math\"\ntags: []\n---\n"
        );
    }

    #[test]
    fn missing_category_written_as_fallback() {
        let header = render_header(&DocumentProperties {
            title: "Loose".into(),
            ..Default::default()
        });
        assert!(header.contains("category: \"Misc\"\n"));
    }

    #[test]
    fn quotes_are_escaped_and_parse_back() {
        let tricky = DocumentProperties {
            title: r#"The "Best" \ Worst: a note"#.into(),
            category: Some("Math".into()),
            summary: Some("line one\nline two".into()),
            ..Default::default()
        };
        let file = format!("{}body\n", render_header(&tricky));
        let header = parse_header(&file).expect("header parses");
        assert_eq!(header.title.as_deref(), Some(r#"The "Best" \ Worst: a note"#));
    }

    #[test]
    fn control_characters_are_escaped_and_parse_back() {
        for title in ["Bell\u{7}", "Nul\0x", "Esc\u{1b}[0m", "Del\u{7f}", "C1\u{85}x", "Bom\u{feff}"] {
            let props = DocumentProperties {
                title: title.into(),
                category: Some("Math".into()),
                ..Default::default()
            };
            let header = render_header(&props);
            assert!(
                !header.chars().any(|c| c.is_control() && c != '\n'),
                "raw control character in {header:?}"
            );
            let parsed = parse_header(&header).expect("header parses");
            assert_eq!(parsed.title.as_deref(), Some(title), "title {title:?}");
        }
    }

    #[test]
    fn written_header_round_trips_navigation_fields() {
        let file = format!("{}# Groups\n", render_header(&props()));
        assert_eq!(
            parse_header(&file),
            Some(StoredHeader {
                title: Some("Groups".into()),
                category: Some("Math".into()),
                subcategory: Some("Algebra".into()),
                chapter: Some(1),
                section: Some(1),
            })
        );
    }

    #[test]
    fn split_returns_body() {
        let (yaml, body) = split_frontmatter("---\ntitle: x\n---\nHello\n").unwrap();
        assert_eq!(yaml, "title: x\n");
        assert_eq!(body, "Hello\n");
    }

    #[test]
    fn split_handles_crlf() {
        let (yaml, body) = split_frontmatter("---\r\ntitle: x\r\n---\r\nHello").unwrap();
        assert_eq!(yaml, "title: x\r\n");
        assert_eq!(body, "Hello");
    }

    #[test]
    fn missing_or_unterminated_header() {
        assert!(parse_header("# Just a heading\n").is_none());
        assert!(parse_header("---\ntitle: x\nno end\n").is_none());
        assert!(parse_header("").is_none());
    }

    #[test]
    fn unparsable_yaml_is_none() {
        assert!(parse_header("---\ntitle: [unclosed\n---\n").is_none());
        assert!(parse_header("---\n- just\n- a list\n---\n").is_none());
    }

    #[test]
    fn lenient_field_types() {
        let header = parse_header(
            "---\ntitle: 2024\ncategory: 'Math'\nchapter: \"3\"\nsection: 2.0\n---\n",
        )
        .unwrap();
        assert_eq!(header.title.as_deref(), Some("2024"));
        assert_eq!(header.category.as_deref(), Some("Math"));
        assert_eq!(header.chapter, Some(3));
        assert_eq!(header.section, Some(2));
    }

    #[test]
    fn invalid_numbers_are_absent() {
        let header =
            parse_header("---\nchapter: zero\nsection: 0\ntitle: \"\"\n---\n").unwrap();
        assert_eq!(header.chapter, None);
        assert_eq!(header.section, None);
        assert_eq!(header.title, None);
    }
}
