//! Block-level rendering: one Markdown fragment per content block.

use tracing::debug;

use deepnotes_shared::ContentBlock;

use crate::rich_text::render_runs;

/// Render blocks into a Markdown body.
///
/// Fragments are separated by a blank line; the result is trimmed and ends
/// with exactly one newline. Unsupported blocks contribute nothing.
pub fn render_blocks(blocks: &[ContentBlock]) -> String {
    let fragments: Vec<String> = blocks.iter().filter_map(render_block).collect();
    format!("{}\n", fragments.join("\n\n").trim())
}

fn render_block(block: &ContentBlock) -> Option<String> {
    let fragment = match block {
        ContentBlock::Paragraph(runs) => render_runs(runs),
        ContentBlock::Heading { level, runs } => {
            let marker = "#".repeat(usize::from((*level).clamp(1, 3)));
            format!("{marker} {}", render_runs(runs))
        }
        ContentBlock::BulletedItem(runs) => format!("- {}", render_runs(runs)),
        // Always "1."; the site renderer renumbers ordered lists.
        ContentBlock::NumberedItem(runs) => format!("1. {}", render_runs(runs)),
        ContentBlock::Quote(runs) => render_runs(runs)
            .split('\n')
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        ContentBlock::Code { language, text } => {
            format!("```{}\n{text}\n```", normalize_language(language))
        }
        ContentBlock::Unsupported { kind } => {
            debug!(kind = %kind, "skipping unsupported block");
            return None;
        }
    };
    Some(fragment)
}

/// Fence language for a code block; plain-text variants become empty.
pub(crate) fn normalize_language(language: &str) -> &str {
    let trimmed = language.trim();
    let squashed: String = trimmed
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    match squashed.as_str() {
        "plaintext" | "plain" | "text" => "",
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepnotes_shared::StyledRun;

    fn runs(text: &str) -> Vec<StyledRun> {
        vec![StyledRun::plain(text)]
    }

    #[test]
    fn renders_each_block_kind() {
        let blocks = vec![
            ContentBlock::Heading { level: 1, runs: runs("Title") },
            ContentBlock::Heading { level: 2, runs: runs("Sub") },
            ContentBlock::Heading { level: 3, runs: runs("Minor") },
            ContentBlock::Paragraph(runs("Text.")),
            ContentBlock::BulletedItem(runs("bullet")),
            ContentBlock::NumberedItem(runs("first")),
            ContentBlock::NumberedItem(runs("second")),
            ContentBlock::Quote(runs("quoted")),
        ];

        assert_eq!(
            render_blocks(&blocks),
            "# Title\n\n## Sub\n\n### Minor\n\nText.\n\n- bullet\n\n1. first\n\n1. second\n\n> quoted\n"
        );
    }

    #[test]
    fn numbered_items_always_use_one() {
        let blocks: Vec<_> = (0..3)
            .map(|i| ContentBlock::NumberedItem(runs(&format!("item {i}"))))
            .collect();
        let out = render_blocks(&blocks);
        assert_eq!(out.matches("1. ").count(), 3);
        assert!(!out.contains("2. "));
    }

    #[test]
    fn code_block_fenced_with_language() {
        let blocks = vec![ContentBlock::Code {
            language: "python".into(),
            text: "print('hi')".into(),
        }];
        assert_eq!(render_blocks(&blocks), "```python\nprint('hi')\n```\n");
    }

    #[test]
    fn plain_text_languages_become_bare_fences() {
        for lang in ["plain text", "Plain Text", "plaintext", "PLAIN", "text", " plain  text "] {
            let blocks = vec![ContentBlock::Code {
                language: lang.into(),
                text: "x".into(),
            }];
            assert_eq!(render_blocks(&blocks), "```\nx\n```\n", "language {lang:?}");
        }
    }

    #[test]
    fn code_text_is_not_styled() {
        let blocks = vec![ContentBlock::Code {
            language: "rust".into(),
            text: "let a = **b**;".into(),
        }];
        assert!(render_blocks(&blocks).contains("let a = **b**;"));
    }

    #[test]
    fn unsupported_blocks_are_skipped() {
        let blocks = vec![
            ContentBlock::Paragraph(runs("before")),
            ContentBlock::Unsupported { kind: "table".into() },
            ContentBlock::Paragraph(runs("after")),
        ];
        assert_eq!(render_blocks(&blocks), "before\n\nafter\n");
    }

    #[test]
    fn multiline_quote_prefixes_every_line() {
        let blocks = vec![ContentBlock::Quote(runs("one\ntwo"))];
        assert_eq!(render_blocks(&blocks), "> one\n> two\n");
    }

    #[test]
    fn output_is_trimmed_with_single_newline() {
        let blocks = vec![
            ContentBlock::Paragraph(runs("  ")),
            ContentBlock::Paragraph(runs("body\n\n")),
        ];
        assert_eq!(render_blocks(&blocks), "body\n");
    }

    #[test]
    fn empty_document_is_single_newline() {
        assert_eq!(render_blocks(&[]), "\n");
    }
}
