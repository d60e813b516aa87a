//! Inline rendering of styled text runs.

use deepnotes_shared::StyledRun;

/// Render runs to inline Markdown, in order.
///
/// Wrapping order, innermost first: bold, italic, strikethrough, underline,
/// then the link. A code run gets only backticks and the link.
pub fn render_runs(runs: &[StyledRun]) -> String {
    runs.iter().map(render_run).collect()
}

/// Raw text of all runs with every style dropped.
pub fn plain_text(runs: &[StyledRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

fn render_run(run: &StyledRun) -> String {
    let mut text = if run.code {
        format!("`{}`", run.text)
    } else {
        let mut text = run.text.clone();
        if run.bold {
            text = format!("**{text}**");
        }
        if run.italic {
            text = format!("*{text}*");
        }
        if run.strikethrough {
            text = format!("~~{text}~~");
        }
        if run.underline {
            // Markdown has no underline.
            text = format!("<u>{text}</u>");
        }
        text
    };

    if let Some(href) = run.link.as_deref().filter(|href| !href.is_empty()) {
        text = format!("[{text}]({href})");
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> StyledRun {
        StyledRun::plain(text)
    }

    #[test]
    fn plain_runs_concatenate_in_order() {
        let runs = vec![run("Hello, "), run("world"), run("!")];
        assert_eq!(render_runs(&runs), "Hello, world!");
    }

    #[test]
    fn single_styles() {
        let bold = StyledRun { bold: true, ..run("b") };
        let italic = StyledRun { italic: true, ..run("i") };
        let strike = StyledRun { strikethrough: true, ..run("s") };
        let under = StyledRun { underline: true, ..run("u") };
        assert_eq!(render_runs(&[bold]), "**b**");
        assert_eq!(render_runs(&[italic]), "*i*");
        assert_eq!(render_runs(&[strike]), "~~s~~");
        assert_eq!(render_runs(&[under]), "<u>u</u>");
    }

    #[test]
    fn all_styles_nest_in_fixed_order() {
        let styled = StyledRun {
            bold: true,
            italic: true,
            strikethrough: true,
            underline: true,
            link: Some("https://example.com".into()),
            ..run("x")
        };
        assert_eq!(
            render_runs(&[styled]),
            "[<u>~~***x***~~</u>](https://example.com)"
        );
    }

    #[test]
    fn bold_italic_wraps_bold_inside() {
        let styled = StyledRun {
            bold: true,
            italic: true,
            ..run("x")
        };
        assert_eq!(render_runs(&[styled]), "***x***");
    }

    #[test]
    fn italic_underline_without_bold() {
        let styled = StyledRun {
            italic: true,
            underline: true,
            ..run("x")
        };
        assert_eq!(render_runs(&[styled]), "<u>*x*</u>");
    }

    #[test]
    fn code_suppresses_other_styles() {
        let styled = StyledRun {
            code: true,
            bold: true,
            italic: true,
            strikethrough: true,
            underline: true,
            ..run("let x")
        };
        assert_eq!(render_runs(&[styled]), "`let x`");
    }

    #[test]
    fn code_keeps_outer_link() {
        let styled = StyledRun {
            code: true,
            bold: true,
            link: Some("https://docs.rs".into()),
            ..run("Vec")
        };
        assert_eq!(render_runs(&[styled]), "[`Vec`](https://docs.rs)");
    }

    #[test]
    fn empty_href_is_no_link() {
        let styled = StyledRun {
            bold: true,
            link: Some(String::new()),
            ..run("x")
        };
        assert_eq!(render_runs(&[styled]), "**x**");
    }

    #[test]
    fn plain_text_ignores_styles() {
        let runs = vec![
            StyledRun { bold: true, ..run("a") },
            StyledRun { code: true, link: Some("l".into()), ..run("b") },
        ];
        assert_eq!(plain_text(&runs), "ab");
    }
}
