//! Class-based syntax highlighting for fenced code blocks.
//!
//! Tokens are wrapped in `<span class="hl-...">` elements; colours come from
//! the page stylesheet, so the same markup works in light and dark mode.

use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::template::escape;

/// Prefix applied to every scope class.
pub(crate) const CLASS_PREFIX: &str = "hl-";

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Render one code block as `<pre><code>`.
///
/// Blocks with a recognised language get scope classes. Anything else is
/// emitted escaped, the same as an unhighlighted block.
pub(crate) fn code_block(language: Option<&str>, code: &str) -> String {
    let highlighted = language.and_then(|lang| highlight(lang, code));
    let body = highlighted.unwrap_or_else(|| escape(code));

    match language {
        Some(lang) => format!(
            "<pre><code class=\"language-{}\">{body}</code></pre>\n",
            escape(lang)
        ),
        None => format!("<pre><code>{body}</code></pre>\n"),
    }
}

fn highlight(language: &str, code: &str) -> Option<String> {
    let syntax = SYNTAXES.find_syntax_by_token(language)?;
    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        &SYNTAXES,
        ClassStyle::SpacedPrefixed {
            prefix: CLASS_PREFIX,
        },
    );
    for line in LinesWithEndings::from(code) {
        if let Err(e) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::debug!(language, error = %e, "Highlighting failed, emitting plain code");
            return None;
        }
    }
    Some(generator.finalize())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_known_language_gets_classes() {
        let html = code_block(Some("rust"), "fn main() {}\n");

        assert!(html.starts_with("<pre><code class=\"language-rust\">"));
        assert!(html.contains("class=\"hl-"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_unknown_language_is_escaped() {
        let html = code_block(Some("no-such-lang"), "a < b\n");
        assert_eq!(
            html,
            "<pre><code class=\"language-no-such-lang\">a &lt; b\n</code></pre>\n"
        );
    }

    #[test]
    fn test_no_language() {
        assert_eq!(
            code_block(None, "<tag>\n"),
            "<pre><code>&lt;tag&gt;\n</code></pre>\n"
        );
    }
}
