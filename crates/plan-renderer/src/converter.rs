//! Markdown to HTML fragment conversion.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html};

use crate::RenderError;
use crate::highlight;

/// GitHub-flavoured extensions enabled for plan documents.
fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_GFM
}

/// Convert markdown source to an HTML fragment.
///
/// Raw HTML in the source passes through unchanged. Fenced code blocks are
/// syntax highlighted with `hl-` scope classes.
///
/// # Errors
///
/// Returns [`RenderError::Conversion`] if the source is not valid UTF-8.
pub fn render_fragment(source: &[u8]) -> Result<String, RenderError> {
    let markdown = std::str::from_utf8(source)
        .map_err(|e| RenderError::Conversion(format!("source is not valid UTF-8: {e}")))?;

    let mut fragment = String::with_capacity(markdown.len() * 3 / 2);
    let events = highlight_code_blocks(Parser::new_ext(markdown, parser_options()));
    html::push_html(&mut fragment, events);
    Ok(fragment)
}

/// Replace each code block with pre-rendered, highlighted HTML.
fn highlight_code_blocks<'a>(
    events: impl Iterator<Item = Event<'a>>,
) -> impl Iterator<Item = Event<'a>> {
    let mut block: Option<(Option<String>, String)> = None;

    events.filter_map(move |event| match event {
        Event::Start(Tag::CodeBlock(kind)) => {
            let language = match kind {
                CodeBlockKind::Fenced(info) => info
                    .split(|c: char| c.is_whitespace() || c == ',')
                    .next()
                    .filter(|lang| !lang.is_empty())
                    .map(str::to_owned),
                CodeBlockKind::Indented => None,
            };
            block = Some((language, String::new()));
            None
        }
        Event::Text(text) if block.is_some() => {
            if let Some((_, code)) = block.as_mut() {
                code.push_str(&text);
            }
            None
        }
        Event::End(TagEnd::CodeBlock) => {
            let (language, code) = block.take()?;
            Some(Event::Html(
                highlight::code_block(language.as_deref(), &code).into(),
            ))
        }
        other => Some(other),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_heading_and_paragraph() {
        let html = render_fragment(b"# Hello\nWorld").unwrap();
        assert_eq!(html, "<h1>Hello</h1>\n<p>World</p>\n");
    }

    #[test]
    fn test_gfm_extensions() {
        let html = render_fragment(b"- [x] done\n- [ ] todo\n\n~~old~~").unwrap();
        assert!(html.contains("type=\"checkbox\""));
        assert!(html.contains("<del>old</del>"));
    }

    #[test]
    fn test_table() {
        let html = render_fragment(b"| a | b |\n|---|---|\n| 1 | 2 |\n").unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_fenced_rust_block_is_highlighted() {
        let html = render_fragment(b"Intro\n\n```rust\nlet x = 1;\n```\n").unwrap();

        assert!(html.starts_with("<p>Intro</p>\n<pre><code class=\"language-rust\">"));
        assert!(html.contains("<span class=\"hl-"));
        assert!(html.ends_with("</code></pre>\n"));
    }

    #[test]
    fn test_indented_block_is_escaped() {
        let html = render_fragment(b"    a < b\n").unwrap();
        assert_eq!(html, "<pre><code>a &lt; b\n</code></pre>\n");
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(render_fragment(b"").unwrap(), "");
    }

    #[test]
    fn test_invalid_utf8() {
        let err = render_fragment(&[0xff, 0xfe, b'#']).unwrap_err();
        assert!(matches!(err, RenderError::Conversion(_)));
    }
}
