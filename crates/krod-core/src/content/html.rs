//! HTML output for rendered messages
//!
//! Every piece of message or source text is escaped at the leaves. Code and
//! math bodies are emitted as escaped text for an external highlighter or
//! typesetter to pick up.

use std::fmt::Write;

use super::inline::{FormattedText, InlineNode};
use crate::message::{MessageRole, RenderedMessage, RenderedSegment};
use crate::sources::{Source, SourceCards};

/// Escape text for use in element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Render formatted prose as a sequence of `<p>` elements
pub fn formatted_text_to_html(text: &FormattedText) -> String {
    let mut out = String::new();
    for paragraph in &text.paragraphs {
        out.push_str("<p>");
        write_nodes(&paragraph.nodes, &mut out);
        out.push_str("</p>");
    }
    out
}

fn write_nodes(nodes: &[InlineNode], out: &mut String) {
    for node in nodes {
        match node {
            InlineNode::Text(text) => out.push_str(&escape_html(text)),
            InlineNode::Strong(children) => {
                out.push_str("<strong>");
                write_nodes(children, out);
                out.push_str("</strong>");
            }
            InlineNode::Emphasis(children) => {
                out.push_str("<em>");
                write_nodes(children, out);
                out.push_str("</em>");
            }
            InlineNode::Code(code) => {
                let _ = write!(out, "<code>{}</code>", escape_html(code));
            }
            InlineNode::Citation { marker, label } => {
                let _ = write!(
                    out,
                    r#"<sup class="inline-citation" data-source="{}">{}</sup>"#,
                    marker.source_index, label
                );
            }
            InlineNode::LineBreak => out.push_str("<br>"),
        }
    }
}

/// Render a whole message, including its source cards
///
/// `copied` reports whether a code block key is inside its copy feedback
/// window.
pub fn message_to_html(
    message: &RenderedMessage,
    sources: &[Source],
    cards: &SourceCards,
    copied: impl Fn(&str) -> bool,
) -> String {
    let role_class = match message.role {
        MessageRole::User => "user-text",
        MessageRole::Assistant => "assistant-text",
    };

    let mut out = String::new();
    let _ = write!(out, r#"<div class="message-content {}">"#, role_class);

    for segment in &message.segments {
        match segment {
            RenderedSegment::Text(text) => {
                out.push_str(r#"<div class="prose">"#);
                out.push_str(&formatted_text_to_html(text));
                out.push_str("</div>");
            }
            RenderedSegment::Code {
                key,
                language,
                content,
            } => {
                let label = if copied(key) { "Copied" } else { "Copy" };
                let _ = write!(
                    out,
                    concat!(
                        r#"<div class="code-block"><div class="code-header">"#,
                        r#"<span class="code-language">{lang}</span>"#,
                        r#"<button class="copy-button" data-copy-key="{key}">{label}</button>"#,
                        r#"</div><pre><code class="language-{lang}">{code}</code></pre></div>"#,
                    ),
                    lang = escape_html(language),
                    key = escape_html(key),
                    label = label,
                    code = escape_html(content),
                );
            }
            RenderedSegment::BlockMath(tex) => {
                let _ = write!(
                    out,
                    r#"<div class="math-display">\[{}\]</div>"#,
                    escape_html(tex)
                );
            }
            RenderedSegment::InlineMath(tex) => {
                let _ = write!(
                    out,
                    r#"<span class="math-inline">\({}\)</span>"#,
                    escape_html(tex)
                );
            }
        }
    }

    write_source_cards(sources, cards, &mut out);
    out.push_str("</div>");
    out
}

fn write_source_cards(sources: &[Source], cards: &SourceCards, out: &mut String) {
    if sources.is_empty() {
        return;
    }

    out.push_str(r#"<div class="sources"><div class="sources-header">"#);
    let _ = write!(out, "<h4>{}</h4>", SourceCards::header(sources));
    if cards.has_hidden(sources) {
        let _ = write!(
            out,
            r#"<button class="sources-toggle">{}</button>"#,
            cards.toggle_label()
        );
    }
    out.push_str("</div>");

    for (index, source) in cards.visible(sources).iter().enumerate() {
        let _ = write!(
            out,
            r#"<div class="source-card" data-source-id="{}"><span class="source-number">{}</span><h5>{}</h5>"#,
            escape_html(&source.id),
            index + 1,
            escape_html(&source.title)
        );

        out.push_str(r#"<div class="source-domain">"#);
        if let Some(favicon) = &source.favicon {
            let _ = write!(out, r#"<img src="{}" alt="">"#, escape_html(favicon));
        }
        let _ = write!(
            out,
            "<span>{}</span></div>",
            escape_html(&source.display_domain())
        );

        if let Some(snippet) = &source.snippet {
            let _ = write!(out, r#"<p class="source-snippet">{}</p>"#, escape_html(snippet));
        }
        let _ = write!(
            out,
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">Open source</a></div>"#,
            escape_html(&source.url)
        );
    }

    out.push_str("</div>");
}
