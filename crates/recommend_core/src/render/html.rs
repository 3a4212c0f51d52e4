use super::{Alignment, ContentBlock, Inline, ListItem, RenderedContent};

const SAFE_SCHEMES: [&str; 3] = ["http:", "https:", "mailto:"];

/// Every piece of text is escaped, so nothing from the source reaches the
/// output as markup.
pub fn to_html(content: &RenderedContent) -> String {
    let mut out = String::new();
    for block in content {
        write_block(&mut out, block);
    }
    out
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Relative links and a few plain schemes pass; anything else becomes `#`.
fn safe_url(url: &str) -> String {
    let trimmed = url.trim();
    let lower = trimmed.to_ascii_lowercase();
    let scheme_end = lower.find(':');
    let is_relative = match scheme_end {
        None => true,
        Some(colon) => lower[..colon].contains(['/', '?', '#']),
    };
    if is_relative || SAFE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        escape(trimmed)
    } else {
        "#".to_string()
    }
}

fn language_class(language: &str) -> String {
    language
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#' | '.'))
        .collect()
}

fn align_attr(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::None => "",
        Alignment::Left => " style=\"text-align:left\"",
        Alignment::Center => " style=\"text-align:center\"",
        Alignment::Right => " style=\"text-align:right\"",
    }
}

fn write_block(out: &mut String, block: &ContentBlock) {
    match block {
        ContentBlock::Heading { level, content } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!("<h{level}>"));
            write_inlines(out, content);
            out.push_str(&format!("</h{level}>\n"));
        }
        ContentBlock::Paragraph { content } => {
            out.push_str("<p>");
            write_inlines(out, content);
            out.push_str("</p>\n");
        }
        ContentBlock::List {
            ordered,
            start,
            items,
        } => {
            match (ordered, start) {
                (true, Some(start)) if *start != 1 => {
                    out.push_str(&format!("<ol start=\"{start}\">\n"))
                }
                (true, _) => out.push_str("<ol>\n"),
                (false, _) => out.push_str("<ul>\n"),
            }
            for item in items {
                write_list_item(out, item);
            }
            out.push_str(if *ordered { "</ol>\n" } else { "</ul>\n" });
        }
        ContentBlock::Table {
            alignments,
            header,
            rows,
        } => {
            out.push_str("<table>\n<thead>\n<tr>");
            for (cell, alignment) in header.iter().zip(alignments) {
                out.push_str(&format!("<th{}>", align_attr(*alignment)));
                write_inlines(out, cell);
                out.push_str("</th>");
            }
            out.push_str("</tr>\n</thead>\n");
            if !rows.is_empty() {
                out.push_str("<tbody>\n");
                for row in rows {
                    out.push_str("<tr>");
                    for (cell, alignment) in row.iter().zip(alignments) {
                        out.push_str(&format!("<td{}>", align_attr(*alignment)));
                        write_inlines(out, cell);
                        out.push_str("</td>");
                    }
                    out.push_str("</tr>\n");
                }
                out.push_str("</tbody>\n");
            }
            out.push_str("</table>\n");
        }
        ContentBlock::CodeBlock { language, text } => {
            out.push_str("<pre class=\"code-block\"><code");
            if let Some(language) = language {
                let class = language_class(language);
                if !class.is_empty() {
                    out.push_str(&format!(" class=\"language-{class}\""));
                }
            }
            out.push('>');
            out.push_str(&escape(text));
            out.push_str("</code></pre>\n");
        }
        ContentBlock::BlockQuote { blocks } => {
            out.push_str("<blockquote>\n");
            for block in blocks {
                write_block(out, block);
            }
            out.push_str("</blockquote>\n");
        }
        ContentBlock::ThematicBreak => out.push_str("<hr />\n"),
    }
}

fn write_list_item(out: &mut String, item: &ListItem) {
    out.push_str("<li>");
    match item.checked {
        Some(true) => out.push_str("<input type=\"checkbox\" checked disabled /> "),
        Some(false) => out.push_str("<input type=\"checkbox\" disabled /> "),
        None => {}
    }
    // Tight single-paragraph items render without the <p> wrapper.
    match item.blocks.as_slice() {
        [ContentBlock::Paragraph { content }] => write_inlines(out, content),
        blocks => {
            out.push('\n');
            for block in blocks {
                write_block(out, block);
            }
        }
    }
    out.push_str("</li>\n");
}

fn write_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        write_inline(out, inline);
    }
}

fn write_inline(out: &mut String, inline: &Inline) {
    match inline {
        Inline::Text(text) => out.push_str(&escape(text)),
        Inline::Emphasis(children) => wrap(out, "em", children),
        Inline::Strong(children) => wrap(out, "strong", children),
        Inline::Strikethrough(children) => wrap(out, "del", children),
        Inline::Code(text) => {
            out.push_str("<code class=\"inline-code\">");
            out.push_str(&escape(text));
            out.push_str("</code>");
        }
        Inline::Link { href, content } => {
            out.push_str(&format!(
                "<a href=\"{}\" rel=\"noopener noreferrer\">",
                safe_url(href)
            ));
            write_inlines(out, content);
            out.push_str("</a>");
        }
        Inline::Image { src, alt } => out.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\" />",
            safe_url(src),
            escape(alt)
        )),
        Inline::LineBreak => out.push_str("<br />\n"),
    }
}

fn wrap(out: &mut String, tag: &str, children: &[Inline]) {
    out.push_str(&format!("<{tag}>"));
    write_inlines(out, children);
    out.push_str(&format!("</{tag}>"));
}
