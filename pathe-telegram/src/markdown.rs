//! CommonMark to Telegram MarkdownV2.
//!
//! Telegram rejects a MarkdownV2 message when any reserved character outside an entity is left
//! unescaped, so every text run goes through [`escape_markdown_v2`] and only the markers we emit
//! ourselves stay bare.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

const RESERVED: &str = r"\_*[]()~`>#+-=|{}.!";

/// Escapes every MarkdownV2 reserved character.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if RESERVED.contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Inside `pre` and `code` only the backtick and backslash are escaped.
fn escape_code(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '`' || ch == '\\' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Inside the `(...)` part of an inline link only `)` and the backslash are escaped.
fn escape_link_url(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    for ch in url.chars() {
        if ch == ')' || ch == '\\' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Undoes [`escape_markdown_v2`], for resending a segment as plain text.
pub fn strip_markdown_v2_escapes(text: &str) -> String {
    let mut plain = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(&next) = chars.peek() {
                if RESERVED.contains(next) {
                    plain.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        plain.push(ch);
    }
    plain
}

/// Converts agent markdown into MarkdownV2. Headings become bold lines, lists get bullets or escaped
/// numbers; anything Telegram cannot show is flattened to escaped text.
pub fn to_markdown_v2(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len() + markdown.len() / 8);
    let mut lists: Vec<Option<u64>> = Vec::new();
    let mut links: Vec<String> = Vec::new();
    let mut in_code_block = false;

    for event in Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { .. } => out.push('*'),
                Tag::Strong => out.push('*'),
                Tag::Emphasis => out.push('_'),
                Tag::Strikethrough => out.push('~'),
                Tag::CodeBlock(kind) => {
                    in_code_block = true;
                    out.push_str("```");
                    if let CodeBlockKind::Fenced(lang) = kind {
                        out.push_str(&escape_code(&lang));
                    }
                    out.push('\n');
                }
                Tag::List(start) => {
                    if !lists.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    lists.push(start);
                }
                Tag::Item => {
                    let depth = lists.len().saturating_sub(1);
                    out.push_str(&"  ".repeat(depth));
                    match lists.last_mut() {
                        Some(Some(n)) => {
                            out.push_str(&format!("{}\\. ", n));
                            *n += 1;
                        }
                        _ => out.push_str("• "),
                    }
                }
                Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                    out.push('[');
                    links.push(dest_url.to_string());
                }
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Paragraph => {
                    if lists.is_empty() {
                        out.push_str("\n\n");
                    } else {
                        out.push('\n');
                    }
                }
                TagEnd::Heading(_) => out.push_str("*\n\n"),
                TagEnd::Strong => out.push('*'),
                TagEnd::Emphasis => out.push('_'),
                TagEnd::Strikethrough => out.push('~'),
                TagEnd::CodeBlock => {
                    in_code_block = false;
                    if !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str("```\n\n");
                }
                TagEnd::List(_) => {
                    lists.pop();
                    if lists.is_empty() {
                        out.push('\n');
                    }
                }
                TagEnd::Item => {
                    if !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
                TagEnd::Link | TagEnd::Image => {
                    let url = links.pop().unwrap_or_default();
                    out.push_str("](");
                    out.push_str(&escape_link_url(&url));
                    out.push(')');
                }
                _ => {}
            },
            Event::Text(text) => {
                if in_code_block {
                    out.push_str(&escape_code(&text));
                } else {
                    out.push_str(&escape_markdown_v2(&text));
                }
            }
            Event::Code(code) => {
                out.push('`');
                out.push_str(&escape_code(&code));
                out.push('`');
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                out.push_str(&escape_markdown_v2(&html));
            }
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => out.push_str("\\-\\-\\-\n\n"),
            _ => {}
        }
    }

    out.trim_end().to_string()
}
