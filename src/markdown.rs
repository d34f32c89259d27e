//! Markdown to HTML conversion.
//!
//! GitHub-flavored: tables, strikethrough, task lists and footnotes come from
//! pulldown-cmark options. Bare `http(s)://` URLs in running text become links,
//! except inside code blocks and existing links.

use pulldown_cmark::{CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream, html};
use regex::Regex;
use std::sync::LazyLock;

static BARE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>()]*[^\s<>().,;:!?'"]"#).unwrap());

fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// Render a markdown document to an HTML fragment.
pub fn to_html(markdown: &str) -> String {
    let parser = TextMergeStream::new(Parser::new_ext(markdown, options()));

    let mut events = Vec::new();
    let mut link_depth = 0usize;
    let mut in_code_block = false;

    for event in parser {
        match &event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => link_depth += 1,
            Event::End(TagEnd::Link | TagEnd::Image) => link_depth = link_depth.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => in_code_block = false,
            Event::Text(text) if link_depth == 0 && !in_code_block => {
                autolink(text, &mut events);
                continue;
            }
            _ => {}
        }
        events.push(event);
    }

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, events.into_iter());
    body
}

/// Split `text` around bare URLs, wrapping each URL in a link.
fn autolink<'a>(text: &CowStr<'a>, events: &mut Vec<Event<'a>>) {
    let text: &str = text;
    let mut last = 0;
    for m in BARE_URL.find_iter(text) {
        if m.start() > last {
            events.push(Event::Text(text[last..m.start()].to_string().into()));
        }
        let url = m.as_str().to_string();
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: url.clone().into(),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        events.push(Event::Text(url.into()));
        events.push(Event::End(TagEnd::Link));
        last = m.end();
    }
    if last < text.len() {
        events.push(Event::Text(text[last..].to_string().into()));
    }
}
