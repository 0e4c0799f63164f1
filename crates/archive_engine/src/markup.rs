//! Re-serialises extracted markup so links can be rewritten on the way out.

use archive_core::{is_reply_marker, rewrite_reply_href};
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::ElementRef;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Inner HTML of `element` with every reply-marker link pointed at a local
/// anchor instead of the remote post.
pub fn inner_html_with_local_replies(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    let raw = RAW_TEXT_ELEMENTS.contains(&element.value().name());
    for child in element.children() {
        write_node(child, raw, &mut out);
    }
    out
}

fn write_node(node: NodeRef<'_, Node>, raw: bool, out: &mut String) {
    match node.value() {
        Node::Text(text) => {
            if raw {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                write_element(element, out);
            }
        }
        Node::Comment(_) | Node::ProcessingInstruction(_) | Node::Doctype(_) => {}
        _ => {
            for child in node.children() {
                write_node(child, raw, out);
            }
        }
    }
}

fn write_element(element: ElementRef<'_>, out: &mut String) {
    let name = element.value().name();
    let is_reply = name == "a"
        && element.value().attr("href").is_some()
        && is_reply_marker(&element.text().collect::<String>());

    out.push('<');
    out.push_str(name);
    for (key, value) in element.value().attrs() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        if is_reply && key == "href" {
            escape_attr(&rewrite_reply_href(value), out);
        } else {
            escape_attr(value, out);
        }
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&name) {
        return;
    }
    let raw = RAW_TEXT_ELEMENTS.contains(&name);
    for child in element.children() {
        write_node(child, raw, out);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

pub(crate) fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

pub(crate) fn escaped(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_text(text, &mut out);
    out
}

pub(crate) fn attr_escaped(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    escape_attr(value, &mut out);
    out
}
