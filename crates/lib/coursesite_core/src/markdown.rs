//! Markdown → HTML via comrak.
//!
//! Headings get anchor ids and absolute links open in a new browsing
//! context. Raw HTML in documents is passed through: site content is authored
//! by the course staff.

use std::io;

use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, format_html, html, parse_document};

fn options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.header_ids = Some(String::new());
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.description_lists = true;
    options.render.unsafe_ = true;
    options
}

/// Render a markdown document to an HTML fragment.
pub fn render(source: &[u8]) -> io::Result<String> {
    let text = String::from_utf8_lossy(source);
    let options = options();
    let arena = Arena::new();
    let root = parse_document(&arena, &text, &options);

    target_blank_external_links(&arena, root)?;

    let mut html = Vec::with_capacity(text.len() * 2);
    format_html(root, &options, &mut html)?;
    Ok(String::from_utf8_lossy(&html).into_owned())
}

fn is_external(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

/// Replace each external link node with inline `<a … target="_blank">`
/// markup around its original children.
fn target_blank_external_links<'a>(
    arena: &'a Arena<AstNode<'a>>,
    root: &'a AstNode<'a>,
) -> io::Result<()> {
    let links: Vec<&'a AstNode<'a>> = root
        .descendants()
        .filter(|node| {
            matches!(&node.data.borrow().value, NodeValue::Link(link) if is_external(&link.url))
        })
        .collect();

    for link in links {
        let open = match &link.data.borrow().value {
            NodeValue::Link(l) => open_tag(&l.url, &l.title)?,
            _ => continue,
        };

        link.insert_before(arena.alloc(NodeValue::HtmlInline(open).into()));
        let children: Vec<&'a AstNode<'a>> = link.children().collect();
        for child in children {
            link.insert_before(child);
        }
        link.insert_before(arena.alloc(NodeValue::HtmlInline("</a>".to_string()).into()));
        link.detach();
    }
    Ok(())
}

/// Opening tag, escaped with comrak's own href and text escapers.
fn open_tag(url: &str, title: &str) -> io::Result<String> {
    let mut tag = b"<a href=\"".to_vec();
    html::escape_href(&mut tag, url.as_bytes())?;
    tag.push(b'"');
    if !title.is_empty() {
        tag.extend_from_slice(b" title=\"");
        html::escape(&mut tag, title.as_bytes())?;
        tag.push(b'"');
    }
    tag.extend_from_slice(br#" target="_blank" rel="noopener noreferrer">"#);
    Ok(String::from_utf8_lossy(&tag).into_owned())
}
