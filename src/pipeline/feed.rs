//! Sitemap XML rendering (sitemaps.org protocol 0.9).

use crate::constants::SITEMAP_XMLNS;
use crate::error::{Result, SitemapError};
use crate::types::Entry;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

const INDENT_WIDTH: usize = 2;

/// Render `entries` as a pretty-printed `urlset` document.
///
/// Output depends only on the entries, so the same input always yields the
/// same bytes.
pub fn serialize(entries: &[Entry]) -> Result<Vec<u8>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let urlset = BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_XMLNS)]);
    if entries.is_empty() {
        write(&mut writer, Event::Empty(urlset))?;
        return Ok(writer.into_inner());
    }

    write(&mut writer, Event::Start(urlset))?;
    for entry in entries {
        write(&mut writer, Event::Start(BytesStart::new("url")))?;
        write_text_element(&mut writer, "loc", &entry.location)?;
        if let Some(lastmod) = &entry.last_modified {
            write_text_element(&mut writer, "lastmod", lastmod)?;
        }
        write(&mut writer, Event::End(BytesEnd::new("url")))?;
    }
    write(&mut writer, Event::End(BytesEnd::new("urlset")))?;

    Ok(writer.into_inner())
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| SitemapError::Xml(e.to_string()))
}
