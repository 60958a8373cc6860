//! Google News sitemap XML rendering.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9" xmlns:news="http://www.google.com/schemas/sitemap-news/0.9">
//!   <url>
//!     <loc>https://example.com/2025/03/story/</loc>
//!     <news:news>
//!       <news:publication>
//!         <news:name>Daily Planet</news:name>
//!         <news:language>en</news:language>
//!       </news:publication>
//!       <news:publication_date>2025-03-01T14:05:00+02:00</news:publication_date>
//!       <news:title>Story</news:title>
//!       <news:keywords>Politics, World</news:keywords>
//!     </news:news>
//!   </url>
//! </urlset>
//! ```

use std::borrow::Cow;

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
pub const NEWS_NS: &str = "http://www.google.com/schemas/sitemap-news/0.9";

/// Publication block shared by every entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub name: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsUrl {
    pub loc: String,
    pub publication_date: String,
    pub title: String,
    pub keywords: Option<String>,
}

/// Render a complete `<urlset>` document.
pub fn render_urlset(publication: &Publication, entries: &[NewsUrl]) -> String {
    let mut xml = String::with_capacity(512 + entries.len() * 512);

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\" xmlns:news=\"");
    xml.push_str(NEWS_NS);
    xml.push_str("\">\n");
    xml.push_str("<!-- Google News sitemap generated by newsmap -->\n");

    let name = escape(&publication.name);
    let language = escape(&publication.language);

    for entry in entries {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape(&entry.loc));
        xml.push_str("</loc>\n    <news:news>\n      <news:publication>\n        <news:name>");
        xml.push_str(&name);
        xml.push_str("</news:name>\n        <news:language>");
        xml.push_str(&language);
        xml.push_str("</news:language>\n      </news:publication>\n      <news:publication_date>");
        xml.push_str(&escape(&entry.publication_date));
        xml.push_str("</news:publication_date>\n      <news:title>");
        xml.push_str(&escape(&entry.title));
        xml.push_str("</news:title>\n");
        if let Some(keywords) = &entry.keywords {
            xml.push_str("      <news:keywords>");
            xml.push_str(&escape(keywords));
            xml.push_str("</news:keywords>\n");
        }
        xml.push_str("    </news:news>\n  </url>\n");
    }

    xml.push_str("<!-- Total posts in sitemap: ");
    xml.push_str(&entries.len().to_string());
    xml.push_str(" -->\n</urlset>\n");
    xml
}

/// Escape `&`, `<`, `>`, `"` and `'` for element content.
fn escape(s: &str) -> Cow<'_, str> {
    html_escape::encode_quoted_attribute(s)
}
