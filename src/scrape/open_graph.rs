use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Error, Result};
use crate::models::OpenGraphData;

/// `rel` tokens that identify a favicon link, in order of preference.
const FAVICON_RELS: &[&str] = &["icon", "apple-touch-icon"];

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::ParseError(format!("selector {}: {:?}", css, e)))
}

/// Extracts Open Graph tags and a favicon URL from a homepage.
///
/// `og:image` and the favicon are resolved against `page_url`. When the page
/// has no `og:title`/`og:description`, the `<title>` element and
/// `<meta name="description">` stand in. Without any icon link the favicon
/// falls back to `/favicon.ico` on the page's host.
pub fn parse_open_graph(html: &str, page_url: &Url) -> Result<OpenGraphData> {
    let doc = Html::parse_document(html);
    let mut og = OpenGraphData::default();

    for el in doc.select(&selector("meta[property]")?) {
        let Some(prop) = el.value().attr("property") else {
            continue;
        };
        let Some(key) = prop.trim().strip_prefix("og:") else {
            continue;
        };
        let slot = match key.to_ascii_lowercase().as_str() {
            "title" => &mut og.title,
            "description" => &mut og.description,
            "image" => &mut og.image,
            "type" => &mut og.og_type,
            "url" => &mut og.url,
            "site_name" => &mut og.site_name,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(el.value().attr("content").unwrap_or("").trim().to_string());
        }
    }

    og.image = og.image.map(|image| resolve(page_url, &image));

    if is_blank(&og.title) {
        if let Some(title) = doc.select(&selector("title")?).next() {
            og.title = Some(element_text(&title));
        }
    }

    if is_blank(&og.description) {
        if let Some(meta) = doc.select(&selector(r#"meta[name="description"]"#)?).next() {
            og.description = Some(meta.value().attr("content").unwrap_or("").trim().to_string());
        }
    }

    og.favicon = Some(find_favicon(&doc, page_url)?);
    Ok(og)
}

fn find_favicon(doc: &Html, page_url: &Url) -> Result<String> {
    let links = selector("link[rel][href]")?;

    for wanted in FAVICON_RELS {
        let found = doc.select(&links).find_map(|el| {
            let rel = el.value().attr("rel")?;
            let href = el.value().attr("href")?.trim();
            let matches = rel
                .split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case(wanted));
            (matches && !href.is_empty()).then(|| resolve(page_url, href))
        });
        if let Some(favicon) = found {
            return Ok(favicon);
        }
    }

    Ok(page_url.join("/favicon.ico")?.to_string())
}

fn resolve(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://earth.example.com/app/").unwrap()
    }

    #[test]
    fn test_reads_og_tags() {
        let html = r#"<html><head>
            <meta property="og:title" content="Earth">
            <meta property="og:description" content="A tiny globe">
            <meta property="og:image" content="/img/card.png">
            <meta property="og:type" content="website">
            <meta property="og:url" content="https://earth.example.com">
            <meta property="og:site_name" content="Earth Site">
            <link rel="icon" href="favicon.svg">
            <title>Ignored</title>
        </head></html>"#;

        let og = parse_open_graph(html, &page()).unwrap();
        assert_eq!(og.title.as_deref(), Some("Earth"));
        assert_eq!(og.description.as_deref(), Some("A tiny globe"));
        assert_eq!(og.image.as_deref(), Some("https://earth.example.com/img/card.png"));
        assert_eq!(og.og_type.as_deref(), Some("website"));
        assert_eq!(og.url.as_deref(), Some("https://earth.example.com"));
        assert_eq!(og.site_name.as_deref(), Some("Earth Site"));
        assert_eq!(
            og.favicon.as_deref(),
            Some("https://earth.example.com/app/favicon.svg")
        );
    }

    #[test]
    fn test_falls_back_to_title_and_description() {
        let html = r#"<html><head>
            <title>  Earth Home </title>
            <meta name="description" content=" plain description ">
        </head><body></body></html>"#;

        let og = parse_open_graph(html, &page()).unwrap();
        assert_eq!(og.title.as_deref(), Some("Earth Home"));
        assert_eq!(og.description.as_deref(), Some("plain description"));
        assert_eq!(og.image, None);
        assert_eq!(
            og.favicon.as_deref(),
            Some("https://earth.example.com/favicon.ico")
        );
    }

    #[test]
    fn test_favicon_prefers_icon_over_apple_touch() {
        let html = r#"<html><head>
            <link rel="apple-touch-icon" href="/touch.png">
            <link rel="shortcut icon" href="https://cdn.example.com/fav.ico">
        </head></html>"#;

        let og = parse_open_graph(html, &page()).unwrap();
        assert_eq!(og.favicon.as_deref(), Some("https://cdn.example.com/fav.ico"));
    }
}
