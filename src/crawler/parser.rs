//! HTML parser for extracting page content and links
//!
//! This module handles parsing HTML content to extract:
//! - The page title (first `<title>` element)
//! - Body text (every `<p>` element, in document order)
//! - Raw `href` values of every `<a>` element, in document order

use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Text of the first `<title>`, trimmed; empty if absent
    pub title: String,

    /// Paragraph texts joined by newlines
    pub text: String,

    /// Raw href attributes, unresolved and unfiltered
    pub links: Vec<String>,
}

/// Parses HTML content into title, paragraph text and raw links
///
/// # Example
///
/// ```
/// use linkrank::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><p>Hello</p><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.text, "Hello");
/// assert_eq!(parsed.links, vec!["/page".to_string()]);
/// ```
pub fn parse_html(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        text: extract_paragraphs(&document),
        links: extract_hrefs(&document),
    }
}

fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return String::new();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn extract_paragraphs(document: &Html) -> String {
    let Ok(p_selector) = Selector::parse("p") else {
        return String::new();
    };

    document
        .select(&p_selector)
        .map(|element| element.text().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_hrefs(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
