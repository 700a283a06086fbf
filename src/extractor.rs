use crate::{Document, LoadError};
use scraper::node::Text;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

/// Elements whose content never reaches the summary prompt.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "object", "embed", "template", "input", "button",
    "select", "textarea", "option", "aside", "menu", "audio", "video", "source", "track",
    "canvas", "svg", "meta", "link", "base", "title", "head",
];

/// Site chrome, skipped only as direct children of `<body>`. Inside an
/// article they usually hold the headline or byline.
const PAGE_CHROME_TAGS: &[&str] = &["header", "footer", "nav"];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "h1", "h2", "h3", "h4", "h5", "h6", "blockquote",
    "pre", "ul", "ol", "table", "tr", "dl", "dt", "dd", "figure", "figcaption", "form",
    "header", "footer", "nav",
];

/// Turns a fetched HTML page into a text [`Document`].
#[derive(Clone)]
pub struct TextExtractor;

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Strips markup from `html` and keeps the readable body text.
    ///
    /// Block elements become line breaks so paragraphs stay separated; runs of
    /// whitespace inside a line are collapsed.
    pub fn extract(&self, html: &str, url: &str) -> Result<Document, LoadError> {
        let document = Html::parse_document(html);

        let body_selector = selector("body")?;
        let root = document
            .select(&body_selector)
            .next()
            .unwrap_or_else(|| document.root_element());

        let mut raw = String::new();
        collect_text(root, &mut raw);
        let text = normalize_lines(&raw);

        let mut doc = Document::new(text).with_metadata("source", url);
        if let Some(title) = self.extract_title(&document) {
            doc = doc.with_metadata("title", title);
        }
        if let Some(description) = self.extract_description(&document) {
            doc = doc.with_metadata("description", description);
        }
        if let Some(language) = self.extract_language(&document) {
            doc = doc.with_metadata("language", language);
        }

        debug!(
            url = %url,
            text_length = doc.page_content.len(),
            "Extracted page text"
        );
        Ok(doc)
    }

    /// Wraps a plain-text response body without touching its content.
    pub fn extract_plain(&self, text: &str, url: &str) -> Document {
        Document::new(normalize_lines(text)).with_metadata("source", url)
    }

    fn extract_title(&self, document: &Html) -> Option<String> {
        let og_title_selector = Selector::parse("meta[property='og:title']").ok()?;
        let title_selector = Selector::parse("title").ok()?;

        let og_title = document
            .select(&og_title_selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|s| s.to_string());

        og_title
            .or_else(|| {
                document
                    .select(&title_selector)
                    .next()
                    .map(|el| el.text().collect::<String>())
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn extract_description(&self, document: &Html) -> Option<String> {
        let og_desc_selector = Selector::parse("meta[property='og:description']").ok()?;
        let meta_desc_selector = Selector::parse("meta[name='description']").ok()?;

        document
            .select(&og_desc_selector)
            .next()
            .and_then(|el| el.value().attr("content"))
            .or_else(|| {
                document
                    .select(&meta_desc_selector)
                    .next()
                    .and_then(|el| el.value().attr("content"))
            })
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn extract_language(&self, document: &Html) -> Option<String> {
        document
            .root_element()
            .value()
            .attr("lang")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

fn selector(css: &str) -> Result<Selector, LoadError> {
    Selector::parse(css)
        .map_err(|e| LoadError::Unsupported(format!("Invalid selector {css}: {e:?}")))
}

fn is_skipped(element: ElementRef) -> bool {
    let name = element.value().name();
    if SKIPPED_TAGS.contains(&name) {
        return true;
    }
    PAGE_CHROME_TAGS.contains(&name)
        && element
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|parent| parent.value().name() == "body")
}

enum Step<'a> {
    Enter(ElementRef<'a>),
    Leave(ElementRef<'a>),
    Text(&'a Text),
}

/// Walks the tree with an explicit stack; pages can nest far deeper than
/// the thread stack allows for recursion.
fn collect_text(root: ElementRef, out: &mut String) {
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Text(text) => {
                // line structure comes from block elements only
                out.extend(
                    text.text
                        .chars()
                        .map(|c| if c.is_whitespace() { ' ' } else { c }),
                );
            }
            Step::Enter(element) => {
                if is_skipped(element) {
                    continue;
                }
                match element.value().name() {
                    "br" => out.push('\n'),
                    "hr" => out.push_str("\n---\n"),
                    "li" => out.push_str("\n- "),
                    name if BLOCK_TAGS.contains(&name) => out.push('\n'),
                    _ => {}
                }

                stack.push(Step::Leave(element));
                let children: Vec<_> = element.children().collect();
                for child in children.into_iter().rev() {
                    match child.value() {
                        Node::Text(text) => stack.push(Step::Text(text)),
                        Node::Element(_) => {
                            if let Some(child_element) = ElementRef::wrap(child) {
                                stack.push(Step::Enter(child_element));
                            }
                        }
                        _ => {}
                    }
                }
            }
            Step::Leave(element) => match element.value().name() {
                "td" | "th" => out.push(' '),
                name if name == "li" || BLOCK_TAGS.contains(&name) => out.push('\n'),
                _ => {}
            },
        }
    }
}

/// Collapses whitespace within each line and drops empty lines.
fn normalize_lines(raw: &str) -> String {
    raw.lines()
        .map(crate::utils::collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
