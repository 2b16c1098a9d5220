//! Extraction for XenForo-style forum markup
//!
//! Selectors target the stock XenForo 2 theme: node lists on the root page,
//! `structItem` rows on listings, `article.message` posts with
//! `pairs`-style metadata lists.

use crate::extract::FieldExtractor;
use crate::fetch::RenderedDocument;
use crate::state::{Category, Post, ThreadSummary};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Marks a thread page as rendered and extractable
const POST_CONTAINER: &str = "article.message";

/// The clickable next-page affordance
const NEXT_PAGE: &str = "a.pageNav-jump--next";

/// Candidate containers for the on-thread view count, in precedence order
const VIEW_COUNT_CANDIDATES: &[&str] = &[
    ".p-description .pairs dd",
    ".p-body-sidebar .pairs dd",
    ".p-title .p-title-pageAction",
];

/// [`FieldExtractor`] for XenForo-style forum markup
#[derive(Debug, Default)]
pub struct XenforoExtractor;

impl XenforoExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for XenforoExtractor {
    fn extract_categories(&self, doc: &RenderedDocument) -> Vec<Category> {
        let html = Html::parse_document(&doc.html);
        let mut categories = Vec::new();

        if let Ok(selector) = Selector::parse(".node--forum .node-title a[href]") {
            for element in html.select(&selector) {
                let name = collect_text(element);
                let href = element.value().attr("href").unwrap_or("");
                if name.is_empty() || href.is_empty() {
                    continue;
                }
                categories.push(Category {
                    name,
                    url: resolve(href, &doc.url),
                });
            }
        }

        categories
    }

    fn extract_thread_summaries(&self, doc: &RenderedDocument) -> Vec<ThreadSummary> {
        let html = Html::parse_document(&doc.html);
        let mut summaries = Vec::new();

        let Ok(row_selector) = Selector::parse(".structItem--thread") else {
            return summaries;
        };

        for row in html.select(&row_selector) {
            let title_link = thread_link(row);
            summaries.push(ThreadSummary {
                title: title_link.map(collect_text).filter(|t| !t.is_empty()),
                thread_url: title_link
                    .and_then(|link| link.value().attr("href"))
                    .map(|href| resolve(href, &doc.url)),
                replies: pair_value(row, "Replies"),
                views: pair_value(row, "Views"),
            });
        }

        summaries
    }

    fn extract_posts(&self, doc: &RenderedDocument) -> Vec<Post> {
        let html = Html::parse_document(&doc.html);
        let mut posts = Vec::new();

        let Ok(post_selector) = Selector::parse(POST_CONTAINER) else {
            return posts;
        };

        for article in html.select(&post_selector) {
            posts.push(extract_post(article));
        }

        posts
    }

    fn has_next_page(&self, doc: &RenderedDocument) -> bool {
        let html = Html::parse_document(&doc.html);
        match Selector::parse(NEXT_PAGE) {
            Ok(selector) => html.select(&selector).next().is_some(),
            Err(_) => false,
        }
    }

    fn view_count_fallback(&self, doc: &RenderedDocument) -> Option<String> {
        let html = Html::parse_document(&doc.html);

        for candidate in VIEW_COUNT_CANDIDATES {
            let Ok(selector) = Selector::parse(candidate) else {
                continue;
            };
            for element in html.select(&selector) {
                if let Some(number) = first_number(&collect_text(element)) {
                    return Some(number);
                }
            }
        }

        None
    }

    fn post_container_selector(&self) -> &str {
        POST_CONTAINER
    }

    fn next_page_selector(&self) -> &str {
        NEXT_PAGE
    }
}

/// Extracts all fields of a single post article
fn extract_post(article: ElementRef) -> Post {
    let username = article
        .value()
        .attr("data-author")
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .or_else(|| select_text(article, ".message-name"));

    let post_id = article
        .value()
        .attr("data-content")
        .or_else(|| article.value().attr("id"))
        .map(|id| id.to_string());

    let timestamp = select_attr(article, ".message-attribution time", "datetime")
        .or_else(|| select_attr(article, "time[datetime]", "datetime"))
        .map(|raw| normalize_timestamp(&raw));

    Post {
        username,
        user_title: select_text(article, ".message-userTitle"),
        timestamp,
        content: select_text(article, ".message-body .bbWrapper"),
        quote: select_text(article, ".message-body blockquote"),
        post_id,
        joined: pair_value(article, "Joined"),
        messages: pair_value(article, "Messages"),
        country: pair_value(article, "Country"),
        state: pair_value(article, "State"),
    }
}

/// Finds the title anchor of a listing row
///
/// The title cell can hold prefix-label links as well, so the first anchor
/// whose href points into `/threads/` wins.
fn thread_link(row: ElementRef) -> Option<ElementRef> {
    let selector = Selector::parse(".structItem-title a[href]").ok()?;
    row.select(&selector)
        .find(|link| {
            link.value()
                .attr("href")
                .is_some_and(|href| href.contains("/threads/"))
        })
        .or_else(|| row.select(&selector).next())
}

/// Reads the `dd` of the `dl` pair whose `dt` matches `label`
fn pair_value(scope: ElementRef, label: &str) -> Option<String> {
    let dl_selector = Selector::parse("dl").ok()?;
    let dt_selector = Selector::parse("dt").ok()?;
    let dd_selector = Selector::parse("dd").ok()?;

    for dl in scope.select(&dl_selector) {
        let Some(dt) = dl.select(&dt_selector).next() else {
            continue;
        };
        if !collect_text(dt).eq_ignore_ascii_case(label) {
            continue;
        }
        if let Some(dd) = dl.select(&dd_selector).next() {
            let value = collect_text(dd);
            if !value.is_empty() {
                return Some(value);
            }
        }
    }

    None
}

/// Text content of the first element matching `selector` within `scope`
fn select_text(scope: ElementRef, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    scope
        .select(&selector)
        .next()
        .map(collect_text)
        .filter(|t| !t.is_empty())
}

/// Attribute of the first element matching `selector` within `scope`
fn select_attr(scope: ElementRef, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    scope
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|v| v.to_string())
}

/// Collects and trims the text content of an element
fn collect_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Resolves a possibly relative href against the document URL
fn resolve(href: &str, base: &str) -> String {
    match Url::parse(base).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// First whitespace-separated token containing a digit, reduced to its digits
///
/// "1,204 views" yields "1204".
fn first_number(text: &str) -> Option<String> {
    text.split_whitespace()
        .find(|token| token.chars().any(|c| c.is_ascii_digit()))
        .map(|token| token.chars().filter(char::is_ascii_digit).collect::<String>())
        .filter(|digits| !digits.is_empty())
}

/// Normalizes a machine-readable timestamp to RFC 3339, keeping the raw
/// value when it does not parse
fn normalize_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .or_else(|_| chrono::DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|_| raw.to_string())
}
