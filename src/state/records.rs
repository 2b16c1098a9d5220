//! Typed records produced by the harvest
//!
//! Field names on [`ThreadRecord`] and [`Post`] are part of the output
//! contract: downstream tooling flattens the JSON artifacts by these exact
//! keys.

use serde::{Deserialize, Serialize};

/// A top-level forum section containing threads
///
/// Discovered once from the root listing; identified by URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub url: String,
}

/// One row of a category listing page
///
/// Listing markup may omit any of these; a missing field is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub title: Option<String>,
    pub thread_url: Option<String>,
    pub replies: Option<String>,
    pub views: Option<String>,
}

/// A single post as extracted from a thread page
///
/// Every field is optional: absence in the markup is a valid outcome,
/// represented as null in the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub username: Option<String>,
    pub user_title: Option<String>,
    pub timestamp: Option<String>,
    pub content: Option<String>,
    pub quote: Option<String>,
    pub post_id: Option<String>,
    pub joined: Option<String>,
    pub messages: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
}

/// The complete record for one harvested thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRecord {
    pub thread_id: String,
    pub thread_title: Option<String>,
    pub thread_url: String,
    pub thread_views: Option<String>,
    pub thread_replies: usize,
    pub forum_category: String,
    pub original_post: Option<Post>,
    pub replies: Vec<Post>,
}

impl ThreadRecord {
    /// Assembles a record from a listing summary and the harvested posts
    ///
    /// The first post becomes the original post, the remainder the replies.
    /// `views_override` comes from the thread page itself and takes
    /// precedence over the listing value.
    pub fn assemble(
        summary: &ThreadSummary,
        thread_url: &str,
        category: &str,
        posts: Vec<Post>,
        views_override: Option<String>,
    ) -> Self {
        let mut posts = posts.into_iter();
        let original_post = posts.next();
        let replies: Vec<Post> = posts.collect();

        Self {
            thread_id: thread_id_from_url(thread_url),
            thread_title: summary.title.clone(),
            thread_url: thread_url.to_string(),
            thread_views: views_override.or_else(|| summary.views.clone()),
            thread_replies: replies.len(),
            forum_category: category.to_string(),
            original_post,
            replies,
        }
    }
}

/// Derives a thread identifier from the final path segment of its URL
///
/// `/community/threads/hi.123/` yields `hi.123`. A URL without path
/// segments falls back to the URL itself, so the identifier is non-empty
/// whenever the URL is.
pub fn thread_id_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let tail = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if tail.is_empty() {
        url.to_string()
    } else {
        tail.to_string()
    }
}
