//! Field extraction: typed values out of rendered documents
//!
//! Extraction is a pure mapping from a [`RenderedDocument`] to the data
//! model; everything selector-specific lives behind [`FieldExtractor`] so a
//! different target site only needs a different implementation.

mod xenforo;

pub use xenforo::XenforoExtractor;

use crate::fetch::RenderedDocument;
use crate::state::{Category, Post, ThreadSummary};

/// Site-specific extraction of typed fields from rendered pages
///
/// All methods are infallible mappings: markup that does not match simply
/// yields empty collections or `None` values.
pub trait FieldExtractor: Send + Sync {
    /// Categories found on the root listing
    fn extract_categories(&self, doc: &RenderedDocument) -> Vec<Category>;

    /// Thread rows found on a category listing page
    fn extract_thread_summaries(&self, doc: &RenderedDocument) -> Vec<ThreadSummary>;

    /// Posts found on a thread page, in page order
    fn extract_posts(&self, doc: &RenderedDocument) -> Vec<Post>;

    /// Whether the page carries a next-page affordance
    fn has_next_page(&self, doc: &RenderedDocument) -> bool;

    /// View count read from the thread page itself, when present
    ///
    /// Thread pages are a more authoritative source than listing rows, so a
    /// value returned here overrides the listing one.
    fn view_count_fallback(&self, doc: &RenderedDocument) -> Option<String>;

    /// Selector whose presence marks a usable thread page
    fn post_container_selector(&self) -> &str;

    /// Selector for the clickable next-page affordance
    fn next_page_selector(&self) -> &str;
}
