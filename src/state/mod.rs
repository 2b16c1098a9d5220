//! Data model for the harvest: typed records and the run accumulator

mod crawl_state;
mod records;

pub use crawl_state::CrawlState;
pub use records::{thread_id_from_url, Category, Post, ThreadRecord, ThreadSummary};
