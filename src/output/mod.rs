//! Output handling for crawl artifacts

mod snapshot;

pub use snapshot::{Checkpointer, OutputError, OutputResult};
