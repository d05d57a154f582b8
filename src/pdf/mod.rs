//! PDF merging and inspection

pub mod merge;
pub mod metadata;

// Re-export commonly used items
pub use merge::{merge_bytes, merge_documents};
pub use metadata::{count_pages, count_pages_in};
