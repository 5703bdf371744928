pub mod listing;

pub use listing::{ListingBatch, ListingRecord, PageId, StoredListing, ABSENT};
