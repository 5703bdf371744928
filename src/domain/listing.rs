use serde::Serialize;
use std::fmt;

/// Integer value meaning "not present in source text".
pub const ABSENT: i64 = -1;

/// Identifier of the page a listing came from (`webpages.page_ID`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageId(pub i64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One normalized row, ready for the `listings` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRecord {
    pub source_page_id: PageId,
    pub rent: i64,
    pub bedrooms: i64,     // ABSENT when missing
    pub sq_feet: i64,      // ABSENT when missing
    pub location: String,  // "" when missing
}

/// All records extracted from one page, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingBatch {
    source_page_id: PageId,
    records: Vec<ListingRecord>,
}

impl ListingBatch {
    pub fn empty(source_page_id: PageId) -> Self {
        Self {
            source_page_id,
            records: Vec::new(),
        }
    }

    /// Appends a record, stamping it with the batch's page id so every
    /// record in a batch shares the same `source_page_id`.
    pub(crate) fn push(&mut self, mut record: ListingRecord) {
        record.source_page_id = self.source_page_id;
        self.records.push(record);
    }

    pub fn source_page_id(&self) -> PageId {
        self.source_page_id
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A listing row as read back from the store.
#[derive(Debug, Clone, Serialize)]
pub struct StoredListing {
    pub id: i64,
    pub record: ListingRecord,
    pub scraped_at: chrono::NaiveDateTime,
}
