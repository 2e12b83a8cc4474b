/// A named, mutable text blob addressable by a short alphanumeric id.
///
/// `share_id`, once assigned, is stable for the lifetime of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub id: String,
    pub content: String,
    pub share_id: Option<String>,
}

/// A single-use read-only note, deleted after its first successful read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnNoteRecord {
    pub burn_id: String,
    pub content: String,
}
