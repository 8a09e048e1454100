use crate::feed::types::IpoEntry;

/// Result of comparing a fetched page against the stored watermark.
#[derive(Debug, Clone, PartialEq)]
pub struct Diff {
    /// Entries with an id above the watermark, in source order.
    pub new_entries: Vec<IpoEntry>,
    /// Highest id on the whole page, 0 for an empty page.
    pub new_max_id: u64,
}

impl Diff {
    pub fn new_ids(&self) -> Vec<u64> {
        self.new_entries.iter().map(|e| e.ipo_id).collect()
    }
}

pub fn select_new(entries: Vec<IpoEntry>, last_max_id: u64) -> Diff {
    let new_max_id = entries.iter().map(|e| e.ipo_id).max().unwrap_or(0);
    let new_entries = entries
        .into_iter()
        .filter(|e| e.ipo_id > last_max_id)
        .collect();
    Diff {
        new_entries,
        new_max_id,
    }
}
