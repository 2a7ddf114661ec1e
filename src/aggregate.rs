//! Counting product keys into a ranked table

use std::collections::HashMap;

use crate::types::{KeyError, ProductKey, RankedEntry};

/// Running count of product keys in first-seen order
#[derive(Debug, Default, Clone)]
pub struct Tally {
    entries: Vec<RankedEntry>,
    index: HashMap<ProductKey, usize>,
    total: usize,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `key`
    pub fn record(&mut self, key: ProductKey) {
        self.bump(key, None);
    }

    /// Count one occurrence of `key`, remembering `source_url` if this is the
    /// first time the key is seen
    pub fn record_with_source(&mut self, key: ProductKey, source_url: &str) {
        self.bump(key, Some(source_url));
    }

    fn bump(&mut self, key: ProductKey, source_url: Option<&str>) {
        self.total += 1;
        match self.index.get(&key) {
            Some(&idx) => self.entries[idx].count += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                let mut entry = RankedEntry::new(key, 1);
                entry.source_url = source_url.map(str::to_string);
                self.entries.push(entry);
            }
        }
    }

    /// Keys recorded so far, including repeats
    pub fn total(&self) -> usize {
        self.total
    }

    /// Distinct keys recorded so far
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish counting: sort by count descending, ties in first-seen order
    pub fn into_ranked(self) -> Vec<RankedEntry> {
        let mut entries = self.entries;
        // sort_by is stable, so equal counts keep insertion order
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }
}

impl Extend<ProductKey> for Tally {
    fn extend<I: IntoIterator<Item = ProductKey>>(&mut self, iter: I) {
        for key in iter {
            self.record(key);
        }
    }
}

/// Count `keys` and rank them. Empty input gives an empty table.
pub fn aggregate<I>(keys: I) -> Vec<RankedEntry>
where
    I: IntoIterator<Item = ProductKey>,
{
    let mut tally = Tally::new();
    tally.extend(keys);
    tally.into_ranked()
}

/// Like `aggregate`, for untyped key strings from outside the pipeline.
///
/// Rejects the whole input on the first structurally invalid key instead of
/// producing a table that mixes valid and corrupt rows.
pub fn aggregate_strs<I, S>(keys: I) -> Result<Vec<RankedEntry>, KeyError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tally = Tally::new();
    for (position, raw) in keys.into_iter().enumerate() {
        tally.record(ProductKey::parse(raw.as_ref(), position)?);
    }
    Ok(tally.into_ranked())
}
