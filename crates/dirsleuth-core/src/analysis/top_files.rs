/// Top-N largest items of a scan result.
///
/// Used by front-ends for the "largest items" view; folders compete with
/// files on their aggregate size. Errors never appear.
use crate::model::Entry;
use std::cmp::Ordering;

/// Largest first; equal sizes by name so the order is stable.
fn by_size_desc(a: &&Entry, b: &&Entry) -> Ordering {
    b.size_bytes
        .cmp(&a.size_bytes)
        .then_with(|| a.name.cmp(&b.name))
}

/// Get the `n` largest files and folders, largest first.
///
/// Uses `select_nth_unstable_by` (O(n) average) to bring the top-n
/// elements to the front, then sorts only those.
pub fn top_entries(entries: &[Entry], n: usize) -> Vec<&Entry> {
    if n == 0 {
        return Vec::new();
    }

    let mut items: Vec<&Entry> = entries.iter().filter(|e| !e.is_error()).collect();
    if items.len() > n {
        items.select_nth_unstable_by(n - 1, by_size_desc);
        items.truncate(n);
    }
    items.sort_unstable_by(by_size_desc);
    items
}
