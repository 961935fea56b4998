use tracing::{debug, warn};

use crate::models::{HistoryEntry, HistoryWindow, ReviewRecord};

/// Filter a freshly-fetched batch down to reviews not seen before, in the
/// order the provider delivered them (typically newest-first).
///
/// Accepted reviews are appended to `history` as they are found, so a
/// duplicate id later in the same batch is treated as already seen. After all
/// appends the window is trimmed back to its cap, oldest entries first.
///
/// `language_filter` applies exact matching on the reviewer language and is
/// only used on the Android path; the Apple feed is pre-scoped by store front.
pub fn filter_new(
    records: Vec<ReviewRecord>,
    history: &mut HistoryWindow,
    language_filter: Option<&str>,
) -> Vec<ReviewRecord> {
    let mut accepted = Vec::new();

    for record in records {
        if let Some(lang) = language_filter {
            if record.language.as_deref() != Some(lang) {
                continue;
            }
        }

        if history.contains(&record.id) {
            debug!(id = %record.id, "Already delivered, skipping");
            continue;
        }

        history.push(HistoryEntry::from(&record));
        accepted.push(record);
    }

    let evicted = history.trim();
    if evicted > 0 {
        warn!(evicted, "Removing old review(s) from history");
    }

    accepted
}
