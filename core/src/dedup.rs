use crate::index::SearchIndex;
use crate::DocId;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Remove every document whose set of terms equals that of a document with a
/// lower id. Returns the removed ids in ascending order.
pub fn remove_duplicates(index: &mut SearchIndex) -> Vec<DocId> {
    let mut seen: BTreeSet<Vec<Arc<str>>> = BTreeSet::new();
    let mut duplicates = Vec::new();
    for id in index.document_ids() {
        let terms: Vec<Arc<str>> = index.get_word_frequencies(id).keys().cloned().collect();
        if !seen.insert(terms) {
            duplicates.push(id);
        }
    }

    for &id in &duplicates {
        info!(id, "found duplicate document");
        index.remove_document(id);
    }
    duplicates
}
