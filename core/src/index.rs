//! In-memory inverted/forward index and the document store.
//!
//! Terms are interned once as `Arc<str>` keys of the inverted index; the
//! forward index shares those same allocations rather than owning copies.

use crate::config::ExecutionMode;
use crate::error::{Result, SearchError};
use crate::query::{parse_query, Query};
use crate::tokenizer::{tokenize, validate_term};
use crate::{DocId, DocumentStatus, Rating};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// term -> term frequency within one document.
pub type WordFrequencies = BTreeMap<Arc<str>, f64>;

/// doc id -> term frequency, for one term.
pub(crate) type Postings = BTreeMap<DocId, f64>;

static EMPTY_FREQUENCIES: WordFrequencies = BTreeMap::new();

#[derive(Debug, Clone, Copy)]
pub(crate) struct DocumentData {
    pub rating: Rating,
    pub status: DocumentStatus,
}

/// Which documents a ranking query may return.
#[derive(Clone, Copy, Default)]
pub enum DocumentFilter<'a> {
    /// Only [`DocumentStatus::Active`] documents.
    #[default]
    Default,
    Status(DocumentStatus),
    Custom(&'a (dyn Fn(DocId, DocumentStatus, Rating) -> bool + Sync)),
}

impl DocumentFilter<'_> {
    pub fn matches(&self, id: DocId, status: DocumentStatus, rating: Rating) -> bool {
        match self {
            DocumentFilter::Default => status == DocumentStatus::Active,
            DocumentFilter::Status(wanted) => status == *wanted,
            DocumentFilter::Custom(predicate) => predicate(id, status, rating),
        }
    }
}

impl fmt::Debug for DocumentFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFilter::Default => f.write_str("Default"),
            DocumentFilter::Status(status) => f.debug_tuple("Status").field(status).finish(),
            DocumentFilter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<DocumentStatus> for DocumentFilter<'_> {
    fn from(status: DocumentStatus) -> Self {
        DocumentFilter::Status(status)
    }
}

/// Not internally synchronized: callers serialize mutation against other
/// mutation and against in-flight queries (`&mut self` enforces this).
#[derive(Debug, Default)]
pub struct SearchIndex {
    pub(crate) stop_words: BTreeSet<String>,
    pub(crate) word_to_documents: BTreeMap<Arc<str>, Postings>,
    pub(crate) document_to_words: BTreeMap<DocId, WordFrequencies>,
    pub(crate) documents: BTreeMap<DocId, DocumentData>,
    pub(crate) document_ids: BTreeSet<DocId>,
}

impl SearchIndex {
    /// Build an index with the given stop words. Empty stop words are ignored.
    pub fn new<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::default();
        for word in stop_words {
            let word = validate_term(word.as_ref())?;
            if !word.is_empty() {
                index.stop_words.insert(word.to_string());
            }
        }
        Ok(index)
    }

    /// Build an index from a whitespace-separated stop-word string.
    pub fn from_stop_words_text(text: &str) -> Result<Self> {
        Self::new(tokenize(text))
    }

    pub fn stop_words(&self) -> &BTreeSet<String> {
        &self.stop_words
    }

    pub fn parse_query<'q>(&self, raw_query: &'q str) -> Result<Query<'q>> {
        parse_query(raw_query, &self.stop_words)
    }

    /// Tokenize `text`, drop stop words and validate what remains.
    fn split_into_words_no_stop<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut words = Vec::new();
        for word in tokenize(text) {
            if !self.stop_words.contains(word) {
                words.push(validate_term(word)?);
            }
        }
        Ok(words)
    }

    /// Add a document. Either fully succeeds or leaves the index untouched.
    pub fn add_document(
        &mut self,
        id: DocId,
        content: &str,
        status: DocumentStatus,
        ratings: &[Rating],
    ) -> Result<()> {
        if content.is_empty() {
            return Err(SearchError::EmptyDocument);
        }
        if self.documents.contains_key(&id) {
            return Err(SearchError::DuplicateId(id));
        }
        if id < 0 {
            return Err(SearchError::NegativeId(id));
        }

        let words = self.split_into_words_no_stop(content)?;
        let mut term_freqs: BTreeMap<&str, f64> = BTreeMap::new();
        if !words.is_empty() {
            let inv_word_count = 1.0 / words.len() as f64;
            for &word in &words {
                *term_freqs.entry(word).or_insert(0.0) += inv_word_count;
            }
        }

        let mut forward = WordFrequencies::new();
        for (word, freq) in term_freqs {
            let term = self.intern(word);
            self.word_to_documents
                .entry(Arc::clone(&term))
                .or_default()
                .insert(id, freq);
            forward.insert(term, freq);
        }
        debug!(id, terms = forward.len(), words = words.len(), "document added");

        self.document_to_words.insert(id, forward);
        self.documents.insert(
            id,
            DocumentData {
                rating: compute_average_rating(ratings),
                status,
            },
        );
        self.document_ids.insert(id);
        Ok(())
    }

    /// Shared handle to the canonical storage of `word`, creating it if needed.
    fn intern(&self, word: &str) -> Arc<str> {
        match self.word_to_documents.get_key_value(word) {
            Some((term, _)) => Arc::clone(term),
            None => Arc::from(word),
        }
    }

    pub fn remove_document(&mut self, id: DocId) {
        self.remove_document_with_mode(ExecutionMode::Sequential, id);
    }

    /// Remove a document; unknown ids are a no-op.
    ///
    /// The affected posting lists are detached first. Erasing `id` from each of
    /// them touches disjoint maps and may fan out in parallel mode; putting the
    /// non-empty ones back mutates the shared term map and always runs on the
    /// calling thread, after every erasure has finished.
    pub fn remove_document_with_mode(&mut self, mode: ExecutionMode, id: DocId) {
        if !self.document_ids.contains(&id) {
            return;
        }
        let words = self.document_to_words.remove(&id).unwrap_or_default();

        let mut detached: Vec<(Arc<str>, Postings)> = words
            .keys()
            .filter_map(|term| self.word_to_documents.remove_entry(&**term))
            .collect();

        let erase = |(_, postings): &mut (Arc<str>, Postings)| {
            postings.remove(&id);
        };
        if mode.is_parallel() {
            detached.par_iter_mut().for_each(erase);
        } else {
            detached.iter_mut().for_each(erase);
        }

        let mut pruned = 0usize;
        for (term, postings) in detached {
            if postings.is_empty() {
                pruned += 1;
            } else {
                self.word_to_documents.insert(term, postings);
            }
        }

        self.documents.remove(&id);
        self.document_ids.remove(&id);
        debug!(id, terms = words.len(), pruned, "document removed");
    }

    /// Term frequencies of a live document, or an empty map for unknown ids.
    pub fn get_word_frequencies(&self, id: DocId) -> &WordFrequencies {
        self.document_to_words
            .get(&id)
            .unwrap_or(&EMPTY_FREQUENCIES)
    }

    pub fn document_count(&self) -> usize {
        self.document_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_ids.is_empty()
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.document_ids.contains(&id)
    }

    /// Live document ids in ascending order.
    pub fn document_ids(&self) -> impl DoubleEndedIterator<Item = DocId> + '_ {
        self.document_ids.iter().copied()
    }

    pub fn document_status(&self, id: DocId) -> Option<DocumentStatus> {
        self.documents.get(&id).map(|data| data.status)
    }

    pub fn document_rating(&self, id: DocId) -> Option<Rating> {
        self.documents.get(&id).map(|data| data.rating)
    }

    /// Posting list of a term: doc id -> term frequency.
    pub fn postings(&self, term: &str) -> Option<&BTreeMap<DocId, f64>> {
        self.word_to_documents.get(term)
    }

    pub fn term_count(&self) -> usize {
        self.word_to_documents.len()
    }
}

impl<'a> IntoIterator for &'a SearchIndex {
    type Item = DocId;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, DocId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.document_ids.iter().copied()
    }
}

/// Floor of the mean rating, 0 for no ratings.
fn compute_average_rating(ratings: &[Rating]) -> Rating {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    sum.div_euclid(ratings.len() as i64) as Rating
}
