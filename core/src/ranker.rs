//! TF-IDF ranking and term matching over a [`SearchIndex`].

use crate::accumulator::ConcurrentAccumulator;
use crate::config::{ExecutionMode, ACCUMULATOR_SHARD_COUNT, MAX_RESULT_DOCUMENT_COUNT};
use crate::error::{Result, SearchError};
use crate::index::{DocumentFilter, SearchIndex};
use crate::query::Query;
use crate::{DocId, Document, DocumentStatus, Rating};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

impl SearchIndex {
    /// Top documents among [`DocumentStatus::Active`] ones.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionMode::Sequential, raw_query, DocumentFilter::Default)
    }

    pub fn find_top_documents_by_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionMode::Sequential, raw_query, status)
    }

    pub fn find_top_documents_by<F>(&self, raw_query: &str, predicate: F) -> Result<Vec<Document>>
    where
        F: Fn(DocId, DocumentStatus, Rating) -> bool + Sync,
    {
        self.find_top_documents_with(
            ExecutionMode::Sequential,
            raw_query,
            DocumentFilter::Custom(&predicate),
        )
    }

    /// Rank documents for `raw_query` and keep the best
    /// [`MAX_RESULT_DOCUMENT_COUNT`] of them.
    ///
    /// Output order depends only on the index and the query: relevance
    /// descending, then rating descending for relevances within
    /// `RELEVANCE_EPSILON` of each other.
    pub fn find_top_documents_with<'f>(
        &self,
        mode: ExecutionMode,
        raw_query: &str,
        filter: impl Into<DocumentFilter<'f>>,
    ) -> Result<Vec<Document>> {
        let query = self.parse_query(raw_query)?;
        let documents = self.find_all_documents(mode, &query, &filter.into());

        let mut documents = sort_by_rank(documents, mode.is_parallel());
        documents.truncate(MAX_RESULT_DOCUMENT_COUNT);
        Ok(documents)
    }

    fn find_all_documents(
        &self,
        mode: ExecutionMode,
        query: &Query<'_>,
        filter: &DocumentFilter<'_>,
    ) -> Vec<Document> {
        let document_count = self.document_count() as f64;
        let accumulator = ConcurrentAccumulator::<f64>::new(ACCUMULATOR_SHARD_COUNT);

        let score_term = |term: &&str| {
            let Some(postings) = self.word_to_documents.get(*term) else {
                return;
            };
            let idf = (document_count / postings.len() as f64).ln();
            for (&id, &term_freq) in postings {
                let Some(data) = self.documents.get(&id) else {
                    continue;
                };
                if filter.matches(id, data.status, data.rating) {
                    accumulator.accumulate(id, term_freq * idf);
                }
            }
        };
        if mode.is_parallel() {
            query.plus.par_iter().for_each(&score_term);
        } else {
            query.plus.iter().for_each(&score_term);
        }

        let mut relevance = accumulator.merge();
        self.exclude_minus_terms(query, &mut relevance);
        debug!(
            plus = query.plus.len(),
            minus = query.minus.len(),
            candidates = relevance.len(),
            ?mode,
            "scored query"
        );

        relevance
            .into_iter()
            .filter_map(|(id, relevance)| {
                self.documents
                    .get(&id)
                    .map(|data| Document::new(id, relevance, data.rating))
            })
            .collect()
    }

    /// Erases every candidate that contains a minus term. Runs on the calling
    /// thread only, after scoring has been merged.
    fn exclude_minus_terms(&self, query: &Query<'_>, relevance: &mut BTreeMap<DocId, f64>) {
        for term in &query.minus {
            if let Some(postings) = self.word_to_documents.get(*term) {
                for id in postings.keys() {
                    relevance.remove(id);
                }
            }
        }
    }

    pub fn match_document(
        &self,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<&str>, DocumentStatus)> {
        self.match_document_with_mode(ExecutionMode::Sequential, raw_query, id)
    }

    /// Plus terms of `raw_query` present in document `id`, in term order.
    ///
    /// A document containing any minus term matches nothing; its status is
    /// still reported.
    pub fn match_document_with_mode(
        &self,
        mode: ExecutionMode,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<&str>, DocumentStatus)> {
        let data = self
            .documents
            .get(&id)
            .ok_or(SearchError::DocumentNotFound(id))?;
        let query = self.parse_query(raw_query)?;
        let words = self.get_word_frequencies(id);

        let has_minus = |term: &&str| words.contains_key(*term);
        let excluded = if mode.is_parallel() {
            query.minus.par_iter().any(has_minus)
        } else {
            query.minus.iter().any(has_minus)
        };
        if excluded {
            return Ok((Vec::new(), data.status));
        }

        let matched = query
            .plus
            .iter()
            .filter_map(|term| words.get_key_value(*term).map(|(word, _)| &**word))
            .collect();
        Ok((matched, data.status))
    }
}

/// Below this length a run is sorted by insertion instead of being split.
const INSERTION_SORT_THRESHOLD: usize = 16;

/// Stable merge sort by [`Document::ranking_order`].
///
/// The epsilon tie-break is not transitive, so `slice::sort_by` and
/// `par_sort_by` may panic on it. This sort only ever asks "does the right
/// element rank strictly before the left one", which stays well defined for
/// any comparator. Splits do not depend on `parallel`, so both modes return
/// the same order.
fn sort_by_rank(mut documents: Vec<Document>, parallel: bool) -> Vec<Document> {
    let len = documents.len();
    if len <= INSERTION_SORT_THRESHOLD {
        insertion_sort(&mut documents);
        return documents;
    }
    let right = documents.split_off(len / 2);
    let (left, right) = if parallel {
        rayon::join(
            || sort_by_rank(documents, true),
            || sort_by_rank(right, true),
        )
    } else {
        (sort_by_rank(documents, false), sort_by_rank(right, false))
    };
    merge_ranked(left, right)
}

fn insertion_sort(documents: &mut [Document]) {
    for i in 1..documents.len() {
        let mut j = i;
        while j > 0 && documents[j].ranking_order(&documents[j - 1]) == Ordering::Less {
            documents.swap(j, j - 1);
            j -= 1;
        }
    }
}

fn merge_ranked(left: Vec<Document>, right: Vec<Document>) -> Vec<Document> {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if right[j].ranking_order(&left[i]) == Ordering::Less {
            merged.push(right[j]);
            j += 1;
        } else {
            merged.push(left[i]);
            i += 1;
        }
    }
    merged.extend_from_slice(&left[i..]);
    merged.extend_from_slice(&right[j..]);
    merged
}
