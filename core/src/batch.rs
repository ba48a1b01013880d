//! Runs independent queries against one index snapshot.

use crate::config::ExecutionMode;
use crate::error::Result;
use crate::index::{DocumentFilter, SearchIndex};
use crate::Document;
use rayon::prelude::*;
use tracing::info;

/// One result group per query, in input order. Queries run concurrently
/// on the rayon pool; each one is scored sequentially.
pub fn process_queries<S>(index: &SearchIndex, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    let groups = queries
        .par_iter()
        .map(|query| {
            index.find_top_documents_with(
                ExecutionMode::Sequential,
                query.as_ref(),
                DocumentFilter::Default,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    info!(
        queries = queries.len(),
        hits = groups.iter().map(Vec::len).sum::<usize>(),
        "processed query batch"
    );
    Ok(groups)
}

/// Same as [`process_queries`], exposed as one flattened sequence.
pub fn process_queries_joined<S>(index: &SearchIndex, queries: &[S]) -> Result<JoinedResults>
where
    S: AsRef<str> + Sync,
{
    process_queries(index, queries).map(JoinedResults::new)
}

/// Per-query result groups viewed as a single sequence.
///
/// Nothing is copied into a flat buffer: every traversal walks
/// (group, offset) positions over the groups, and a new traversal can be
/// started at any time.
#[derive(Debug, Clone, Default)]
pub struct JoinedResults {
    groups: Vec<Vec<Document>>,
}

impl JoinedResults {
    pub fn new(groups: Vec<Vec<Document>>) -> Self {
        Self { groups }
    }

    pub fn iter(&self) -> JoinedIter<'_> {
        JoinedIter {
            groups: &self.groups,
            group: 0,
            offset: 0,
        }
    }

    /// Total number of documents across all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }

    pub fn groups(&self) -> &[Vec<Document>] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<Vec<Document>> {
        self.groups
    }
}

impl<'a> IntoIterator for &'a JoinedResults {
    type Item = &'a Document;
    type IntoIter = JoinedIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct JoinedIter<'a> {
    groups: &'a [Vec<Document>],
    group: usize,
    offset: usize,
}

impl<'a> Iterator for JoinedIter<'a> {
    type Item = &'a Document;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(group) = self.groups.get(self.group) {
            if let Some(document) = group.get(self.offset) {
                self.offset += 1;
                return Some(document);
            }
            self.group += 1;
            self.offset = 0;
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .groups
            .get(self.group..)
            .map(|rest| rest.iter().map(Vec::len).sum::<usize>() - self.offset)
            .unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for JoinedIter<'_> {}

impl std::iter::FusedIterator for JoinedIter<'_> {}
