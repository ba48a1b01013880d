use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub mod accumulator;
pub mod batch;
pub mod config;
pub mod dedup;
pub mod error;
pub mod index;
pub mod paginator;
pub mod query;
mod ranker;
pub mod request_log;
pub mod tokenizer;

pub use batch::{process_queries, process_queries_joined, JoinedResults};
pub use config::ExecutionMode;
pub use dedup::remove_duplicates;
pub use error::{ErrorKind, Result, SearchError};
pub use index::{DocumentFilter, SearchIndex, WordFrequencies};
pub use paginator::{paginate, Paginator};
pub use request_log::RequestLog;

pub type DocId = i32;
pub type Rating = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Active,
    Irrelevant,
    Banned,
    Removed,
}

/// A ranked hit. `relevance` is computed per query and never stored in the index.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: Rating,
}

impl Document {
    pub fn new(id: DocId, relevance: f64, rating: Rating) -> Self {
        Self { id, relevance, rating }
    }

    /// Ranking comparator: higher relevance first; relevances closer than
    /// `RELEVANCE_EPSILON` fall back to higher rating first.
    pub fn ranking_order(&self, other: &Self) -> Ordering {
        if (self.relevance - other.relevance).abs() < config::RELEVANCE_EPSILON {
            other.rating.cmp(&self.rating)
        } else {
            other
                .relevance
                .partial_cmp(&self.relevance)
                .unwrap_or(Ordering::Equal)
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.rating == other.rating
            && (self.relevance - other.relevance).abs() < config::RELEVANCE_EPSILON
    }
}
