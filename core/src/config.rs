//! Tunables shared by the index, the scorer and the collaborators around them.

/// Upper bound on hits returned by a single top-documents query.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Shards in the per-query score accumulator.
pub const ACCUMULATOR_SHARD_COUNT: usize = 16;

/// Relevances closer than this are ranked as equal and ordered by rating.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

/// Number of trailing requests tracked by [`crate::RequestLog`] (one day of minutes).
pub const REQUEST_LOG_WINDOW: usize = 1440;

/// Per-call choice between running on the caller's thread and fanning out
/// over the rayon pool. Parallel calls still block until every task completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

impl ExecutionMode {
    pub fn is_parallel(self) -> bool {
        matches!(self, ExecutionMode::Parallel)
    }
}
