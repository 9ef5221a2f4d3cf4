use thiserror::Error;

/// Why a query or configuration call on a tree collection was rejected.
///
/// Every variant is a precondition failure: the collection is left exactly as it
/// was before the call.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum TreeError {
    /// The query needs at least one element.
    #[error("the collection is empty")]
    EmptyCollection,
    /// No key satisfies the neighbor query.
    #[error("no key satisfies the query")]
    NotFound,
    /// A 1-based position outside `1..=len`.
    #[error("position {index} is outside 1..={len}")]
    OutOfRange {
        /// The requested position.
        index: usize,
        /// The number of positions available.
        len: usize,
    },
    /// A documented calling convention was violated.
    #[error("usage error: {0}")]
    Usage(&'static str),
}
