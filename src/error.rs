use thiserror::Error;

/// Errors the core can surface across its API boundary.
///
/// The core never panics on adversarial or malformed input from the chain; it degrades to a
/// no-op (see the individual mutator docs) instead. These two variants are the only conditions
/// that are actually exceptional from a caller's point of view.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DlobError {
    /// A floating-limit node, or a merge/price read that needed live oracle data, was evaluated
    /// without an oracle price being supplied.
    #[error("oracle price required but not supplied")]
    MissingOracle,

    /// A mutator or reader was invoked for a `marketIndex` outside the set the `DLOB` was
    /// constructed with.
    #[error("unknown market index {0}")]
    UnknownMarket(i64),
}

pub type DlobResult<T> = Result<T, DlobError>;
