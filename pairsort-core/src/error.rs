/// Error type for session construction and driving.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SortError {
    #[error("Cannot sort an empty item list")]
    EmptyRegistry,

    #[error("Invalid target count: k = {k} must be between 1 and {n}")]
    InvalidTarget { k: usize, n: usize },

    #[error("Too many items: {count} > 256 (IDs must fit in one byte)")]
    TooManyItems { count: usize },

    #[error("Duplicate item ID: {0}")]
    DuplicateId(u8),

    #[error("Unknown choice \"{0}\" (expected Left, Right or Tie)")]
    UnknownChoice(String),

    #[error("Unknown sort mode \"{0}\" (expected top-10, top-20, top-30, top-40, top-50 or full)")]
    UnknownMode(String),

    #[error("A choice was supplied but no comparison is pending")]
    UnexpectedChoice,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Choice history has {len} entries but the sort finished after {consumed}")]
    HistoryOverrun { consumed: usize, len: usize },
}
