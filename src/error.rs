use thiserror::Error;

/// Errors reported by table and cursor operations.
///
/// Lookups and removals of absent values are not errors; they report `false`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// `swap` was called without a partner table, or a cursor was handed a
    /// table other than the one that created it.
    #[error("invalid argument: absent swap partner or foreign table")]
    InvalidArgument,

    /// The table was structurally modified by something other than the cursor
    /// since the cursor's last successful operation.
    #[error("concurrent structural change: table modified outside of this cursor")]
    ConcurrentStructuralChange,

    /// The cursor has no further element in its direction.
    #[error("no such element: the iteration has no more elements")]
    NoSuchElement,

    /// `remove` was called without a preceding successful advance, or twice
    /// for the same advance.
    #[error("illegal iterator state: remove must follow a successful advance")]
    IllegalIteratorState,
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, TableError>;
