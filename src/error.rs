//! Error types returned from fallible boundary operations.
//!
//! Internal hot-path functions (`make_move_basic`, move generation into
//! bounded buffers) are infallible by construction — their preconditions are
//! guaranteed by the caller and violations are programmer errors, asserted
//! with `debug_assert!` rather than threaded through `Result`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// FEN or move-text rejected during parsing. State is left unchanged.
    MalformedInput(String),
    /// A move submitted externally failed legality checking.
    IllegalMove(String),
    /// The transposition table could not obtain aligned memory for the
    /// requested size; the table falls back to empty and search continues
    /// without a cache.
    AllocationFailed { requested_mb: usize },
    /// A search was interrupted before completion; the best move found so
    /// far should still be used.
    Canceled,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::MalformedInput(msg) => write!(f, "malformed input: {}", msg),
            EngineError::IllegalMove(msg) => write!(f, "illegal move: {}", msg),
            EngineError::AllocationFailed { requested_mb } => write!(
                f,
                "failed to allocate {} MB transposition table",
                requested_mb
            ),
            EngineError::Canceled => write!(f, "search canceled"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Raise a programmer error: an invariant violation that should never occur
/// given correct internal callers. Debug builds assert; release builds log
/// and abort, since continuing past a corrupted invariant (e.g. a king
/// missing from the board) cannot produce a meaningful result.
#[cold]
#[inline(never)]
pub fn programmer_error(msg: &str) -> ! {
    debug_assert!(false, "programmer error: {}", msg);
    tracing::error!(%msg, "programmer error, aborting");
    std::process::abort();
}
