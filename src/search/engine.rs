//! Reference search/eval client exercising the core end to end.
//!
//! `Engine` is the thin facade a front end drives: it owns the shared
//! transposition table and the cancellation flag, and hands off to
//! `search::threads::ThreadPool` for the actual Lazy-SMP iterative
//! deepening. It is deliberately small — a tuning-grade UCI front end,
//! opening book, and time manager are external collaborators per the
//! core's stated scope.

use crate::board::Board;
use crate::config::EngineOptions;
use crate::moves::magic::MagicTables;
use crate::moves::types::Move;
use crate::search::threads::ThreadPool;
use crate::search::tt::TranspositionTable;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub struct Engine {
    tt: TranspositionTable,
    options: EngineOptions,
    stop: Arc<AtomicBool>,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            tt: TranspositionTable::new(options.hash_mb),
            options,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Search `board` to `max_depth` or `time_limit`, whichever comes
    /// first, across `options.threads` workers sharing this engine's TT.
    pub fn go(
        &self,
        board: &Board,
        tables: &MagicTables,
        max_depth: i32,
        time_limit: Option<Duration>,
    ) -> (i32, Option<Move>) {
        self.stop.store(false, Ordering::Relaxed);
        let pool = ThreadPool::new(self.options.threads);
        pool.search_cancellable(
            board,
            tables,
            &self.tt,
            max_depth,
            time_limit,
            Some(Arc::clone(&self.stop)),
        )
    }

    /// Raise the shared cancellation flag; any in-progress `go` call returns
    /// from its current node at the next poll rather than finishing its
    /// planned depth or time budget.
    pub fn stop_all(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn set_option(
        &mut self,
        name: &str,
        value: crate::config::OptionValue,
    ) -> Result<(), crate::error::EngineError> {
        self.options.set_option(name, value, &mut self.tt)
    }

    pub fn hashfull(&self) -> u32 {
        self.tt.hashfull()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::loader::load_magic_tables;

    #[test]
    fn go_returns_a_legal_move_from_startpos() {
        let engine = Engine::new(EngineOptions::default());
        let tables = load_magic_tables();
        let board = Board::new();
        let (_score, mv) = engine.go(&board, &tables, 3, None);
        assert!(mv.is_some());
    }

    #[test]
    fn stop_all_sets_the_shared_flag() {
        let engine = Engine::new(EngineOptions::default());
        assert!(!engine.stop.load(Ordering::Relaxed));
        engine.stop_all();
        assert!(engine.stop.load(Ordering::Relaxed));
    }
}
