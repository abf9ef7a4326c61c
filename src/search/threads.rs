//! Lazy-SMP worker pool.
//!
//! All workers search the same root position to the same depth against one
//! shared, lock-free `TranspositionTable` (see `search::tt`). Helper threads
//! run silently; only the main thread's result is reported and returned —
//! the helpers exist purely to diversify move ordering and densify the
//! shared table, the same division of labour as a classic Lazy-SMP pool.

use crate::board::Board;
use crate::moves::magic::MagicTables;
use crate::moves::types::Move;
use crate::search::search::search_with_tt_cancellable;
use crate::search::tt::TranspositionTable;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::Duration;

pub struct ThreadPool {
    num_threads: usize,
}

impl ThreadPool {
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads: num_threads.max(1),
        }
    }

    /// Search `board` with `self.num_threads` workers sharing `tt`, to
    /// `max_depth` or until `time_limit` elapses or `stop` is raised.
    /// Returns the main thread's result, per Lazy-SMP convention.
    pub fn search_cancellable(
        &self,
        board: &Board,
        tables: &MagicTables,
        tt: &TranspositionTable,
        max_depth: i32,
        time_limit: Option<Duration>,
        stop: Option<Arc<AtomicBool>>,
    ) -> (i32, Option<Move>) {
        tt.new_search();

        if self.num_threads == 1 {
            let mut main_board = board.clone();
            return search_with_tt_cancellable(
                &mut main_board,
                tables,
                tt,
                max_depth,
                time_limit,
                true,
                stop,
            );
        }

        thread::scope(|scope| {
            let handles: Vec<_> = (1..self.num_threads)
                .map(|_| {
                    let mut helper_board = board.clone();
                    let helper_stop = stop.clone();
                    scope.spawn(move || {
                        search_with_tt_cancellable(
                            &mut helper_board,
                            tables,
                            tt,
                            max_depth,
                            time_limit,
                            false,
                            helper_stop,
                        )
                    })
                })
                .collect();

            let mut main_board = board.clone();
            let result = search_with_tt_cancellable(
                &mut main_board,
                tables,
                tt,
                max_depth,
                time_limit,
                true,
                stop,
            );

            for handle in handles {
                let _ = handle.join();
            }

            result
        })
    }

    pub fn search(
        &self,
        board: &Board,
        tables: &MagicTables,
        tt: &TranspositionTable,
        max_depth: i32,
        time_limit: Option<Duration>,
    ) -> (i32, Option<Move>) {
        self.search_cancellable(board, tables, tt, max_depth, time_limit, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::loader::load_magic_tables;

    #[test]
    fn single_threaded_pool_matches_plain_search() {
        let tables = load_magic_tables();
        let board = Board::new();
        let tt = TranspositionTable::new(1);
        let pool = ThreadPool::new(1);
        let (_score, mv) = pool.search(&board, &tables, &tt, 3, None);
        assert!(mv.is_some());
    }

    #[test]
    fn multi_threaded_pool_returns_a_legal_move() {
        let tables = load_magic_tables();
        let board = Board::new();
        let tt = TranspositionTable::new(1);
        let pool = ThreadPool::new(2);
        let (_score, mv) = pool.search(&board, &tables, &tt, 3, None);
        assert!(mv.is_some());
    }
}
