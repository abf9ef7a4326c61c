//! Typed engine options mirroring the UCI option surface.
//!
//! This is the core-facing half of the option protocol — parsing UCI
//! `setoption` text is the front end's job; this struct and `set_option`
//! are what it drives.

use crate::error::EngineError;
use crate::search::tt::TranspositionTable;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub hash_mb: usize,
    pub threads: usize,
    pub ponder: bool,
    pub multi_pv: usize,
    pub move_overhead_ms: u64,
    pub syzygy_path: Option<PathBuf>,
    pub own_book: bool,
    pub book_file: Option<PathBuf>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            hash_mb: 16,
            threads: 1,
            ponder: false,
            multi_pv: 1,
            move_overhead_ms: 10,
            syzygy_path: None,
            own_book: false,
            book_file: None,
        }
    }
}

/// One UCI option value, already parsed out of its wire representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Int(i64),
    Bool(bool),
    Path(PathBuf),
    None,
}

impl EngineOptions {
    /// Apply the named option's effect. `tt` is resized in place when
    /// `Hash` or `Clear Hash` is set, matching §6's effects table.
    pub fn set_option(
        &mut self,
        name: &str,
        value: OptionValue,
        tt: &mut TranspositionTable,
    ) -> Result<(), EngineError> {
        match (name, value) {
            ("Hash", OptionValue::Int(mb)) => {
                let mb = mb.max(1) as usize;
                self.hash_mb = mb;
                tt.try_resize(mb)?;
            }
            ("Threads", OptionValue::Int(n)) => {
                self.threads = n.max(1) as usize;
            }
            ("Clear Hash", _) => {
                tt.clear();
            }
            ("Ponder", OptionValue::Bool(b)) => {
                self.ponder = b;
            }
            ("MultiPV", OptionValue::Int(n)) => {
                self.multi_pv = n.max(1) as usize;
            }
            ("MoveOverhead", OptionValue::Int(ms)) => {
                self.move_overhead_ms = ms.max(0) as u64;
            }
            ("SyzygyPath", OptionValue::Path(p)) => {
                self.syzygy_path = Some(p);
            }
            ("OwnBook", OptionValue::Bool(b)) => {
                self.own_book = b;
            }
            ("BookFile", OptionValue::Path(p)) => {
                self.book_file = Some(p);
            }
            (other, _) => {
                return Err(EngineError::MalformedInput(format!(
                    "unrecognized option: {}",
                    other
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_conventional_engine_settings() {
        let opts = EngineOptions::default();
        assert_eq!(opts.hash_mb, 16);
        assert_eq!(opts.threads, 1);
        assert_eq!(opts.multi_pv, 1);
        assert_eq!(opts.move_overhead_ms, 10);
        assert!(!opts.ponder);
        assert!(!opts.own_book);
    }

    #[test]
    fn hash_option_resizes_tt() {
        let mut opts = EngineOptions::default();
        let mut tt = TranspositionTable::new(1);
        opts.set_option("Hash", OptionValue::Int(4), &mut tt).unwrap();
        assert_eq!(opts.hash_mb, 4);
    }

    #[test]
    fn unknown_option_is_rejected() {
        let mut opts = EngineOptions::default();
        let mut tt = TranspositionTable::new(1);
        let err = opts.set_option("Nonsense", OptionValue::None, &mut tt);
        assert!(err.is_err());
    }
}
