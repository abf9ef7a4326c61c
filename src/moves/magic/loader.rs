//! Obtains the process-wide magic bitboard tables, either by generating them
//! on first use or, behind the `load_magic` feature, by reading a
//! precomputed binary file from disk and falling back to generation if the
//! file isn't there.

use super::precompute::{MagicTableSeed, generate_magic_tables};
use super::structs::MagicTables;
use once_cell::sync::OnceCell;
use std::io::{Read, Write};
use std::path::Path;

#[cfg(feature = "deterministic_magic")]
const MAGIC_SEED: u64 = 0x5151_C0FF_EE15_BAD;

fn seed() -> MagicTableSeed {
    #[cfg(feature = "deterministic_magic")]
    {
        MagicTableSeed::Fixed(MAGIC_SEED)
    }
    #[cfg(not(feature = "deterministic_magic"))]
    {
        MagicTableSeed::Random
    }
}

const DEFAULT_MAGIC_FILE: &str = "magic_tables.bin";

#[cfg(feature = "load_magic")]
fn load_from_disk(path: &Path) -> Option<MagicTables> {
    let mut file = std::fs::File::open(path).ok()?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).ok()?;
    bincode::deserialize(&bytes).ok()
}

#[cfg(feature = "load_magic")]
fn save_to_disk(path: &Path, tables: &MagicTables) {
    if let Ok(bytes) = bincode::serialize(tables)
        && let Ok(mut file) = std::fs::File::create(path)
    {
        let _ = file.write_all(&bytes);
    }
}

fn build() -> MagicTables {
    #[cfg(feature = "load_magic")]
    {
        let path = Path::new(DEFAULT_MAGIC_FILE);
        if let Some(tables) = load_from_disk(path) {
            tracing::debug!(path = %path.display(), "loaded magic tables from disk");
            return tables;
        }
        let tables =
            generate_magic_tables(seed()).expect("magic table generation should not fail");
        save_to_disk(path, &tables);
        return tables;
    }

    #[cfg(not(feature = "load_magic"))]
    {
        generate_magic_tables(seed()).expect("magic table generation should not fail")
    }
}

/// Returns the shared, process-wide magic bitboard tables, computing them on
/// first call and reusing the result afterward.
pub fn load_magic_tables() -> MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES.get_or_init(build).clone()
}

impl Clone for MagicTables {
    fn clone(&self) -> Self {
        MagicTables {
            rook: super::structs::RookMagicTables {
                entries: self.rook.entries.clone(),
            },
            bishop: super::structs::BishopMagicTables {
                entries: self.bishop.entries.clone(),
            },
        }
    }
}
