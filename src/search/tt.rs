//! Lock-free, cluster-based transposition table.
//!
//! Each slot packs its move/score/eval/depth/bound fields into a single
//! `u64` ("data") and stores the position key XORed with that data word in
//! a second `u64` ("key"). A reader loads both words with relaxed atomics,
//! recomputes `key ^ data` and compares it against the probed Zobrist key;
//! a mismatch (a concurrent writer tore the two words apart, or the slot
//! simply holds a different position) means the slot is rejected rather
//! than trusted. This gives every probe/store a lock-free, allocation-free
//! path shared by every search worker, at the cost of occasionally
//! discarding a slot that a torn read would otherwise have corrupted.
//!
//! Three slots are grouped into a 64-byte-aligned cluster so one cache
//! line serves one probe; replacement picks the weakest of the three by a
//! generation-aware score, same idea as a classic clustered TT.

use crate::board::{Board, Piece};
use crate::error::EngineError;
use crate::moves::types::{CAPTURE, Move, PROMOTION};
use crate::square::Square;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

pub const MATE_THRESHOLD: i32 = 30000;
pub const MATE_IN_MAX: i32 = MATE_THRESHOLD - 1000;
const EVAL_NONE: i16 = i16::MIN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeType {
    None = 0,
    Upper = 1, // alpha cutoff (failed low)
    Lower = 2, // beta cutoff (failed high)
    Exact = 3,
}

impl NodeType {
    fn from_bits(b: u8) -> Self {
        match b & 0b11 {
            0 => NodeType::None,
            1 => NodeType::Upper,
            2 => NodeType::Lower,
            _ => NodeType::Exact,
        }
    }
}

/// One probed/stored result: best move, score (already mate-distance
/// adjusted back to "from here"), static eval if known, depth and bound.
pub struct ProbeResult {
    pub mv: Option<Move>,
    pub score: i32,
    pub eval: Option<i32>,
    pub depth: u8,
    pub bound: NodeType,
}

fn pack_move(mv: Move) -> u16 {
    let from = mv.from.index() as u16;
    let to = mv.to.index() as u16;
    let promo: u16 = match mv.promotion {
        Some(Piece::Knight) => 0,
        Some(Piece::Bishop) => 1,
        Some(Piece::Rook) => 2,
        Some(Piece::Queen) => 3,
        _ => 0,
    };
    let has_promo: u16 = if mv.promotion.is_some() { 1 } else { 0 };
    (from) | (to << 6) | (promo << 12) | (has_promo << 14)
}

fn unpack_move(bits: u16, board: &Board) -> Option<Move> {
    if bits == 0 {
        return None;
    }
    let from = Square::from_index((bits & 0x3F) as u8);
    let to = Square::from_index(((bits >> 6) & 0x3F) as u8);
    let has_promo = (bits >> 14) & 1 != 0;
    let promo = if has_promo {
        Some(match (bits >> 12) & 0b11 {
            0 => Piece::Knight,
            1 => Piece::Bishop,
            2 => Piece::Rook,
            _ => Piece::Queen,
        })
    } else {
        None
    };

    let piece = board.piece_type_at(from)?;
    let is_capture = board.piece_at(to).is_some()
        || (piece == Piece::Pawn && board.en_passant == Some(to) && from.file() != to.file());
    let mut flags = 0u8;
    if is_capture {
        flags |= CAPTURE;
    }
    if promo.is_some() {
        flags |= PROMOTION;
    }

    Some(Move {
        from,
        to,
        piece,
        promotion: promo,
        flags,
    })
}

fn pack_data(mv16: u16, score: i16, eval: i16, depth: u8, bound: NodeType, generation: u8) -> u64 {
    let gen_bound = (bound as u8) | (generation << 2);
    (mv16 as u64)
        | ((score as u16 as u64) << 16)
        | ((eval as u16 as u64) << 32)
        | ((depth as u64) << 48)
        | ((gen_bound as u64) << 56)
}

fn unpack_data(data: u64) -> (u16, i16, i16, u8, NodeType, u8) {
    let mv16 = (data & 0xFFFF) as u16;
    let score = ((data >> 16) & 0xFFFF) as u16 as i16;
    let eval = ((data >> 32) & 0xFFFF) as u16 as i16;
    let depth = ((data >> 48) & 0xFF) as u8;
    let gen_bound = ((data >> 56) & 0xFF) as u8;
    (mv16, score, eval, depth, NodeType::from_bits(gen_bound), gen_bound >> 2)
}

struct Slot {
    key: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    const fn empty() -> Self {
        Slot {
            key: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }
}

const CLUSTER_SIZE: usize = 3;

#[repr(align(64))]
struct Cluster {
    slots: [Slot; CLUSTER_SIZE],
}

impl Cluster {
    fn empty() -> Self {
        Cluster {
            slots: [Slot::empty(), Slot::empty(), Slot::empty()],
        }
    }
}

pub struct TranspositionTable {
    clusters: Vec<Cluster>,
    cluster_mask: u64,
    generation: AtomicU8,
}

fn clusters_for_mb(mb: usize) -> usize {
    let bytes = mb.max(1) * 1024 * 1024;
    let cluster_size = std::mem::size_of::<Cluster>();
    let target = (bytes / cluster_size).max(1);
    let mut count = 1usize;
    while count * 2 <= target {
        count *= 2;
    }
    count
}

impl TranspositionTable {
    pub fn new(size_mb: usize) -> Self {
        let count = clusters_for_mb(size_mb);
        let mut clusters = Vec::with_capacity(count);
        clusters.resize_with(count, Cluster::empty);
        TranspositionTable {
            clusters,
            cluster_mask: (count - 1) as u64,
            generation: AtomicU8::new(0),
        }
    }

    /// Resize to hold roughly `size_mb` megabytes, rounding down to a power
    /// of two cluster count. On allocation failure the table is replaced
    /// with a minimal one-cluster table so the engine keeps running with an
    /// effectively disabled cache, per the `AllocationFailed` recovery
    /// policy.
    pub fn try_resize(&mut self, size_mb: usize) -> Result<(), EngineError> {
        let count = clusters_for_mb(size_mb);
        let mut clusters = Vec::new();
        if clusters.try_reserve_exact(count).is_err() {
            self.clusters = {
                let mut fallback = Vec::with_capacity(1);
                fallback.push(Cluster::empty());
                fallback
            };
            self.cluster_mask = 0;
            return Err(EngineError::AllocationFailed {
                requested_mb: size_mb,
            });
        }
        clusters.resize_with(count, Cluster::empty);
        self.clusters = clusters;
        self.cluster_mask = (count - 1) as u64;
        self.generation.store(0, Ordering::Relaxed);
        Ok(())
    }

    pub fn clear(&mut self) {
        for cluster in &mut self.clusters {
            for slot in &mut cluster.slots {
                slot.key.store(0, Ordering::Relaxed);
                slot.data.store(0, Ordering::Relaxed);
            }
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    pub fn new_search(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }

    fn cluster_index(&self, key: u64) -> usize {
        (key & self.cluster_mask) as usize
    }

    pub fn save(&self, key: u64, mv: Option<Move>, score: i32, eval: Option<i32>, depth: u8, bound: NodeType, ply: i32) {
        let generation = self.generation.load(Ordering::Relaxed);
        let cluster = &self.clusters[self.cluster_index(key)];

        let stored_score = adjust_score_for_store(score, ply).clamp(i16::MIN as i32 + 1, i16::MAX as i32) as i16;
        let stored_eval = eval.map(|e| e.clamp(i16::MIN as i32 + 1, i16::MAX as i32) as i16).unwrap_or(EVAL_NONE);
        let mv16 = mv.map(pack_move).unwrap_or(0);

        // Prefer an empty slot, then a slot already holding this key, then
        // the slot with the lowest (generation, depth) replace score.
        let mut replace_idx = 0usize;
        let mut replace_score = i32::MIN;
        let mut found_idx = None;

        for (i, slot) in cluster.slots.iter().enumerate() {
            let existing_key = slot.key.load(Ordering::Relaxed);
            let existing_data = slot.data.load(Ordering::Relaxed);
            if existing_key ^ existing_data == key {
                found_idx = Some(i);
                break;
            }
            if existing_key == 0 && existing_data == 0 {
                replace_idx = i;
                replace_score = i32::MAX;
                continue;
            }
            let (_, _, _, existing_depth, _, existing_gen) = unpack_data(existing_data);
            let age = generation.wrapping_sub(existing_gen) as i32;
            let score_for_slot = -(age * 8) - existing_depth as i32;
            if replace_score == i32::MAX {
                continue;
            }
            if score_for_slot > replace_score {
                replace_score = score_for_slot;
                replace_idx = i;
            }
        }

        let idx = found_idx.unwrap_or(replace_idx);
        let slot = &cluster.slots[idx];

        let keep_move = if found_idx.is_some() && mv16 == 0 {
            let existing_data = slot.data.load(Ordering::Relaxed);
            unpack_data(existing_data).0
        } else {
            mv16
        };

        let data = pack_data(keep_move, stored_score, stored_eval, depth, bound, generation);
        slot.data.store(data, Ordering::Relaxed);
        slot.key.store(key ^ data, Ordering::Relaxed);
    }

    pub fn probe(&self, key: u64, ply: i32, board: &Board) -> Option<ProbeResult> {
        let cluster = &self.clusters[self.cluster_index(key)];
        for slot in &cluster.slots {
            let stored_key = slot.key.load(Ordering::Relaxed);
            let data = slot.data.load(Ordering::Relaxed);
            if stored_key ^ data == key {
                let (mv16, score, eval, depth, bound, _gen) = unpack_data(data);
                return Some(ProbeResult {
                    mv: unpack_move(mv16, board),
                    score: adjust_score_for_probe(score as i32, ply),
                    eval: if eval == EVAL_NONE { None } else { Some(eval as i32) },
                    depth,
                    bound,
                });
            }
        }
        None
    }

    /// Up to `CLUSTER_SIZE` distinct moves stored under `key`, used for
    /// multi-PV root move hints.
    pub fn get_moves(&self, key: u64, board: &Board) -> Vec<Move> {
        let cluster = &self.clusters[self.cluster_index(key)];
        let mut out = Vec::with_capacity(CLUSTER_SIZE);
        for slot in &cluster.slots {
            let stored_key = slot.key.load(Ordering::Relaxed);
            let data = slot.data.load(Ordering::Relaxed);
            if stored_key ^ data == key {
                let (mv16, ..) = unpack_data(data);
                if let Some(mv) = unpack_move(mv16, board) {
                    out.push(mv);
                }
            }
        }
        out
    }

    /// Permille (0..1000) of clusters with at least one occupied slot of
    /// the current generation, sampled from the first 1000 clusters like
    /// the classic `hashfull` UCI info field.
    pub fn hashfull(&self) -> u32 {
        let generation = self.generation.load(Ordering::Relaxed);
        let sample = self.clusters.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let mut used = 0u32;
        for cluster in self.clusters.iter().take(sample) {
            for slot in &cluster.slots {
                let data = slot.data.load(Ordering::Relaxed);
                if data != 0 {
                    let (_, _, _, _, _, gen) = unpack_data(data);
                    if gen == generation {
                        used += 1;
                    }
                }
            }
        }
        used * 1000 / (sample as u32 * CLUSTER_SIZE as u32)
    }
}

fn adjust_score_for_store(score: i32, ply: i32) -> i32 {
    if score >= MATE_IN_MAX {
        score + ply
    } else if score <= -MATE_IN_MAX {
        score - ply
    } else {
        score
    }
}

fn adjust_score_for_probe(score: i32, ply: i32) -> i32 {
    if score >= MATE_IN_MAX {
        score - ply
    } else if score <= -MATE_IN_MAX {
        score + ply
    } else {
        score
    }
}
