//! Staged Move Picker for lazy move generation and ordering.
//!
//! This module implements a Just-In-Time staged move picker that generates
//! moves on demand rather than generating all moves upfront. The main
//! search chain is:
//!
//!   TtMove -> GenCaptures -> WinningCaptures -> GenQuietChecks ->
//!   QuietChecks -> Killer1 -> Killer2 -> CounterMove -> GenQuiets ->
//!   EqualCaptures -> Quiets -> BadCaptures -> Done
//!
//! Positions where the side to move is in check instead walk a short
//! `GenEvasions -> Evasions -> Done` chain (after the hash move), since
//! pseudo-legal capture/quiet generation is the wrong tool once every move
//! must address the checker. Quiescence search (`captures_only`) walks its
//! own `QsTtMove -> QsGenCaptures -> QsCaptures -> Done` chain.
//!
//! If an early move causes a beta cutoff, later stages are never reached.

use crate::board::{Board, Piece};
use crate::moves::execute::is_legal_move;
use crate::moves::legal::{self, is_pseudo_legal};
use crate::moves::magic::MagicTables;
use crate::moves::movegen::{generate_pseudo_legal_captures, generate_pseudo_legal_quiets};
use crate::moves::types::Move;
use crate::search::context::SearchContext;
use crate::search::ordering::mvv_lva_score;
use crate::search::see::SeeExt;
use arrayvec::ArrayVec;

/// Large enough that a queen/knight promotion always outranks every other
/// capture, even a check-boosted one.
const PROMOTION_SCORE_BONUS: i32 = 1_000_000;
/// Small nudge so under-promotions (bishop/rook) don't drown among equally
/// scored ordinary captures.
const UNDERPROMOTION_SCORE_BONUS: i32 = 50;
/// Added to a capture's score when it also gives check, lifting it above
/// ordinary winning captures.
const CHECK_SCORE_BOOST: i32 = 100_000;
/// Bonus for a quiet move that lands a queen or rook on the enemy king
/// zone.
const KING_ZONE_QUIET_BONUS: i32 = 5000;

/// How a capture was classified for picker ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureClass {
    Winning,
    Equal,
    Bad,
}

/// The current stage of move generation/picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerStage {
    TtMove,
    GenCaptures,
    WinningCaptures,
    GenQuietChecks,
    QuietChecks,
    Killer1,
    Killer2,
    CounterMove,
    GenQuiets,
    EqualCaptures,
    Quiets,
    BadCaptures,
    GenEvasions,
    Evasions,
    QsTtMove,
    QsGenCaptures,
    QsCaptures,
    Done,
}

/// Argmax-and-swap selection over the unpicked tail of `moves`/`scores`,
/// shared by every scored bucket the picker owns.
fn pick_best<const N: usize>(
    moves: &mut ArrayVec<Move, N>,
    scores: &mut ArrayVec<i32, N>,
    idx: &mut usize,
) -> Option<Move> {
    if *idx >= moves.len() {
        return None;
    }
    let mut best_idx = *idx;
    let mut best_score = scores[best_idx];
    for i in (*idx + 1)..moves.len() {
        if scores[i] > best_score {
            best_score = scores[i];
            best_idx = i;
        }
    }
    moves.swap(*idx, best_idx);
    scores.swap(*idx, best_idx);
    let mv = moves[*idx];
    *idx += 1;
    Some(mv)
}

fn type_bonus(p: Piece) -> i32 {
    match p {
        Piece::Queen => 40,
        Piece::Rook => 30,
        Piece::Bishop => 20,
        Piece::Knight => 10,
        Piece::Pawn | Piece::King => 0,
    }
}

fn king_zone(king_sq: crate::square::Square) -> u64 {
    let b = 1u64 << king_sq.index();
    let mut zone = b | ((b << 1) & 0xFEFE_FEFE_FEFE_FEFE) | ((b >> 1) & 0x7F7F_7F7F_7F7F_7F7F);
    zone |= (zone << 8) | (zone >> 8);
    zone
}

/// True if a queen or rook attacks a square inside the enemy king zone once
/// it has made this (quiet, non-capturing) move.
fn attacks_enemy_king_zone(board: &Board, tables: &MagicTables, mv: Move) -> bool {
    if !matches!(mv.piece, Piece::Queen | Piece::Rook) {
        return false;
    }
    let zone = king_zone(board.king_square(board.side_to_move.opposite()));
    let mut occ = board.occupied();
    occ &= !(1u64 << mv.from.index());
    occ |= 1u64 << mv.to.index();
    let to = mv.to.index() as usize;
    let attacks = match mv.piece {
        Piece::Rook => tables.rook.get_attacks(to, occ),
        Piece::Queen => tables.bishop.get_attacks(to, occ) | tables.rook.get_attacks(to, occ),
        _ => 0,
    };
    attacks & zone != 0
}

/// Classifies and scores a pseudo-legal capture (or promotion) per the
/// move-ordering scheme: queen/knight promotions are scored above
/// everything else, other captures are split into winning/equal/bad by
/// value difference and SEE, checks are boosted above ordinary winning
/// captures, and capture history contributes an additive term.
fn classify_and_score_capture(
    board: &Board,
    tables: &MagicTables,
    ctx: &SearchContext,
    mv: Move,
) -> (CaptureClass, i32) {
    let attacker = mv.piece;
    let victim = if mv.is_en_passant() {
        Some(Piece::Pawn)
    } else {
        board.piece_type_at(mv.to)
    };

    let (mut class, mut score) = if matches!(mv.promotion, Some(Piece::Queen) | Some(Piece::Knight))
    {
        (
            CaptureClass::Winning,
            PROMOTION_SCORE_BONUS + victim.map_or(0, |v| v.value()),
        )
    } else {
        let value_diff = victim.map_or(0, |v| v.value()) - attacker.value();
        if value_diff >= 200 {
            (CaptureClass::Winning, mvv_lva_score(mv, board))
        } else {
            let see = board.see_value(mv, tables);
            if see >= 0 {
                if see.abs() <= 50 && victim == Some(attacker) {
                    (CaptureClass::Equal, type_bonus(attacker))
                } else {
                    (CaptureClass::Winning, mvv_lva_score(mv, board))
                }
            } else {
                (CaptureClass::Bad, see)
            }
        }
    };

    if matches!(mv.promotion, Some(Piece::Bishop) | Some(Piece::Rook)) {
        score += UNDERPROMOTION_SCORE_BONUS;
    }

    if legal::gives_check(board, tables, mv) {
        class = CaptureClass::Winning;
        score += CHECK_SCORE_BOOST;
    }

    if let Some(v) = victim {
        score += ctx.capture_history_score(attacker, mv.to, v) / 100;
    }

    (class, score)
}

/// Staged move picker that generates moves lazily on demand.
pub struct MovePicker {
    stage: PickerStage,

    winning_captures: ArrayVec<Move, 64>,
    winning_scores: ArrayVec<i32, 64>,
    equal_captures: ArrayVec<Move, 64>,
    equal_scores: ArrayVec<i32, 64>,
    bad_captures: ArrayVec<Move, 64>,
    bad_scores: ArrayVec<i32, 64>,
    quiet_checks: ArrayVec<Move, { legal::MAX_QUIET_CHECKS }>,
    quiet_check_scores: ArrayVec<i32, { legal::MAX_QUIET_CHECKS }>,
    quiets: ArrayVec<Move, 256>,
    quiet_scores: ArrayVec<i32, 256>,
    evasions: ArrayVec<Move, 96>,
    evasion_scores: ArrayVec<i32, 96>,
    qs_captures: ArrayVec<Move, 64>,
    qs_scores: ArrayVec<i32, 64>,

    winning_idx: usize,
    equal_idx: usize,
    bad_idx: usize,
    quiet_check_idx: usize,
    quiet_idx: usize,
    evasion_idx: usize,
    qs_idx: usize,

    /// Every move already handed out this call, so later stages can skip
    /// duplicates without re-deriving which earlier stage produced them.
    yielded: ArrayVec<Move, 40>,

    hash_move: Option<Move>,
    killers: [Option<Move>; 2],

    captures_only: bool,
    in_check: bool,
}

impl MovePicker {
    /// Create a new MovePicker.
    ///
    /// # Arguments
    /// * `hash_move` - The hash move from the transposition table (if any)
    /// * `killers` - Killer moves for this ply
    /// * `captures_only` - If true, walk the quiescence chain (captures only)
    /// * `in_check` - If true, walk the evasion chain instead of the normal one
    pub fn new(
        hash_move: Option<Move>,
        killers: [Option<Move>; 2],
        captures_only: bool,
        in_check: bool,
    ) -> Self {
        let stage = if captures_only {
            PickerStage::QsTtMove
        } else {
            PickerStage::TtMove
        };
        Self {
            stage,
            winning_captures: ArrayVec::new(),
            winning_scores: ArrayVec::new(),
            equal_captures: ArrayVec::new(),
            equal_scores: ArrayVec::new(),
            bad_captures: ArrayVec::new(),
            bad_scores: ArrayVec::new(),
            quiet_checks: ArrayVec::new(),
            quiet_check_scores: ArrayVec::new(),
            quiets: ArrayVec::new(),
            quiet_scores: ArrayVec::new(),
            evasions: ArrayVec::new(),
            evasion_scores: ArrayVec::new(),
            qs_captures: ArrayVec::new(),
            qs_scores: ArrayVec::new(),
            winning_idx: 0,
            equal_idx: 0,
            bad_idx: 0,
            quiet_check_idx: 0,
            quiet_idx: 0,
            evasion_idx: 0,
            qs_idx: 0,
            yielded: ArrayVec::new(),
            hash_move,
            killers,
            captures_only,
            in_check,
        }
    }

    #[inline]
    fn is_hash_move(&self, mv: Move) -> bool {
        if let Some(hm) = self.hash_move {
            mv.from == hm.from && mv.to == hm.to && mv.promotion == hm.promotion
        } else {
            false
        }
    }

    #[inline]
    fn is_duplicate(&self, mv: Move) -> bool {
        self.yielded
            .iter()
            .any(|y| y.from == mv.from && y.to == mv.to && y.promotion == mv.promotion)
    }

    #[inline]
    fn mark_yielded(&mut self, mv: Move) {
        let _ = self.yielded.try_push(mv);
    }

    fn generate_and_classify_captures(&mut self, board: &Board, tables: &MagicTables, ctx: &SearchContext) {
        let mut captures: ArrayVec<Move, 128> = ArrayVec::new();
        generate_pseudo_legal_captures(board, tables, &mut captures);

        for mv in captures {
            if self.is_hash_move(mv) {
                continue;
            }
            let (class, score) = classify_and_score_capture(board, tables, ctx, mv);
            match class {
                CaptureClass::Winning => {
                    let _ = self.winning_captures.try_push(mv);
                    let _ = self.winning_scores.try_push(score);
                }
                CaptureClass::Equal => {
                    let _ = self.equal_captures.try_push(mv);
                    let _ = self.equal_scores.try_push(score);
                }
                CaptureClass::Bad => {
                    let _ = self.bad_captures.try_push(mv);
                    let _ = self.bad_scores.try_push(score);
                }
            }
        }
    }

    fn generate_and_score_quiet_checks(&mut self, board: &Board, tables: &MagicTables, ctx: &SearchContext, ply: usize) {
        legal::generate_checking_moves(board, tables, &mut self.quiet_checks);
        let side = board.side_to_move;
        for mv in &self.quiet_checks {
            let mut score = ctx.quiet_score(side, ply, *mv);
            if attacks_enemy_king_zone(board, tables, *mv) {
                score += KING_ZONE_QUIET_BONUS;
            }
            let _ = self.quiet_check_scores.try_push(score);
        }
    }

    fn generate_and_score_quiets(&mut self, board: &Board, tables: &MagicTables, ctx: &SearchContext, ply: usize) {
        generate_pseudo_legal_quiets(board, tables, &mut self.quiets);
        let side = board.side_to_move;
        for mv in &self.quiets {
            let mut score = ctx.quiet_score(side, ply, *mv);
            if attacks_enemy_king_zone(board, tables, *mv) {
                score += KING_ZONE_QUIET_BONUS;
            }
            let _ = self.quiet_scores.try_push(score);
        }
    }

    fn generate_and_score_evasions(&mut self, board: &Board, tables: &MagicTables, ctx: &SearchContext, ply: usize) {
        legal::generate_evasions(board, tables, &mut self.evasions);
        let side = board.side_to_move;
        for mv in &self.evasions {
            let score = if mv.is_capture() {
                let (_, s) = classify_and_score_capture(board, tables, ctx, *mv);
                s + 500_000
            } else {
                ctx.quiet_score(side, ply, *mv)
            };
            let _ = self.evasion_scores.try_push(score);
        }
    }

    fn generate_and_score_qs_captures(&mut self, board: &Board, tables: &MagicTables) {
        generate_pseudo_legal_captures(board, tables, &mut self.qs_captures);
        for mv in &self.qs_captures {
            let _ = self.qs_scores.try_push(mvv_lva_score(*mv, board));
        }
    }

    /// Returns the next legal move, or None when exhausted.
    ///
    /// CRITICAL: This is loop-based, NOT recursive, to prevent stack overflow.
    pub fn next(
        &mut self,
        board: &mut Board,
        tables: &MagicTables,
        ctx: &SearchContext,
        ply: usize,
    ) -> Option<Move> {
        loop {
            match self.stage {
                PickerStage::TtMove => {
                    self.stage = if self.in_check {
                        PickerStage::GenEvasions
                    } else {
                        PickerStage::GenCaptures
                    };
                    if let Some(hm) = self.hash_move
                        && is_pseudo_legal(board, tables, hm)
                        && is_legal_move(board, hm, tables)
                    {
                        self.mark_yielded(hm);
                        return Some(hm);
                    }
                }

                PickerStage::GenCaptures => {
                    self.generate_and_classify_captures(board, tables, ctx);
                    self.stage = PickerStage::WinningCaptures;
                }

                PickerStage::WinningCaptures => {
                    while let Some(mv) =
                        pick_best(&mut self.winning_captures, &mut self.winning_scores, &mut self.winning_idx)
                    {
                        if self.is_duplicate(mv) {
                            continue;
                        }
                        if is_legal_move(board, mv, tables) {
                            self.mark_yielded(mv);
                            return Some(mv);
                        }
                    }
                    self.stage = PickerStage::GenQuietChecks;
                }

                PickerStage::GenQuietChecks => {
                    self.generate_and_score_quiet_checks(board, tables, ctx, ply);
                    self.stage = PickerStage::QuietChecks;
                }

                PickerStage::QuietChecks => {
                    while let Some(mv) = pick_best(
                        &mut self.quiet_checks,
                        &mut self.quiet_check_scores,
                        &mut self.quiet_check_idx,
                    ) {
                        if self.is_duplicate(mv) {
                            continue;
                        }
                        if is_legal_move(board, mv, tables) {
                            self.mark_yielded(mv);
                            return Some(mv);
                        }
                    }
                    self.stage = PickerStage::Killer1;
                }

                PickerStage::Killer1 => {
                    self.stage = PickerStage::Killer2;
                    if let Some(k1) = self.killers[0]
                        && !k1.is_capture()
                        && !self.is_duplicate(k1)
                        && is_pseudo_legal(board, tables, k1)
                        && is_legal_move(board, k1, tables)
                    {
                        self.mark_yielded(k1);
                        return Some(k1);
                    }
                }

                PickerStage::Killer2 => {
                    self.stage = PickerStage::CounterMove;
                    if let Some(k2) = self.killers[1]
                        && !k2.is_capture()
                        && !self.is_duplicate(k2)
                        && is_pseudo_legal(board, tables, k2)
                        && is_legal_move(board, k2, tables)
                    {
                        self.mark_yielded(k2);
                        return Some(k2);
                    }
                }

                PickerStage::CounterMove => {
                    self.stage = PickerStage::GenQuiets;
                    let prev = if ply >= 1 { ctx.move_at(ply - 1) } else { None };
                    if let Some(counter) = ctx.counter_move(prev)
                        && !counter.is_capture()
                        && !self.is_duplicate(counter)
                        && is_pseudo_legal(board, tables, counter)
                        && is_legal_move(board, counter, tables)
                    {
                        self.mark_yielded(counter);
                        return Some(counter);
                    }
                }

                PickerStage::GenQuiets => {
                    self.generate_and_score_quiets(board, tables, ctx, ply);
                    self.stage = PickerStage::EqualCaptures;
                }

                PickerStage::EqualCaptures => {
                    while let Some(mv) =
                        pick_best(&mut self.equal_captures, &mut self.equal_scores, &mut self.equal_idx)
                    {
                        if self.is_duplicate(mv) {
                            continue;
                        }
                        if is_legal_move(board, mv, tables) {
                            self.mark_yielded(mv);
                            return Some(mv);
                        }
                    }
                    self.stage = PickerStage::Quiets;
                }

                PickerStage::Quiets => {
                    while let Some(mv) = pick_best(&mut self.quiets, &mut self.quiet_scores, &mut self.quiet_idx) {
                        if self.is_duplicate(mv) {
                            continue;
                        }
                        if is_legal_move(board, mv, tables) {
                            self.mark_yielded(mv);
                            return Some(mv);
                        }
                    }
                    self.stage = PickerStage::BadCaptures;
                }

                PickerStage::BadCaptures => {
                    while let Some(mv) = pick_best(&mut self.bad_captures, &mut self.bad_scores, &mut self.bad_idx) {
                        if self.is_duplicate(mv) {
                            continue;
                        }
                        if is_legal_move(board, mv, tables) {
                            self.mark_yielded(mv);
                            return Some(mv);
                        }
                    }
                    self.stage = PickerStage::Done;
                }

                PickerStage::GenEvasions => {
                    self.generate_and_score_evasions(board, tables, ctx, ply);
                    self.stage = PickerStage::Evasions;
                }

                PickerStage::Evasions => {
                    while let Some(mv) =
                        pick_best(&mut self.evasions, &mut self.evasion_scores, &mut self.evasion_idx)
                    {
                        if self.is_duplicate(mv) {
                            continue;
                        }
                        if is_legal_move(board, mv, tables) {
                            self.mark_yielded(mv);
                            return Some(mv);
                        }
                    }
                    self.stage = PickerStage::Done;
                }

                PickerStage::QsTtMove => {
                    self.stage = PickerStage::QsGenCaptures;
                    if let Some(hm) = self.hash_move
                        && (hm.is_capture() || hm.is_promotion())
                        && is_pseudo_legal(board, tables, hm)
                        && is_legal_move(board, hm, tables)
                    {
                        self.mark_yielded(hm);
                        return Some(hm);
                    }
                }

                PickerStage::QsGenCaptures => {
                    self.generate_and_score_qs_captures(board, tables);
                    self.stage = PickerStage::QsCaptures;
                }

                PickerStage::QsCaptures => {
                    while let Some(mv) = pick_best(&mut self.qs_captures, &mut self.qs_scores, &mut self.qs_idx) {
                        if self.is_duplicate(mv) {
                            continue;
                        }
                        if is_legal_move(board, mv, tables) {
                            self.mark_yielded(mv);
                            return Some(mv);
                        }
                    }
                    self.stage = PickerStage::Done;
                }

                PickerStage::Done => return None,
            }
        }
    }
}
