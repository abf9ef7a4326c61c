use crate::board::{Color, Piece};
use crate::moves::types::Move;
use crate::square::Square;

/// Cap on the history gravity bonus/malus, bounding how far a single update
/// can move an entry and keeping the history tables well inside `i32` range
/// across a long search.
const MAX_HISTORY_BONUS: i32 = 16384;

/// Number of (color, piece) combinations used to key the continuation
/// history tables: 2 colors * 6 piece types.
const PIECE_COMBOS: usize = 12;
/// A continuation history entry is conditioned on a (color, piece, to)
/// triple and scores every (color, piece, to) triple that might follow it.
const COMBO: usize = PIECE_COMBOS * 64;

fn combo_index(color: Color, piece: Piece, to: Square) -> usize {
    (color as usize * 6 + piece as usize) * 64 + to.index() as usize
}

pub struct SearchContext {
    pub killer_moves: Vec<[Option<Move>; 2]>,
    /// Butterfly history, indexed by side, from, to.
    pub history: [[[i32; 64]; 64]; 2],
    /// Indexed by attacker piece, destination square, victim piece.
    pub capture_history: [[[i32; 6]; 64]; 6],
    /// Indexed by the previous move's piece and destination square.
    pub counter_moves: [[Option<Move>; 64]; 6],
    /// Continuation history conditioned on the move played one ply ago.
    pub cont_hist_1ply: Box<[[i32; COMBO]; COMBO]>,
    /// Continuation history conditioned on the move played two plies ago
    /// (i.e. this side's own previous move).
    pub cont_hist_2ply: Box<[[i32; COMBO]; COMBO]>,
    /// The move played to reach each ply of the current search line, used to
    /// resolve the conditioning keys for counter-moves and continuation
    /// history. Overwritten as the search walks different branches.
    move_stack: Vec<Option<Move>>,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchContext {
    pub fn new() -> Self {
        Self {
            killer_moves: vec![[None; 2]; 64],
            history: [[[0; 64]; 64]; 2],
            capture_history: [[[0; 6]; 64]; 6],
            counter_moves: [[None; 64]; 6],
            cont_hist_1ply: Box::new([[0; COMBO]; COMBO]),
            cont_hist_2ply: Box::new([[0; COMBO]; COMBO]),
            move_stack: vec![None; 256],
        }
    }

    pub fn update_killer(&mut self, ply: usize, mv: Move) {
        if self.killer_moves[ply][0] != Some(mv) {
            self.killer_moves[ply][1] = self.killer_moves[ply][0];
            self.killer_moves[ply][0] = Some(mv);
        }
    }

    /// Records the move played to reach the child at `ply + 1`, so that
    /// descendants can look back one or two plies for counter-move and
    /// continuation-history lookups.
    pub fn record_move(&mut self, ply: usize, mv: Move) {
        if ply >= self.move_stack.len() {
            self.move_stack.resize(ply + 1, None);
        }
        self.move_stack[ply] = Some(mv);
    }

    pub fn move_at(&self, ply: usize) -> Option<Move> {
        self.move_stack.get(ply).copied().flatten()
    }

    pub fn update_counter_move(&mut self, prev: Option<Move>, mv: Move) {
        if let Some(prev) = prev {
            self.counter_moves[prev.piece as usize][prev.to.index() as usize] = Some(mv);
        }
    }

    pub fn counter_move(&self, prev: Option<Move>) -> Option<Move> {
        prev.and_then(|p| self.counter_moves[p.piece as usize][p.to.index() as usize])
    }

    /// Gravity/saturation history update: a good move is rewarded, every
    /// other failing move tried at this node is penalized by the same
    /// amount, and the update shrinks as the entry approaches
    /// `MAX_HISTORY_BONUS` so it never needs an external clamp.
    fn apply_bonus(table_slot: &mut i32, bonus: i32) {
        let bonus = bonus.clamp(-MAX_HISTORY_BONUS, MAX_HISTORY_BONUS);
        *table_slot += bonus - *table_slot * bonus.abs() / MAX_HISTORY_BONUS;
    }

    pub fn history_score(&self, side: Color, mv: Move) -> i32 {
        self.history[side as usize][mv.from.index() as usize][mv.to.index() as usize]
    }

    pub fn update_history(&mut self, side: Color, mv: Move, depth: i32, failed_quiets: &[Move]) {
        let bonus = (depth * depth).min(MAX_HISTORY_BONUS);
        Self::apply_bonus(
            &mut self.history[side as usize][mv.from.index() as usize][mv.to.index() as usize],
            bonus,
        );
        for &failed in failed_quiets {
            if failed == mv {
                continue;
            }
            Self::apply_bonus(
                &mut self.history[side as usize][failed.from.index() as usize]
                    [failed.to.index() as usize],
                -bonus,
            );
        }
    }

    pub fn capture_history_score(&self, attacker: Piece, to: Square, victim: Piece) -> i32 {
        self.capture_history[attacker as usize][to.index() as usize][victim as usize]
    }

    pub fn update_capture_history(&mut self, attacker: Piece, to: Square, victim: Piece, depth: i32) {
        let bonus = (depth * depth).min(MAX_HISTORY_BONUS);
        Self::apply_bonus(
            &mut self.capture_history[attacker as usize][to.index() as usize][victim as usize],
            bonus,
        );
    }

    /// `history[side, from-to] + 2*cont_hist_1ply[piece,to] + cont_hist_2ply[piece,to]`,
    /// resolving the conditioning keys from the recorded move stack.
    pub fn quiet_score(&self, side: Color, ply: usize, mv: Move) -> i32 {
        let mut score = self.history_score(side, mv);
        let cur = combo_index(side, mv.piece, mv.to);
        if ply >= 1 {
            if let Some(prev1) = self.move_at(ply - 1) {
                let row = combo_index(side.opposite(), prev1.piece, prev1.to);
                score += 2 * self.cont_hist_1ply[row][cur];
            }
        }
        if ply >= 2 {
            if let Some(prev2) = self.move_at(ply - 2) {
                let row = combo_index(side, prev2.piece, prev2.to);
                score += self.cont_hist_2ply[row][cur];
            }
        }
        score
    }

    pub fn update_continuations(
        &mut self,
        side: Color,
        ply: usize,
        mv: Move,
        depth: i32,
        failed_quiets: &[Move],
    ) {
        let bonus = (depth * depth).min(MAX_HISTORY_BONUS);
        let cur = combo_index(side, mv.piece, mv.to);
        if ply >= 1 {
            if let Some(prev1) = self.move_at(ply - 1) {
                let row = combo_index(side.opposite(), prev1.piece, prev1.to);
                Self::apply_bonus(&mut self.cont_hist_1ply[row][cur], bonus);
                for &failed in failed_quiets {
                    if failed == mv {
                        continue;
                    }
                    let fcur = combo_index(side, failed.piece, failed.to);
                    Self::apply_bonus(&mut self.cont_hist_1ply[row][fcur], -bonus);
                }
            }
        }
        if ply >= 2 {
            if let Some(prev2) = self.move_at(ply - 2) {
                let row = combo_index(side, prev2.piece, prev2.to);
                Self::apply_bonus(&mut self.cont_hist_2ply[row][cur], bonus);
                for &failed in failed_quiets {
                    if failed == mv {
                        continue;
                    }
                    let fcur = combo_index(side, failed.piece, failed.to);
                    Self::apply_bonus(&mut self.cont_hist_2ply[row][fcur], -bonus);
                }
            }
        }
    }

    /// Decays every heuristic table between iterative-deepening iterations
    /// so stale signal from shallow iterations fades rather than compounds.
    pub fn decay(&mut self) {
        for side in self.history.iter_mut() {
            for row in side.iter_mut() {
                for v in row.iter_mut() {
                    *v /= 8;
                }
            }
        }
    }
}
