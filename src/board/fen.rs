//! FEN parsing and serialization.

use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use crate::square::Square;

impl Board {
    /// Replace this board's state with the position described by `fen`.
    /// On error the board is left at whatever partial state parsing reached;
    /// callers that need atomicity should parse into a fresh `Board`.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let mut fields = fen.split_whitespace();

        let placement = fields.next().ok_or("FEN missing piece placement field")?;
        let side = fields.next().unwrap_or("w");
        let castling = fields.next().unwrap_or("-");
        let ep = fields.next().unwrap_or("-");
        let halfmove = fields.next().unwrap_or("0");
        let fullmove = fields.next().unwrap_or("1");

        *self = Board::new_empty();

        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(format!(
                "FEN piece placement must have 8 ranks, found {}",
                ranks.len()
            ));
        }

        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top as u8;
            let mut file = 0u8;
            for ch in rank_str.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as u8;
                    if file > 8 {
                        return Err(format!("FEN rank overflow in '{}'", rank_str));
                    }
                    continue;
                }
                if file >= 8 {
                    return Err(format!("FEN rank overflow in '{}'", rank_str));
                }
                let (piece, color) = CHAR_TO_PC[ch as usize]
                    .ok_or_else(|| format!("invalid FEN piece glyph '{}'", ch))?;
                let sq = Square::from_file_rank(file, rank);
                let bb = self.bb(color, piece) | sq.to_bb();
                self.set_bb(color, piece, bb);
                file += 1;
            }
            if file != 8 {
                return Err(format!("FEN rank '{}' does not cover 8 files", rank_str));
            }
        }

        self.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(format!("invalid side-to-move field '{}'", other)),
        };

        self.castling_rights = 0;
        if castling != "-" {
            for ch in castling.chars() {
                self.castling_rights |= match ch {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    other => return Err(format!("invalid castling glyph '{}'", other)),
                };
            }
        }

        self.en_passant = if ep == "-" {
            None
        } else {
            let mut chars = ep.chars();
            let file_ch = chars.next().ok_or("empty en passant field")?;
            let rank_ch = chars.next().ok_or("en passant field missing rank")?;
            if chars.next().is_some() {
                return Err(format!("invalid en passant square '{}'", ep));
            }
            if !('a'..='h').contains(&file_ch) || !('1'..='8').contains(&rank_ch) {
                return Err(format!("invalid en passant square '{}'", ep));
            }
            let file = file_ch as u8 - b'a';
            let rank = rank_ch as u8 - b'1';
            Some(Square::from_file_rank(file, rank))
        };

        self.halfmove_clock = halfmove
            .parse()
            .map_err(|_| format!("invalid halfmove clock '{}'", halfmove))?;
        self.fullmove_number = fullmove
            .parse()
            .map_err(|_| format!("invalid fullmove number '{}'", fullmove))?;

        self.history.clear();
        self.refresh_zobrist();
        Ok(())
    }

    /// Render this board's current state as a FEN string.
    pub fn to_fen(&self) -> String {
        let mut s = String::with_capacity(64);

        for rank_from_top in 0..8u8 {
            let rank = 7 - rank_from_top;
            let mut empty_run = 0u8;
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            s.push((b'0' + empty_run) as char);
                            empty_run = 0;
                        }
                        let idx = (color as usize) * 6 + (piece as usize);
                        s.push(PC_TO_CHAR[idx]);
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                s.push((b'0' + empty_run) as char);
            }
            if rank_from_top != 7 {
                s.push('/');
            }
        }

        s.push(' ');
        s.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        s.push(' ');
        if self.castling_rights == 0 {
            s.push('-');
        } else {
            if self.castling_rights & CASTLE_WK != 0 {
                s.push('K');
            }
            if self.castling_rights & CASTLE_WQ != 0 {
                s.push('Q');
            }
            if self.castling_rights & CASTLE_BK != 0 {
                s.push('k');
            }
            if self.castling_rights & CASTLE_BQ != 0 {
                s.push('q');
            }
        }

        s.push(' ');
        match self.en_passant {
            Some(sq) => s.push_str(&sq.to_string()),
            None => s.push('-'),
        }

        s.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        s
    }
}
