use super::*;

#[test]
fn new_has_both_kings() {
    let board = Board::new();
    assert_eq!(board.king_square(Color::White).index(), 4);
    assert_eq!(board.king_square(Color::Black).index(), 60);
}

#[test]
fn occupancy_matches_piece_bitboards() {
    let board = Board::new();
    let mut expected = 0u64;
    for color in [Color::White, Color::Black] {
        for piece in [
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ] {
            expected |= board.bb(color, piece);
        }
    }
    assert_eq!(board.occupied(), expected);
    assert_eq!(board.occ_white | board.occ_black, board.occ_all);
}

#[test]
fn set_bb_keeps_zobrist_incremental_in_sync() {
    let mut board = Board::new();
    let knight_bb = board.bb(Color::White, Piece::Knight);
    board.set_bb(Color::White, Piece::Knight, knight_bb & !1);
    assert_eq!(board.zobrist, board.compute_zobrist_full());
}

#[test]
fn repetition_count_tracks_history() {
    let mut board = Board::new();
    let hash = board.zobrist;
    assert_eq!(board.repetition_count(), 1);
    board.history.push(hash);
    assert_eq!(board.repetition_count(), 2);
    assert!(board.is_repetition());
    assert!(!board.is_threefold());
    board.history.push(hash);
    assert!(board.is_threefold());
}

#[test]
fn castling_rights_default_to_all_four() {
    let board = Board::new();
    assert!(board.has_kingside_castle(Color::White));
    assert!(board.has_queenside_castle(Color::White));
    assert!(board.has_kingside_castle(Color::Black));
    assert!(board.has_queenside_castle(Color::Black));
}
