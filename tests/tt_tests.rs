use citadel::search::tt::{NodeType, TranspositionTable};

#[test]
fn mate_score_is_renormalized_across_different_probe_plies() {
    let tt = TranspositionTable::new(1); // 1MB table
    let key = 123456789;

    // Found a mate-in-5 at ply 15, stored as a mate-distance-from-root score.
    let search_score = 30985;
    let search_ply = 10;

    tt.save(key, None, search_score, None, 5, NodeType::Exact, search_ply);

    // Probing at the same ply returns the exact stored score.
    let entry = tt.probe(key, search_ply, &citadel::board::Board::new()).unwrap();
    assert_eq!(entry.score, search_score);

    // Probing at a different ply re-centers the mate distance on the new ply.
    let entry_later = tt.probe(key, 20, &citadel::board::Board::new()).unwrap();
    assert_eq!(entry_later.score, search_score - (20 - search_ply));
}

#[test]
fn probe_returns_none_for_empty_table() {
    let tt = TranspositionTable::new(1);
    let board = citadel::board::Board::new();
    assert!(tt.probe(42, 0, &board).is_none());
}
