//! This module contains a crossword-specific implementation of the AC-3 algorithm for
//! establishing arc consistency, along with the node-consistency pass that precedes it. A grid is
//! arc-consistent when every remaining option for each slot has at least one compatible option in
//! every crossing slot, where compatibility means agreeing on the letter in the shared cell.
//!
//! Domains only ever shrink here; the backtracking search that runs afterward treats them as
//! fixed candidate pools and never mutates them.

use std::collections::VecDeque;

use crate::puzzle::{Puzzle, SlotId};
use crate::types::GlobalWordId;
use crate::util::build_glyph_counts_at_cell;
use crate::word_list::WordList;

/// The set of candidate words currently considered feasible for each slot, indexed by `SlotId`.
/// Options are kept in (length, word id) order, which is the deterministic iteration order that
/// value ordering and tests rely on; pruning preserves it.
#[derive(Debug, Clone)]
pub struct DomainStore {
    pub options: Vec<Vec<GlobalWordId>>,
}

impl DomainStore {
    /// Initialize every slot's domain to the full vocabulary.
    #[must_use]
    pub fn new(puzzle: &Puzzle, word_list: &WordList) -> DomainStore {
        let all_words: Vec<GlobalWordId> = word_list
            .words
            .iter()
            .enumerate()
            .flat_map(|(length, bucket)| (0..bucket.len()).map(move |word_id| (length, word_id)))
            .collect();

        DomainStore {
            options: (0..puzzle.slot_count()).map(|_| all_words.clone()).collect(),
        }
    }
}

/// Remove from each slot's domain every word whose length differs from the slot's length.
/// Afterward, every remaining option fits its slot exactly. A domain may end up empty; that's a
/// valid (if unsolvable) state that's detected later, not a failure here.
pub fn enforce_node_consistency(puzzle: &Puzzle, domains: &mut DomainStore) {
    for slot_config in &puzzle.slot_configs {
        domains.options[slot_config.id].retain(|&(length, _)| length == slot_config.length);
    }
}

/// Make slot `x` arc-consistent with slot `y`: remove from x's domain every word that has no
/// partner in y's domain agreeing on the letter in their shared cell. If the slots don't cross,
/// this is a no-op. Returns whether anything was removed.
///
/// Rather than comparing every pair of options directly, we count the glyphs available in the
/// shared cell across y's domain once, then check each of x's options against the counts.
pub fn revise(
    puzzle: &Puzzle,
    word_list: &WordList,
    domains: &mut DomainStore,
    x: SlotId,
    y: SlotId,
) -> bool {
    let Some((x_cell, y_cell)) = puzzle.crossing_between(x, y) else {
        return false;
    };

    let glyph_counts = build_glyph_counts_at_cell(word_list, y_cell, &domains.options[y]);

    let len_before = domains.options[x].len();

    domains.options[x].retain(|&global_word_id| {
        word_list
            .get_word(global_word_id)
            .glyphs
            .get(x_cell)
            .map_or(false, |&glyph| glyph_counts[glyph] > 0)
    });

    domains.options[x].len() != len_before
}

/// Run the AC-3 algorithm over the given domains. If `initial_arcs` is provided, start from just
/// those arcs (assuming the rest of the grid is already consistent); otherwise seed the worklist
/// with every ordered pair of crossing slots, in slot-id order. The worklist is FIFO, which makes
/// the pruning order deterministic and reproducible.
///
/// Returns `false` as soon as a revision empties a domain, meaning no fill exists; returns `true`
/// once the worklist drains.
pub fn establish_arc_consistency(
    puzzle: &Puzzle,
    word_list: &WordList,
    domains: &mut DomainStore,
    initial_arcs: Option<&[(SlotId, SlotId)]>,
) -> bool {
    let mut queue: VecDeque<(SlotId, SlotId)> = match initial_arcs {
        Some(arcs) => arcs.iter().copied().collect(),
        None => (0..puzzle.slot_count())
            .flat_map(|x| puzzle.neighbors(x).into_iter().map(move |y| (x, y)))
            .collect(),
    };

    while let Some((x, y)) = queue.pop_front() {
        if revise(puzzle, word_list, domains, x, y) {
            if domains.options[x].is_empty() {
                return false;
            }

            // Shrinking x's domain may have invalidated the consistency of its other neighbors
            // with x, so their arcs need to be rechecked.
            for z in puzzle.neighbors(x) {
                if z != y {
                    queue.push_back((z, x));
                }
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use crate::consistency::{
        enforce_node_consistency, establish_arc_consistency, revise, DomainStore,
    };
    use crate::puzzle::Puzzle;
    use crate::word_list::WordList;

    /// Two length-3 slots sharing their first cell: Across at (0,0) and Down at (0,0).
    fn crossed_pair() -> Puzzle {
        Puzzle::from_template(
            "
            ...
            .##
            .##
            ",
        )
        .expect("valid template")
    }

    fn domain_strings(word_list: &WordList, domains: &DomainStore, slot_id: usize) -> Vec<String> {
        domains.options[slot_id]
            .iter()
            .map(|&global_word_id| word_list.get_word(global_word_id).normalized_string.clone())
            .collect()
    }

    #[test]
    fn test_node_consistency_prunes_by_length() {
        let puzzle = crossed_pair();
        let word_list = WordList::from_words(&["cat", "car", "arm", "to", "skate"]).unwrap();
        let mut domains = DomainStore::new(&puzzle, &word_list);

        assert_eq!(domains.options[0].len(), 5);

        enforce_node_consistency(&puzzle, &mut domains);

        for slot_config in &puzzle.slot_configs {
            for &(length, _) in &domains.options[slot_config.id] {
                assert_eq!(length, slot_config.length);
            }
            assert_eq!(domains.options[slot_config.id].len(), 3);
        }
    }

    #[test]
    fn test_revise_is_noop_for_non_crossing_pair() {
        // Two across slots that never touch.
        let puzzle = Puzzle::from_template(
            "
            ..#..
            #####
            ",
        )
        .expect("valid template");
        let word_list = WordList::from_words(&["to", "on"]).unwrap();
        let mut domains = DomainStore::new(&puzzle, &word_list);
        enforce_node_consistency(&puzzle, &mut domains);

        assert!(!revise(&puzzle, &word_list, &mut domains, 0, 1));
        assert_eq!(domains.options[0].len(), 2);
    }

    #[test]
    fn test_revise_removes_unsupported_words() {
        let puzzle = crossed_pair();
        let word_list = WordList::from_words(&["cat", "car", "arm"]).unwrap();
        let mut domains = DomainStore::new(&puzzle, &word_list);
        enforce_node_consistency(&puzzle, &mut domains);

        // Every first letter in slot 1's domain supports every option, so nothing changes.
        assert!(!revise(&puzzle, &word_list, &mut domains, 0, 1));

        // Restrict slot 1 to "arm"; now only words starting with 'a' survive in slot 0.
        let arm_id = *word_list.word_id_by_string.get("arm").unwrap();
        domains.options[1] = vec![(3, arm_id)];

        assert!(revise(&puzzle, &word_list, &mut domains, 0, 1));
        assert_eq!(domain_strings(&word_list, &domains, 0), vec!["arm"]);
    }

    #[test]
    fn test_arc_consistency_prunes_to_stable_point() {
        // Across at (0,0) length 2 and Down at (1,0) length 2, crossing at (1,0): the across
        // slot's second letter is the down slot's first.
        let puzzle = Puzzle::from_template(
            "
            ..
            #.
            ",
        )
        .expect("valid template");
        let word_list = WordList::from_words(&["to", "on"]).unwrap();
        let mut domains = DomainStore::new(&puzzle, &word_list);
        enforce_node_consistency(&puzzle, &mut domains);

        assert!(establish_arc_consistency(
            &puzzle, &word_list, &mut domains, None
        ));

        // "on" can't be the across word (no down word starts with 'n'), and "to" can't be the
        // down word (no across word ends in 't'). The pruning order is pinned by the FIFO
        // worklist.
        assert_eq!(domain_strings(&word_list, &domains, 0), vec!["to"]);
        assert_eq!(domain_strings(&word_list, &domains, 1), vec!["on"]);

        // Soundness: every remaining option has a partner in every crossing slot.
        for x in 0..puzzle.slot_count() {
            for y in puzzle.neighbors(x) {
                let (x_cell, y_cell) = puzzle.crossing_between(x, y).unwrap();
                for &x_option in &domains.options[x] {
                    let x_glyph = word_list.get_word(x_option).glyphs[x_cell];
                    assert!(domains.options[y]
                        .iter()
                        .any(|&y_option| word_list.get_word(y_option).glyphs[y_cell] == x_glyph));
                }
            }
        }
    }

    #[test]
    fn test_arc_consistency_reports_domain_wipeout() {
        let puzzle = Puzzle::from_template(
            "
            ..
            #.
            ",
        )
        .expect("valid template");

        // The across slot's second letter must start a down word, but both words end in 't'
        // while neither starts with it.
        let word_list = WordList::from_words(&["it", "at"]).unwrap();
        let mut domains = DomainStore::new(&puzzle, &word_list);
        enforce_node_consistency(&puzzle, &mut domains);

        assert!(!establish_arc_consistency(
            &puzzle, &word_list, &mut domains, None
        ));
    }

    #[test]
    fn test_arc_consistency_with_explicit_initial_arcs() {
        let puzzle = crossed_pair();
        let word_list = WordList::from_words(&["cat", "car", "arm"]).unwrap();
        let mut domains = DomainStore::new(&puzzle, &word_list);
        enforce_node_consistency(&puzzle, &mut domains);

        // Restrict slot 1 to "cat" and propagate just the affected arc.
        let cat_id = *word_list.word_id_by_string.get("cat").unwrap();
        domains.options[1] = vec![(3, cat_id)];

        assert!(establish_arc_consistency(
            &puzzle,
            &word_list,
            &mut domains,
            Some(&[(0, 1)])
        ));

        assert_eq!(domain_strings(&word_list, &domains, 0), vec!["cat", "car"]);
    }
}
