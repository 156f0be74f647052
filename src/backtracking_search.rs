//! This module implements grid-filling as recursive backtracking search over the arc-consistent
//! domains. Variables are ordered with the minimum-remaining-values heuristic (ties broken by
//! degree, then by slot id), and values with the least-constraining-value heuristic. Consistency
//! is checked on each trial assignment rather than re-propagated per step -- the pruned domains
//! from the initial AC-3 pass stay fixed for the whole search, and only the assignment itself is
//! exploratory.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::time::{Duration, Instant};

use crate::consistency::{enforce_node_consistency, establish_arc_consistency, DomainStore};
use crate::puzzle::{Choice, Puzzle, SlotId};
use crate::types::GlobalWordId;
use crate::util::build_glyph_counts_at_cell;
use crate::word_list::WordList;
use crate::{CHECK_INVARIANTS, LOG_FILL_PROCESS};

/// A struct tracking stats about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: usize,
    pub backtracks: usize,
    pub total_time: Duration,
}

/// A partial mapping from slot to chosen word, indexed by `SlotId`.
pub type Assignment = Vec<Option<GlobalWordId>>;

/// A struct representing the results of a successful fill operation, with one choice per slot in
/// slot-id order.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub choices: Vec<Choice>,
}

/// The ordinary no-solution outcome: either arc consistency wiped out a domain up front, or the
/// search exhausted every branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    Unfillable,
}

/// Is the given (partial) assignment consistent? It is iff all assigned words are pairwise
/// distinct across the whole assignment, every assigned word's length matches its slot, and every
/// assigned pair of crossing slots agrees on the letter in the shared cell.
#[must_use]
pub fn consistent(puzzle: &Puzzle, word_list: &WordList, assignment: &Assignment) -> bool {
    let mut used_words: HashSet<GlobalWordId> = HashSet::new();

    for slot_config in &puzzle.slot_configs {
        let Some(global_word_id) = assignment[slot_config.id] else {
            continue;
        };

        if global_word_id.0 != slot_config.length {
            return false;
        }

        if !used_words.insert(global_word_id) {
            return false;
        }
    }

    // Lengths are now known to match, so glyph indexing below can't go out of bounds.
    for slot_config in &puzzle.slot_configs {
        let Some(global_word_id) = assignment[slot_config.id] else {
            continue;
        };

        let word = word_list.get_word(global_word_id);

        for (cell_idx, crossing) in slot_config.crossings.iter().enumerate() {
            let Some(crossing) = crossing else {
                continue;
            };
            let Some(other_word_id) = assignment[crossing.other_slot_id] else {
                continue;
            };

            let other_word = word_list.get_word(other_word_id);
            if word.glyphs[cell_idx] != other_word.glyphs[crossing.other_slot_cell] {
                return false;
            }
        }
    }

    true
}

/// Pick the unassigned slot with the fewest remaining candidates, breaking ties by the most
/// crossings and then by the lowest slot id so that repeated runs make the same choice.
fn select_unassigned_variable(
    puzzle: &Puzzle,
    domains: &DomainStore,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..puzzle.slot_count())
        .filter(|&slot_id| assignment[slot_id].is_none())
        .min_by_key(|&slot_id| {
            (
                domains.options[slot_id].len(),
                Reverse(puzzle.slot_configs[slot_id].neighbor_ids().len()),
                slot_id,
            )
        })
}

/// Order the slot's candidates ascending by how many options they'd rule out across the domains
/// of its unassigned crossing neighbors. The sort is stable, so candidates that eliminate equally
/// many keep their domain order.
fn order_domain_values(
    puzzle: &Puzzle,
    word_list: &WordList,
    domains: &DomainStore,
    assignment: &Assignment,
    slot_id: SlotId,
) -> Vec<GlobalWordId> {
    let slot_config = &puzzle.slot_configs[slot_id];

    // For each unassigned crossing neighbor, count the glyphs available in the shared cell so we
    // can score each candidate in constant time per neighbor.
    let neighbor_glyph_counts: Vec<_> = slot_config
        .crossings
        .iter()
        .enumerate()
        .filter_map(|(cell_idx, crossing)| {
            let crossing = crossing.as_ref()?;
            if assignment[crossing.other_slot_id].is_some() {
                return None;
            }

            let neighbor_options = &domains.options[crossing.other_slot_id];
            Some((
                cell_idx,
                build_glyph_counts_at_cell(word_list, crossing.other_slot_cell, neighbor_options),
                neighbor_options.len(),
            ))
        })
        .collect();

    let mut values = domains.options[slot_id].clone();

    values.sort_by_cached_key(|&global_word_id| {
        let word = word_list.get_word(global_word_id);

        neighbor_glyph_counts
            .iter()
            .map(|(cell_idx, glyph_counts, neighbor_option_count)| {
                let supported = word
                    .glyphs
                    .get(*cell_idx)
                    .map_or(0, |&glyph| glyph_counts[glyph] as usize);
                neighbor_option_count - supported
            })
            .sum::<usize>()
    });

    values
}

/// Depth-first search for a completion of the given partial assignment. Returns whether one was
/// found, leaving it in `assignment` if so; `false` just means the caller should try its next
/// candidate, not that anything went wrong.
fn backtrack(
    puzzle: &Puzzle,
    word_list: &WordList,
    domains: &DomainStore,
    assignment: &mut Assignment,
    statistics: &mut Statistics,
) -> bool {
    statistics.states += 1;

    let Some(slot_id) = select_unassigned_variable(puzzle, domains, assignment) else {
        // Every slot is assigned; the recursion above us has already checked consistency.
        return true;
    };

    for global_word_id in order_domain_values(puzzle, word_list, domains, assignment, slot_id) {
        assignment[slot_id] = Some(global_word_id);

        if LOG_FILL_PROCESS {
            eprintln!(
                "trying slot {}: {}",
                slot_id,
                word_list.get_word(global_word_id).normalized_string
            );
        }

        if consistent(puzzle, word_list, assignment)
            && backtrack(puzzle, word_list, domains, assignment, statistics)
        {
            return true;
        }

        assignment[slot_id] = None;
    }

    statistics.backtracks += 1;
    false
}

/// Search for a valid fill for the given puzzle: initialize domains from the vocabulary, enforce
/// node and arc consistency, then run backtracking search over what's left. The first complete
/// consistent assignment wins; re-running with the same inputs yields the same result.
pub fn find_fill(puzzle: &Puzzle, word_list: &WordList) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    let mut statistics = Statistics::default();

    let mut domains = DomainStore::new(puzzle, word_list);
    enforce_node_consistency(puzzle, &mut domains);

    if !establish_arc_consistency(puzzle, word_list, &mut domains, None) {
        return Err(FillFailure::Unfillable);
    }

    let mut assignment: Assignment = vec![None; puzzle.slot_count()];

    if !backtrack(puzzle, word_list, &domains, &mut assignment, &mut statistics) {
        return Err(FillFailure::Unfillable);
    }

    if CHECK_INVARIANTS && !consistent(puzzle, word_list, &assignment) {
        panic!("Fill reported success but assignment is inconsistent?");
    }

    statistics.total_time = start.elapsed();

    let choices = assignment
        .into_iter()
        .enumerate()
        .map(|(slot_id, global_word_id)| Choice {
            slot_id,
            word_id: global_word_id.expect("complete assignment must cover every slot"),
        })
        .collect();

    Ok(FillSuccess {
        statistics,
        choices,
    })
}
